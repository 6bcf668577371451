//! Scanline test patterns
//!
//! Modes 1-8 are generated one row at a time and written back to back into
//! pixel memory, like a stream. The pair patterns repeat a two-pixel unit
//! `width / 2` times, so on an odd-width panel every row is one pixel short
//! and the next row starts where the previous one stopped.

use platform::ScreenGeometry;

/// Bytes of one white pixel
pub const WHITE_PX: [u8; 4] = [0xFF; 4];
/// Bytes of one black pixel
pub const BLACK_PX: [u8; 4] = [0x00; 4];

/// Test pattern selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternMode {
    /// 1: every pixel white
    White,
    /// 2: every pixel black
    Black,
    /// 3: checkerboard, even rows start black
    Checker,
    /// 4: checkerboard, even rows start white
    CheckerInverse,
    /// 5: vertical stripes starting black
    Columns,
    /// 6: vertical stripes starting white
    ColumnsInverse,
    /// 7: horizontal stripes, even rows black
    Rows,
    /// 8: horizontal stripes, even rows white
    RowsInverse,
    /// 9: display name, scaled to fill the panel
    Identify,
    /// Any other number. Devices are mapped but nothing is written.
    Unknown(u32),
}

impl From<u32> for PatternMode {
    fn from(mode: u32) -> Self {
        match mode {
            1 => Self::White,
            2 => Self::Black,
            3 => Self::Checker,
            4 => Self::CheckerInverse,
            5 => Self::Columns,
            6 => Self::ColumnsInverse,
            7 => Self::Rows,
            8 => Self::RowsInverse,
            9 => Self::Identify,
            other => Self::Unknown(other),
        }
    }
}

impl PatternMode {
    /// Mode number as given on the command line.
    pub fn number(self) -> u32 {
        match self {
            Self::White => 1,
            Self::Black => 2,
            Self::Checker => 3,
            Self::CheckerInverse => 4,
            Self::Columns => 5,
            Self::ColumnsInverse => 6,
            Self::Rows => 7,
            Self::RowsInverse => 8,
            Self::Identify => 9,
            Self::Unknown(n) => n,
        }
    }

    /// Bytes of row `row` on a panel `width` pixels wide.
    ///
    /// `None` for modes that are not scanline patterns.
    pub fn scanline(self, row: u32, width: u32) -> Option<Vec<u8>> {
        let even = row % 2 == 0;
        let line = match self {
            Self::White => solid(WHITE_PX, width),
            Self::Black => solid(BLACK_PX, width),
            Self::Checker if even => pairs(BLACK_PX, WHITE_PX, width),
            Self::Checker | Self::ColumnsInverse => pairs(WHITE_PX, BLACK_PX, width),
            Self::CheckerInverse if even => pairs(WHITE_PX, BLACK_PX, width),
            Self::CheckerInverse | Self::Columns => pairs(BLACK_PX, WHITE_PX, width),
            Self::Rows if even => solid(BLACK_PX, width),
            Self::Rows => solid(WHITE_PX, width),
            Self::RowsInverse if even => solid(WHITE_PX, width),
            Self::RowsInverse => solid(BLACK_PX, width),
            Self::Identify | Self::Unknown(_) => return None,
        };
        Some(line)
    }
}

fn solid(px: [u8; 4], width: u32) -> Vec<u8> {
    let n = usize::try_from(width).unwrap_or(0);
    px.repeat(n)
}

fn pairs(first: [u8; 4], second: [u8; 4], width: u32) -> Vec<u8> {
    let n = usize::try_from(width / 2).unwrap_or(0);
    [first, second].concat().repeat(n)
}

/// Sequential writer over a byte buffer.
///
/// Writes past the end are truncated.
#[derive(Debug)]
pub struct StreamWriter<'a> {
    buf: &'a mut [u8],
    cursor: usize,
}

impl<'a> StreamWriter<'a> {
    /// Writer positioned at the start of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, cursor: 0 }
    }

    /// Bytes written so far
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Append `bytes` at the cursor. Returns how many bytes fit.
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        let Some(rest) = self.buf.get_mut(self.cursor..) else {
            return 0;
        };
        let n = rest.len().min(bytes.len());
        if let (Some(dst), Some(src)) = (rest.get_mut(..n), bytes.get(..n)) {
            dst.copy_from_slice(src);
        }
        self.cursor = self.cursor.saturating_add(n);
        n
    }
}

/// Write a scanline pattern into `buf`, one row per panel row.
///
/// Returns the number of bytes written; zero for modes that are not scanline
/// patterns, in which case `buf` is untouched.
pub fn fill_scanlines(buf: &mut [u8], mode: PatternMode, geometry: ScreenGeometry) -> usize {
    let mut out = StreamWriter::new(buf);
    for row in 0..geometry.height {
        let Some(line) = mode.scanline(row, geometry.width) else {
            break;
        };
        out.write(&line);
    }
    out.position()
}
