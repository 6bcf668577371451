//! ARGB32 drawing surface
//!
//! Panels take 32-bit pixels, alpha in the top byte, stored little-endian.
//! [`Canvas`] holds one word per pixel, implements the `embedded-graphics`
//! [`DrawTarget`] so text can be drawn into it, and copies itself into mapped
//! pixel memory in the panel's byte order.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use platform::ScreenGeometry;

/// Opaque black
pub const BLACK: u32 = 0xFF00_0000;
/// Opaque white
pub const WHITE: u32 = 0xFFFF_FFFF;

/// Pack an opaque colour into an ARGB32 word.
#[allow(clippy::arithmetic_side_effects)] // u8 channels shifted within 32 bits
pub fn argb(color: Rgb888) -> u32 {
    BLACK | u32::from(color.r()) << 16 | u32::from(color.g()) << 8 | u32::from(color.b())
}

/// Owned ARGB32 pixel grid, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Canvas {
    /// Canvas of `width` x `height` filled with `fill`.
    pub fn new(width: u32, height: u32, fill: u32) -> Self {
        let len = ScreenGeometry::new(width, height).pixel_count().unwrap_or(0);
        Self {
            width,
            height,
            pixels: vec![fill; len],
        }
    }

    /// Canvas covering a whole panel.
    pub fn for_geometry(geometry: ScreenGeometry, fill: u32) -> Self {
        Self::new(geometry.width, geometry.height, fill)
    }

    /// Pixel words, row-major.
    pub fn words(&self) -> &[u32] {
        &self.pixels
    }

    /// Pixel at (x, y), `None` outside the canvas.
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y).and_then(|i| self.pixels.get(i).copied())
    }

    /// Set the pixel at (x, y). Writes outside the canvas are dropped.
    pub fn set(&mut self, x: u32, y: u32, word: u32) {
        if let Some(px) = self.index(x, y).and_then(|i| self.pixels.get_mut(i)) {
            *px = word;
        }
    }

    /// Smallest rectangle holding every pixel that differs from `background`.
    ///
    /// `None` for a blank canvas.
    pub fn ink_bounds(&self, background: u32) -> Option<Rectangle> {
        let mut min = (u32::MAX, u32::MAX);
        let mut max = (0u32, 0u32);
        let mut any = false;
        for (y, row) in (0..self.height).zip(self.rows()) {
            for (x, &px) in (0..self.width).zip(row) {
                if px != background {
                    any = true;
                    min = (min.0.min(x), min.1.min(y));
                    max = (max.0.max(x), max.1.max(y));
                }
            }
        }
        any.then(|| {
            Rectangle::with_corners(
                Point::new(to_coord(min.0), to_coord(min.1)),
                Point::new(to_coord(max.0), to_coord(max.1)),
            )
        })
    }

    /// Copy the canvas into `out` as little-endian words.
    ///
    /// Copies as many whole pixels as fit; returns the number of bytes
    /// written.
    pub fn write_le(&self, out: &mut [u8]) -> usize {
        let mut written = 0usize;
        for (chunk, word) in out.chunks_exact_mut(4).zip(&self.pixels) {
            chunk.copy_from_slice(&word.to_le_bytes());
            written = written.saturating_add(4);
        }
        written
    }

    fn rows(&self) -> impl Iterator<Item = &[u32]> {
        let width = usize::try_from(self.width).unwrap_or(0).max(1);
        self.pixels.chunks(width)
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let w = usize::try_from(self.width).ok()?;
        usize::try_from(y)
            .ok()?
            .checked_mul(w)?
            .checked_add(usize::try_from(x).ok()?)
    }
}

fn to_coord(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            if let (Ok(x), Ok(y)) = (u32::try_from(p.x), u32::try_from(p.y)) {
                self.set(x, y, argb(color));
            }
        }
        Ok(())
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}
