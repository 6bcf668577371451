//! Setting names and value parsing.
//!
//! Stored values are loosely typed: provisioning tools have written numbers,
//! numeric strings and the occasional empty string into the same column.
//! Parsing is deliberately forgiving about representation and strict about
//! meaning.

use serde_json::Value;

// ── Setting ──────────────────────────────────────────────────────────────────

/// One column of the display settings row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    /// Panel brightness
    Brightness,
    /// Grey levels per channel
    GreyDepth,
    /// Output-enable clock divisor
    OeDivisor,
    /// Rotation in degrees
    Rotation,
    /// Gamma curve exponent
    Gamma,
    /// Red channel offset
    ROffset,
    /// Green channel offset
    GOffset,
    /// Blue channel offset
    BOffset,
}

impl Setting {
    /// Column name in the settings document.
    pub const fn column(self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::GreyDepth => "greyDepth",
            Self::OeDivisor => "oeDivisor",
            Self::Rotation => "rotation",
            Self::Gamma => "gamma",
            Self::ROffset => "rOffset",
            Self::GOffset => "gOffset",
            Self::BOffset => "bOffset",
        }
    }
}

impl core::fmt::Display for Setting {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.column())
    }
}

// ── Parsing ──────────────────────────────────────────────────────────────────

/// Parse an unsigned integer setting.
///
/// Accepts JSON integers, JSON floats (truncated toward zero) and strings
/// holding a decimal integer. Negative, out-of-range and non-numeric values
/// are `None`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::arithmetic_side_effects
)]
pub fn parse_u32(raw: &Value) -> Option<u32> {
    match raw {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return u32::try_from(v).ok();
            }
            // Range checked before the cast.
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && *f < u32::MAX as f64 + 1.0)
                .map(|f| f.trunc() as u32)
        }
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Parse a floating-point setting from a JSON number or numeric string.
pub fn parse_f64(raw: &Value) -> Option<f64> {
    let v = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

// ── ChannelOffset ────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

impl core::fmt::Display for OutOfRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} is outside {}..={}", self.value, self.min, self.max)
    }
}

impl std::error::Error for OutOfRangeError {}

/// Per-channel colour offset handed to the calibration tool.
///
/// Wraps a `u8` with the invariant `1 <= value <= 255`. Zero means "no
/// offset" and is never passed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ChannelOffset(u8);

impl ChannelOffset {
    /// Smallest offset the tool accepts
    pub const MIN: u32 = 1;
    /// Largest offset the tool accepts
    pub const MAX: u32 = 255;

    /// Create a `ChannelOffset`, returning an error outside `1..=255`.
    pub fn try_new(value: u32) -> Result<Self, OutOfRangeError> {
        match u8::try_from(value) {
            Ok(v) if v >= 1 => Ok(Self(v)),
            _ => Err(OutOfRangeError {
                value,
                min: Self::MIN,
                max: Self::MAX,
            }),
        }
    }

    /// Return the offset (1–255).
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}
