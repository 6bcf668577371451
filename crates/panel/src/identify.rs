//! Identify pattern: the panel's display name, as large as fits
//!
//! The name is drawn once at native font size into a scratch [`Canvas`], its
//! ink is cropped, and the crop is scaled uniformly (nearest neighbour) to
//! the largest size that fits the panel and centred on an opaque black
//! background.

use embedded_graphics::mono_font::ascii::{
    FONT_10X20, FONT_4X6, FONT_5X7, FONT_5X8, FONT_6X10, FONT_6X12, FONT_6X13, FONT_6X9,
    FONT_7X13, FONT_7X14, FONT_8X13, FONT_9X15, FONT_9X18,
};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};
use platform::ScreenGeometry;

use crate::canvas::{Canvas, BLACK};

/// Built-in fonts, shortest first.
pub const FONTS: [&MonoFont<'static>; 13] = [
    &FONT_4X6, &FONT_5X7, &FONT_5X8, &FONT_6X9, &FONT_6X10, &FONT_6X12, &FONT_6X13, &FONT_7X13,
    &FONT_8X13, &FONT_7X14, &FONT_9X15, &FONT_9X18, &FONT_10X20,
];

/// Tallest font whose glyph cell fits in `max_height` rows.
///
/// Falls back to the smallest font on panels shorter than any of them; the
/// label is scaled down afterwards anyway.
pub fn select_font(max_height: u32) -> &'static MonoFont<'static> {
    FONTS
        .iter()
        .rev()
        .copied()
        .find(|font| font.character_size.height <= max_height)
        .unwrap_or(&FONT_4X6)
}

/// `label` in white on black at native size, cropped to its text box.
pub fn text_mask(label: &str, font: &MonoFont<'_>) -> Canvas {
    let style = MonoTextStyle::new(font, Rgb888::WHITE);
    let text = Text::with_baseline(label, Point::zero(), style, Baseline::Top);
    let size = text.bounding_box().size;
    let mut mask = Canvas::new(size.width.max(1), size.height.max(1), BLACK);
    text.draw(&mut mask).ok();
    mask
}

/// Where the scaled label lands on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Scaled width
    pub width: u32,
    /// Scaled height
    pub height: u32,
}

/// Scale a `box_w` x `box_h` box uniformly to fit `panel` and centre it.
///
/// The scale factor is `min(W / box_w, H / box_h)`; scaled sizes are rounded
/// down. `None` if either box or panel is empty.
#[allow(clippy::arithmetic_side_effects)] // u32 operands widened to u64; divisors checked non-zero
pub fn fit(box_w: u32, box_h: u32, panel: ScreenGeometry) -> Option<Placement> {
    if box_w == 0 || box_h == 0 || panel.width == 0 || panel.height == 0 {
        return None;
    }
    let (bw, bh) = (u64::from(box_w), u64::from(box_h));
    let (pw, ph) = (u64::from(panel.width), u64::from(panel.height));

    // Compare pw/bw with ph/bh without division.
    let (w, h) = if pw * bh <= ph * bw {
        (pw, bh * pw / bw)
    } else {
        (bw * ph / bh, ph)
    };
    let width = u32::try_from(w.clamp(1, pw)).ok()?;
    let height = u32::try_from(h.clamp(1, ph)).ok()?;
    Some(Placement {
        x: (panel.width - width) / 2,
        y: (panel.height - height) / 2,
        width,
        height,
    })
}

/// Copy `src` from `mask` into `dst` at `place`, scaled nearest-neighbour.
#[allow(clippy::arithmetic_side_effects)] // indices bounded by u32 canvas sizes, computed in u64
pub fn blit_scaled(mask: &Canvas, src: &Rectangle, dst: &mut Canvas, place: Placement) {
    let (Ok(sx0), Ok(sy0)) = (u32::try_from(src.top_left.x), u32::try_from(src.top_left.y)) else {
        return;
    };
    let (bw, bh) = (u64::from(src.size.width), u64::from(src.size.height));
    let (sw, sh) = (u64::from(place.width), u64::from(place.height));
    if sw == 0 || sh == 0 {
        return;
    }
    for dy in 0..place.height {
        let sy = sy0.saturating_add(u32::try_from(u64::from(dy) * bh / sh).unwrap_or(u32::MAX));
        for dx in 0..place.width {
            let sx = sx0.saturating_add(u32::try_from(u64::from(dx) * bw / sw).unwrap_or(u32::MAX));
            if let Some(px) = mask.get(sx, sy) {
                dst.set(place.x.saturating_add(dx), place.y.saturating_add(dy), px);
            }
        }
    }
}

/// Full identify frame for a panel showing `name`.
///
/// The name is upper-cased. A name without any visible glyphs gives a plain
/// black frame.
pub fn identify_frame(name: &str, geometry: ScreenGeometry) -> Canvas {
    let mut frame = Canvas::for_geometry(geometry, BLACK);
    let label = name.to_uppercase();
    let font = select_font(geometry.height);
    let mask = text_mask(&label, font);

    let Some(ink) = mask.ink_bounds(BLACK) else {
        tracing::debug!(label = %label, "label has no visible glyphs");
        return frame;
    };
    let Some(place) = fit(ink.size.width, ink.size.height, geometry) else {
        return frame;
    };
    tracing::debug!(
        label = %label,
        font_height = font.character_size.height,
        x = place.x,
        y = place.y,
        width = place.width,
        height = place.height,
        "identify label placed"
    );
    blit_scaled(&mask, &ink, &mut frame, place);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::WHITE;

    #[test]
    fn font_is_tallest_that_fits() {
        assert_eq!(select_font(32).character_size.height, 20);
        assert_eq!(select_font(16).character_size.height, 15);
        assert_eq!(select_font(9).character_size.height, 9);
        assert_eq!(select_font(3).character_size.height, 6);
    }

    #[test]
    fn fit_limits_by_tighter_axis() {
        // Wide box on a square panel: width-limited.
        assert_eq!(
            fit(20, 5, ScreenGeometry::new(40, 40)),
            Some(Placement { x: 0, y: 15, width: 40, height: 10 })
        );
        // Tall box: height-limited.
        assert_eq!(
            fit(4, 8, ScreenGeometry::new(40, 16)),
            Some(Placement { x: 16, y: 0, width: 8, height: 16 })
        );
        assert_eq!(fit(0, 8, ScreenGeometry::new(40, 16)), None);
    }

    #[test]
    fn blank_label_gives_black_frame() {
        let frame = identify_frame("  ", ScreenGeometry::new(16, 8));
        assert!(frame.words().iter().all(|&w| w == BLACK));
    }

    #[test]
    fn label_fills_panel_along_one_axis() {
        let geometry = ScreenGeometry::new(64, 16);
        let frame = identify_frame("front", geometry);
        let ink = frame.ink_bounds(BLACK).map(|r| r.size);
        let size = ink.unwrap_or_default();
        assert!(size.width == 64 || size.height == 16, "{size:?}");
        assert!(frame.words().iter().all(|&w| w == BLACK || w == WHITE));
    }

    #[test]
    fn label_is_upper_cased() {
        let font = select_font(20);
        let lower = identify_frame("a", ScreenGeometry::new(10, 20));
        let mut upper = Canvas::new(10, 20, BLACK);
        let mask = text_mask("A", font);
        if let Some(ink) = mask.ink_bounds(BLACK) {
            if let Some(place) = fit(ink.size.width, ink.size.height, ScreenGeometry::new(10, 20)) {
                blit_scaled(&mask, &ink, &mut upper, place);
            }
        }
        assert_eq!(lower, upper);
    }
}
