//! Test pattern rendering into mock pixel memory.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation
)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use panel::canvas::{BLACK, WHITE};
use panel::patterns::{BLACK_PX, WHITE_PX};
use panel::{Canvas, PatternMode, PatternRenderer, RenderReport};
use platform::mocks::{MockOpener, SharedPanel, STALE_BYTE};
use platform::ScreenGeometry;
use proptest::prelude::*;

fn single(geometry: ScreenGeometry) -> (MockOpener, SharedPanel) {
    let mut opener = MockOpener::new();
    let panel = opener.add_panel("/dev/fb0", geometry);
    (opener, panel)
}

fn named(name: &str) -> BTreeMap<PathBuf, String> {
    BTreeMap::from([(PathBuf::from("/dev/fb0"), name.to_owned())])
}

#[test]
fn mode_1_whitens_every_byte() {
    let (opener, panel) = single(ScreenGeometry::new(7, 5));
    let report = PatternRenderer::new(&opener, BTreeMap::new())
        .render_pattern(PatternMode::from(1), ["/dev/fb0"]);
    assert_eq!(report, RenderReport { rendered: 1, skipped: 0 });

    let state = panel.borrow();
    assert_eq!(state.pixels.len(), 7 * 5 * 4);
    assert!(state.pixels.iter().all(|&b| b == 0xFF));
    assert_eq!(state.open_handles, 0);
}

#[test]
fn mode_3_alternates_rows() {
    let (opener, panel) = single(ScreenGeometry::new(4, 2));
    PatternRenderer::new(&opener, BTreeMap::new()).render_pattern(PatternMode::from(3), ["/dev/fb0"]);

    let state = panel.borrow();
    let row0: Vec<u8> = [BLACK_PX, WHITE_PX, BLACK_PX, WHITE_PX].concat();
    let row1: Vec<u8> = [WHITE_PX, BLACK_PX, WHITE_PX, BLACK_PX].concat();
    assert_eq!(&state.pixels[..16], row0.as_slice());
    assert_eq!(&state.pixels[16..], row1.as_slice());
}

#[test]
fn mode_8_even_rows_white() {
    let (opener, panel) = single(ScreenGeometry::new(2, 3));
    PatternRenderer::new(&opener, BTreeMap::new()).render_pattern(PatternMode::from(8), ["/dev/fb0"]);

    let state = panel.borrow();
    assert!(state.pixels[..8].iter().all(|&b| b == 0xFF));
    assert!(state.pixels[8..16].iter().all(|&b| b == 0x00));
    assert!(state.pixels[16..].iter().all(|&b| b == 0xFF));
}

#[test]
fn identify_writes_opaque_black_and_white_frame() {
    let (opener, panel) = single(ScreenGeometry::new(96, 24));
    let report = PatternRenderer::new(&opener, named("front"))
        .render_pattern(PatternMode::Identify, ["/dev/fb0"]);
    assert_eq!(report.rendered, 1);

    let words = panel.borrow().words();
    assert!(words.iter().all(|&w| w == BLACK || w == WHITE));
    assert!(words.contains(&WHITE));
    // Corners stay background.
    assert_eq!(words[0], BLACK);
    assert_eq!(words[words.len() - 1], BLACK);
}

#[test]
fn identify_labels_each_device_by_its_own_name() {
    let mut opener = MockOpener::new();
    let a = opener.add_panel("/dev/fb0", ScreenGeometry::new(32, 16));
    let b = opener.add_panel("/dev/fb1", ScreenGeometry::new(32, 16));
    let names = BTreeMap::from([
        (PathBuf::from("/dev/fb0"), "l".to_owned()),
        (PathBuf::from("/dev/fb1"), "w".to_owned()),
    ]);
    PatternRenderer::new(&opener, names).render_pattern(PatternMode::Identify, ["/dev/fb0", "/dev/fb1"]);
    assert_ne!(a.borrow().pixels, b.borrow().pixels);
}

#[test]
fn map_failure_releases_handle_and_batch_continues() {
    let mut opener = MockOpener::new();
    let broken = opener.add_panel("/dev/fb0", ScreenGeometry::new(4, 2));
    let healthy = opener.add_panel("/dev/fb1", ScreenGeometry::new(4, 2));
    broken.borrow_mut().fail_map = true;

    let report = PatternRenderer::new(&opener, BTreeMap::new())
        .render_pattern(PatternMode::White, ["/dev/fb0", "/dev/fb1"]);
    assert_eq!(report, RenderReport { rendered: 1, skipped: 1 });

    let broken = broken.borrow();
    assert_eq!(broken.opens, 1);
    assert_eq!(broken.open_handles, 0);
    assert!(broken.pixels.iter().all(|&b| b == STALE_BYTE));

    let healthy = healthy.borrow();
    assert_eq!(healthy.open_handles, 0);
    assert!(healthy.pixels.iter().all(|&b| b == 0xFF));
}

fn ink_box(words: &[u32], width: u32, height: u32) -> (u32, u32, u32, u32) {
    let mut canvas = Canvas::new(width, height, BLACK);
    for y in 0..height {
        for x in 0..width {
            canvas.set(x, y, words[(y * width + x) as usize]);
        }
    }
    let r = canvas.ink_bounds(BLACK).unwrap();
    (
        u32::try_from(r.top_left.x).unwrap(),
        u32::try_from(r.top_left.y).unwrap(),
        r.size.width,
        r.size.height,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn identify_label_is_centred_and_maximal(width in 10u32..160, height in 6u32..48) {
        let (opener, panel) = single(ScreenGeometry::new(width, height));
        PatternRenderer::new(&opener, named("a")).render_pattern(PatternMode::Identify, ["/dev/fb0"]);

        let (x, y, w, h) = ink_box(&panel.borrow().words(), width, height);
        // Centred within one pixel on both axes.
        prop_assert!((width - w - x).abs_diff(x) <= 1, "x={} w={} of {}", x, w, width);
        prop_assert!((height - h - y).abs_diff(y) <= 1, "y={} h={} of {}", y, h, height);
        // The tighter axis is filled.
        prop_assert!(w == width || h == height, "{}x{} in {}x{}", w, h, width, height);
    }

    #[test]
    fn scanline_modes_write_whole_rows_for_even_widths(
        mode in 1u32..=8,
        half in 1u32..32,
        height in 1u32..16,
    ) {
        let width = half * 2;
        let (opener, panel) = single(ScreenGeometry::new(width, height));
        PatternRenderer::new(&opener, BTreeMap::new()).render_pattern(PatternMode::from(mode), ["/dev/fb0"]);

        let state = panel.borrow();
        prop_assert!(state.pixels.iter().all(|&b| b == 0x00 || b == 0xFF));
        let expected = PatternMode::from(mode).scanline(1, width).unwrap();
        if height > 1 {
            let row = (width * 4) as usize;
            prop_assert_eq!(&state.pixels[row..2 * row], expected.as_slice());
        }
    }
}
