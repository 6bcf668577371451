//! Colour calibration value precedence and command lines.

#![allow(clippy::unwrap_used)]

use std::path::Path;

use panel::{ColorArgs, ColorCalibration, RecordingRunner};
use settings::{DisplayRow, Setting, SettingsStore};

fn store_with(row: DisplayRow) -> SettingsStore {
    let mut store = SettingsStore::new();
    store.insert("front", row);
    store
}

fn run(store: &SettingsStore, args: ColorArgs) -> String {
    let runner = RecordingRunner::new();
    let cal = ColorCalibration::new(store, &runner, "fbc");
    cal.set_color_calibration("front", Path::new("/dev/fb0"), args);
    let mut lines = runner.command_lines();
    assert_eq!(lines.len(), 1);
    lines.remove(0)
}

#[test]
fn explicit_offset_beats_stored() {
    let store = store_with(DisplayRow::new().with(Setting::ROffset, 10));
    let args = ColorArgs {
        r: Some(50),
        ..ColorArgs::default()
    };
    assert_eq!(run(&store, args), "fbc -d /dev/fb0 1.0 -r 50");
}

#[test]
fn stored_offset_used_without_explicit() {
    let store = store_with(DisplayRow::new().with(Setting::ROffset, 10));
    assert_eq!(run(&store, ColorArgs::default()), "fbc -d /dev/fb0 1.0 -r 10");
}

#[test]
fn no_offset_anywhere_omits_flag() {
    let store = SettingsStore::new();
    assert_eq!(run(&store, ColorArgs::default()), "fbc -d /dev/fb0 1.0");
}

#[test]
fn stored_gamma_and_all_channels() {
    let store = store_with(
        DisplayRow::new()
            .with(Setting::Gamma, "2.2")
            .with(Setting::ROffset, 1)
            .with(Setting::GOffset, 255)
            .with(Setting::BOffset, 0),
    );
    assert_eq!(run(&store, ColorArgs::default()), "fbc -d /dev/fb0 2.2 -r 1 -g 255");
}

#[test]
fn explicit_gamma_beats_unparsable_stored() {
    let store = store_with(DisplayRow::new().with(Setting::Gamma, "bright"));
    assert_eq!(run(&store, ColorArgs::default()), "fbc -d /dev/fb0 1.0");
    let args = ColorArgs {
        gamma: Some(3.0),
        ..ColorArgs::default()
    };
    assert_eq!(run(&store, args), "fbc -d /dev/fb0 3.0");
}

#[test]
fn store_is_never_written() {
    let store = store_with(DisplayRow::new().with(Setting::Gamma, 1.8));
    let before = store.clone();
    let args = ColorArgs {
        gamma: Some(2.4),
        r: Some(9),
        g: Some(9),
        b: Some(9),
    };
    run(&store, args);
    assert_eq!(store, before);
}
