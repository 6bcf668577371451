//! Settings lookup by display name.
//!
//! [`ConfigStore`] is the seam the panel operations depend on.
//! [`SettingsStore`] is the concrete implementation, backed by a JSON
//! document holding at most one row per display:
//!
//! ```json
//! {
//!   "displays": {
//!     "front": { "brightness": 180, "greyDepth": 8, "oeDivisor": 2,
//!                "rotation": 180, "gamma": 2.2, "rOffset": 10 }
//!   }
//! }
//! ```
//!
//! Columns the utilities do not use (panel geometry, module type, ...) may be
//! present and are ignored.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;
use crate::value::{parse_f64, parse_u32, ChannelOffset, Setting};

/// Read-only settings lookup.
pub trait ConfigStore {
    /// Raw stored value of `setting` for `display`.
    ///
    /// `None` when the display has no row or the column is empty.
    fn lookup(&self, display: &str, setting: Setting) -> Option<Value>;

    /// Stored value parsed as an unsigned integer.
    fn lookup_u32(&self, display: &str, setting: Setting) -> Option<u32> {
        self.lookup(display, setting).as_ref().and_then(parse_u32)
    }

    /// Stored value parsed as a float.
    fn lookup_f64(&self, display: &str, setting: Setting) -> Option<f64> {
        self.lookup(display, setting).as_ref().and_then(parse_f64)
    }

    /// Every setting for `display`, parsed. Fields that are absent or do not
    /// parse are `None`.
    fn settings(&self, display: &str) -> DisplaySettings {
        let offset = |setting| {
            self.lookup_u32(display, setting)
                .and_then(|v| ChannelOffset::try_new(v).ok())
        };
        DisplaySettings {
            brightness: self.lookup_u32(display, Setting::Brightness),
            grey_depth: self.lookup_u32(display, Setting::GreyDepth),
            oe_divisor: self.lookup_u32(display, Setting::OeDivisor),
            rotation: self.lookup_u32(display, Setting::Rotation),
            gamma: self.lookup_f64(display, Setting::Gamma),
            r_offset: offset(Setting::ROffset),
            g_offset: offset(Setting::GOffset),
            b_offset: offset(Setting::BOffset),
        }
    }
}

impl<S: ConfigStore + ?Sized> ConfigStore for &S {
    fn lookup(&self, display: &str, setting: Setting) -> Option<Value> {
        (**self).lookup(display, setting)
    }
}

/// Parsed settings for one display.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DisplaySettings {
    /// Panel brightness
    pub brightness: Option<u32>,
    /// Grey levels per channel
    pub grey_depth: Option<u32>,
    /// Output-enable clock divisor
    pub oe_divisor: Option<u32>,
    /// Rotation in degrees as stored; validated when applied
    pub rotation: Option<u32>,
    /// Gamma exponent
    pub gamma: Option<f64>,
    /// Red offset
    pub r_offset: Option<ChannelOffset>,
    /// Green offset
    pub g_offset: Option<ChannelOffset>,
    /// Blue offset
    pub b_offset: Option<ChannelOffset>,
}

/// One stored row. Values are kept raw; parsing happens on lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    brightness: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    grey_depth: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    oe_divisor: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rotation: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gamma: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    r_offset: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    g_offset: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    b_offset: Option<Value>,
}

impl DisplayRow {
    /// Empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, setting: Setting, value: impl Into<Value>) -> Self {
        *self.slot_mut(setting) = Some(value.into());
        self
    }

    /// Raw value of one column.
    pub fn get(&self, setting: Setting) -> Option<&Value> {
        let slot = match setting {
            Setting::Brightness => &self.brightness,
            Setting::GreyDepth => &self.grey_depth,
            Setting::OeDivisor => &self.oe_divisor,
            Setting::Rotation => &self.rotation,
            Setting::Gamma => &self.gamma,
            Setting::ROffset => &self.r_offset,
            Setting::GOffset => &self.g_offset,
            Setting::BOffset => &self.b_offset,
        };
        slot.as_ref().filter(|v| !v.is_null())
    }

    fn slot_mut(&mut self, setting: Setting) -> &mut Option<Value> {
        match setting {
            Setting::Brightness => &mut self.brightness,
            Setting::GreyDepth => &mut self.grey_depth,
            Setting::OeDivisor => &mut self.oe_divisor,
            Setting::Rotation => &mut self.rotation,
            Setting::Gamma => &mut self.gamma,
            Setting::ROffset => &mut self.r_offset,
            Setting::GOffset => &mut self.g_offset,
            Setting::BOffset => &mut self.b_offset,
        }
    }
}

/// JSON-backed settings store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsStore {
    #[serde(default)]
    displays: BTreeMap<String, DisplayRow>,
}

impl SettingsStore {
    /// Empty store: every lookup is `None`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a settings document.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|source| StoreError::Parse {
            path: PathBuf::new(),
            source,
        })
    }

    /// Load the document at `path`.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store: Self = serde_json::from_str(&text).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), displays = store.displays.len(), "loaded settings");
        Ok(store)
    }

    /// Load the document at `path`, treating a missing file as an empty store.
    ///
    /// A controller that has never been provisioned has no document; every
    /// operation then falls back to explicit arguments only.
    pub fn load_or_empty(path: &Path) -> Result<Self, StoreError> {
        match Self::load(path) {
            Err(StoreError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "settings document not found, using empty store");
                Ok(Self::new())
            }
            other => other,
        }
    }

    /// Insert or replace the row for `display`.
    pub fn insert(&mut self, display: impl Into<String>, row: DisplayRow) {
        self.displays.insert(display.into(), row);
    }

    /// Row for `display`
    pub fn row(&self, display: &str) -> Option<&DisplayRow> {
        self.displays.get(display)
    }

    /// Names of all displays with a row.
    pub fn display_names(&self) -> impl Iterator<Item = &str> {
        self.displays.keys().map(String::as_str)
    }
}

impl ConfigStore for SettingsStore {
    fn lookup(&self, display: &str, setting: Setting) -> Option<Value> {
        self.row(display)?.get(setting).cloned()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn columns_use_document_names() {
        let store = SettingsStore::from_json(
            r#"{"displays": {"front": {"greyDepth": 6, "oeDivisor": "3", "rOffset": 40}}}"#,
        )
        .unwrap();
        assert_eq!(store.lookup_u32("front", Setting::GreyDepth), Some(6));
        assert_eq!(store.lookup_u32("front", Setting::OeDivisor), Some(3));
        assert_eq!(store.lookup_u32("front", Setting::ROffset), Some(40));
    }

    #[test]
    fn null_columns_are_absent() {
        let store =
            SettingsStore::from_json(r#"{"displays": {"front": {"brightness": null}}}"#).unwrap();
        assert_eq!(store.lookup("front", Setting::Brightness), None);
    }

    #[test]
    fn unknown_columns_are_ignored() {
        let store = SettingsStore::from_json(
            r#"{"displays": {"front": {"deviceName": "front", "width": 64, "brightness": 3}}}"#,
        )
        .unwrap();
        assert_eq!(store.lookup_u32("front", Setting::Brightness), Some(3));
    }

    #[test]
    fn out_of_range_offsets_parse_to_none() {
        let mut store = SettingsStore::new();
        store.insert(
            "front",
            DisplayRow::new()
                .with(Setting::ROffset, 0)
                .with(Setting::GOffset, 300)
                .with(Setting::BOffset, "12"),
        );
        let s = store.settings("front");
        assert_eq!(s.r_offset, None);
        assert_eq!(s.g_offset, None);
        assert_eq!(s.b_offset.map(ChannelOffset::get), Some(12));
    }

    #[test]
    fn missing_row_yields_default_settings() {
        let store = SettingsStore::new();
        assert_eq!(store.settings("ghost"), DisplaySettings::default());
    }

    #[test]
    fn row_builder_round_trips_through_json() {
        let mut store = SettingsStore::new();
        store.insert("rear", DisplayRow::new().with(Setting::Gamma, json!("2.2")));
        let text = serde_json::to_string(&store).unwrap();
        let back = SettingsStore::from_json(&text).unwrap();
        assert_eq!(back.lookup_f64("rear", Setting::Gamma), Some(2.2));
    }
}
