//! Per-display settings
//!
//! The settings store is a plain key-value lookup by display name. It is
//! written by the provisioning tooling and only ever read here. Any field may
//! be missing or hold something that does not parse; both cases surface as
//! `None` so the caller can leave the corresponding hardware parameter alone.
//!
//! ```
//! use settings::{ConfigStore, Setting, SettingsStore};
//!
//! let store = SettingsStore::from_json(r#"{
//!     "displays": { "front": { "brightness": 180, "greyDepth": "8", "gamma": "oops" } }
//! }"#).unwrap();
//!
//! let front = store.settings("front");
//! assert_eq!(front.brightness, Some(180));
//! assert_eq!(front.grey_depth, Some(8));
//! assert_eq!(front.gamma, None);
//! assert!(store.lookup("rear", Setting::Brightness).is_none());
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod store;
pub mod value;

pub use error::StoreError;
pub use store::{ConfigStore, DisplayRow, DisplaySettings, SettingsStore};
pub use value::{ChannelOffset, OutOfRangeError, Setting};
