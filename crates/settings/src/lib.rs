//! Settings core for geosearch
//!
//! This crate provides the user settings record, the selection catalogs
//! backing the settings screen, and the load/save lifecycle with its
//! observer hooks and bootstrap registration.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod hooks;
pub mod model;
pub mod startup;
pub mod store;

pub use catalog::{Catalogs, EnumOption};
pub use hooks::{Hooks, LifecycleEvent, ObserverError};
pub use model::Settings;
pub use startup::{register_pre_init, Startup, StartupError};
pub use store::{SettingsConfig, SettingsError, SettingsStore, SharedSettings};
