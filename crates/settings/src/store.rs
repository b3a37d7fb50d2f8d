//! Settings store
//!
//! Owns the live [`Settings`], the selection [`Catalogs`] and the lifecycle
//! [`Hooks`], and moves the settings to and from the object store.
//!
//! Load sequence:
//!
//! 1. fire `PreLoad`
//! 2. read the record under the schema name and apply it, if one exists
//! 3. rebuild every catalog from the compiled-in tables
//! 4. fire `PostLoad`
//!
//! Save sequence: fire `PreSave`, check the fields can be encoded, write
//! them, fire `PostSave`.
//! Catalogs are never written.

use std::sync::Arc;

use parking_lot::Mutex;
use storage::{ObjectStore, PersistenceError};

use crate::catalog::Catalogs;
use crate::hooks::{Hooks, LifecycleEvent, ObserverError};
use crate::model::Settings;

/// Settings store error types
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Underlying storage failed
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Stored record could not be decoded into settings
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A lifecycle observer returned an error
    #[error(transparent)]
    Observer(#[from] ObserverError),

    /// A field holds a value that cannot be written and read back
    #[error("Invalid value for {field}: {value}")]
    InvalidValue {
        /// Persisted name of the field
        field: &'static str,
        /// Offending value
        value: String,
    },
}

/// Result type for settings operations
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Settings store configuration
#[derive(Debug, Clone)]
pub struct SettingsConfig {
    /// Schema name the record is stored under
    pub schema_name: String,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self { schema_name: "Settings".to_string() }
    }
}

impl SettingsConfig {
    /// Create a configuration with the default schema name
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the record under a different schema name
    pub fn schema_name(mut self, name: impl Into<String>) -> Self {
        self.schema_name = name.into();
        self
    }
}

/// Settings store shared between the startup hook and the rest of the app
pub type SharedSettings = Arc<Mutex<SettingsStore>>;

/// The application's settings and their persistence lifecycle
///
/// One instance is created at startup and handed to whoever needs it.
/// `load` and `save` take `&mut self`, so a store behind [`SharedSettings`]
/// never runs two of them at once.
pub struct SettingsStore {
    config: SettingsConfig,
    store: Arc<dyn ObjectStore>,
    settings: Settings,
    catalogs: Catalogs,
    hooks: Hooks,
}

impl SettingsStore {
    /// Create a store with default settings. No I/O happens here.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self::with_config(store, SettingsConfig::default())
    }

    /// Create a store with a custom configuration
    pub fn with_config(store: Arc<dyn ObjectStore>, config: SettingsConfig) -> Self {
        Self {
            config,
            store,
            settings: Settings::default(),
            catalogs: Catalogs::default(),
            hooks: Hooks::new(),
        }
    }

    /// Wrap the store for sharing
    pub fn into_shared(self) -> SharedSettings {
        Arc::new(Mutex::new(self))
    }

    /// Current settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mutable access to the current settings; changes persist on the next `save`
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Selection catalogs; empty until the first `load`
    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    #[cfg(test)]
    pub(crate) fn catalogs_mut(&mut self) -> &mut Catalogs {
        &mut self.catalogs
    }

    /// Lifecycle hook registry
    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    /// Register a lifecycle observer
    ///
    /// The callback gets the current settings as an argument. It runs while
    /// this store is borrowed, so it must not lock the [`SharedSettings`]
    /// handle wrapping it.
    pub fn on<F>(&mut self, event: LifecycleEvent, callback: F)
    where
        F: FnMut(LifecycleEvent, &Settings) -> anyhow::Result<()> + Send + 'static,
    {
        self.hooks.on(event, callback);
    }

    /// Schema name the record is stored under
    pub fn schema_name(&self) -> &str {
        &self.config.schema_name
    }

    /// Bootstrap entry point: load persisted settings once before the UI attaches
    pub fn pre_initialize(&mut self) -> Result<()> {
        tracing::debug!(target: "settings", "preInitialize");

        let found = self.load()?;
        tracing::debug!(target: "settings", found, "settings loaded");

        Ok(())
    }

    /// Restore settings from storage
    ///
    /// Returns `Ok(false)` when nothing has been saved yet; the fields then
    /// keep their current values. Keys unknown to [`Settings`] are ignored
    /// and missing keys take their default.
    pub fn load(&mut self) -> Result<bool> {
        self.hooks.fire(LifecycleEvent::PreLoad, &self.settings)?;

        let found = match self.store.deserialize(&self.config.schema_name)? {
            Some(record) => {
                self.settings = serde_json::from_value(record)?;
                true
            }
            None => false,
        };

        self.set_overrides();

        let unlisted = self.catalogs.unlisted(&self.settings);
        if !unlisted.is_empty() {
            tracing::debug!(?unlisted, "settings hold values outside their catalogs");
        }

        self.hooks.fire(LifecycleEvent::PostLoad, &self.settings)?;

        Ok(found)
    }

    /// Write the current settings to storage
    ///
    /// Write failures are returned as-is. In-memory settings are not touched
    /// either way. A non-finite search distance is rejected before the
    /// write, since JSON has no representation for it.
    pub fn save(&mut self) -> Result<()> {
        self.hooks.fire(LifecycleEvent::PreSave, &self.settings)?;

        let distance = self.settings.start_search_distance;
        if !distance.is_finite() {
            return Err(SettingsError::InvalidValue {
                field: "startSearchDistance",
                value: distance.to_string(),
            });
        }

        let record = serde_json::to_value(&self.settings)?;
        self.store.serialize(&self.config.schema_name, &record)?;
        tracing::debug!(schema = %self.config.schema_name, "settings saved");

        self.hooks.fire(LifecycleEvent::PostSave, &self.settings)?;

        Ok(())
    }

    /// Restore every field to its default without touching storage
    pub fn reset_to_defaults(&mut self) {
        self.settings = Settings::default();
    }

    /// Persisted names of fields holding a value their catalog does not offer
    pub fn unlisted_fields(&self) -> Vec<&'static str> {
        self.catalogs.unlisted(&self.settings)
    }

    fn set_overrides(&mut self) {
        self.catalogs = Catalogs::build();
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("config", &self.config)
            .field("settings", &self.settings)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
