//! Application bootstrap hooks
//!
//! Components register pre-init callbacks while the application is being
//! wired together. The callbacks run once, in registration order, before the
//! UI attaches.

use std::fmt;

use crate::store::SharedSettings;

/// Startup error types
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// A pre-init callback failed
    #[error("Pre-init step '{name}' failed: {source}")]
    PreInit {
        /// Name the callback was registered under
        name: String,
        /// Error returned by the callback
        #[source]
        source: anyhow::Error,
    },

    /// Pre-init callbacks were already run
    #[error("Pre-init already ran")]
    AlreadyRan,
}

/// Result type for startup operations
pub type Result<T> = std::result::Result<T, StartupError>;

type PreInit = Box<dyn FnOnce() -> anyhow::Result<()> + Send>;

/// Pre-init callback registry
#[derive(Default)]
pub struct Startup {
    pre_init: Vec<(String, PreInit)>,
    ran: bool,
}

impl Startup {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named callback to run during pre-init
    pub fn add_pre_init<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        self.pre_init.push((name.into(), Box::new(callback)));
    }

    /// Number of callbacks waiting to run
    pub fn pending(&self) -> usize {
        self.pre_init.len()
    }

    /// Run every pre-init callback in registration order
    ///
    /// Stops at the first failure. A second call returns
    /// [`StartupError::AlreadyRan`].
    pub fn run_pre_init(&mut self) -> Result<()> {
        if self.ran {
            return Err(StartupError::AlreadyRan);
        }
        self.ran = true;

        for (name, callback) in self.pre_init.drain(..) {
            tracing::debug!(step = %name, "running pre-init step");
            callback().map_err(|source| StartupError::PreInit { name, source })?;
        }

        Ok(())
    }
}

impl fmt::Debug for Startup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.pre_init.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("Startup").field("pre_init", &names).field("ran", &self.ran).finish()
    }
}

/// Register the settings store's `pre_initialize` with the bootstrap
///
/// The shared handle stays locked for the whole load. Lifecycle observers
/// read the loaded values from the `&Settings` they are given instead of
/// locking `settings` again.
pub fn register_pre_init(startup: &mut Startup, settings: SharedSettings) {
    startup.add_pre_init("settings", move || {
        settings.lock().pre_initialize()?;
        Ok(())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::LifecycleEvent;
    use crate::store::SettingsStore;
    use std::sync::{Arc, Mutex};
    use storage::{KvObjectStore, KvStore, ObjectStore};

    #[test]
    fn test_runs_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut startup = Startup::new();

        for step in ["log", "settings", "map"] {
            let log = log.clone();
            startup.add_pre_init(step, move || {
                log.lock().unwrap().push(step);
                Ok(())
            });
        }
        assert_eq!(startup.pending(), 3);

        startup.run_pre_init().unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["log", "settings", "map"]);
        assert_eq!(startup.pending(), 0);
    }

    #[test]
    fn test_runs_only_once() {
        let mut startup = Startup::new();
        startup.add_pre_init("noop", || Ok(()));

        startup.run_pre_init().unwrap();
        assert!(matches!(startup.run_pre_init(), Err(StartupError::AlreadyRan)));
    }

    #[test]
    fn test_failure_stops_remaining_steps() {
        let reached = Arc::new(Mutex::new(false));
        let mut startup = Startup::new();
        startup.add_pre_init("gps", || Err(anyhow::anyhow!("no receiver")));
        let flag = reached.clone();
        startup.add_pre_init("map", move || {
            *flag.lock().unwrap() = true;
            Ok(())
        });

        let err = startup.run_pre_init().unwrap_err();
        assert_eq!(err.to_string(), "Pre-init step 'gps' failed: no receiver");
        assert!(!*reached.lock().unwrap());
    }

    #[test]
    fn test_register_settings_pre_init() {
        let backend: Arc<dyn ObjectStore> =
            Arc::new(KvObjectStore::new(KvStore::in_memory().unwrap()));
        backend
            .serialize("Settings", &serde_json::json!({ "startMapType": "BingRoad" }))
            .unwrap();

        let shared = SettingsStore::new(backend).into_shared();
        let mut startup = Startup::new();
        register_pre_init(&mut startup, shared.clone());

        // Nothing is loaded until the bootstrap runs
        assert!(shared.lock().catalogs().is_empty());

        startup.run_pre_init().unwrap();

        let store = shared.lock();
        assert_eq!(store.settings().start_map_type, "BingRoad");
        assert!(!store.catalogs().is_empty());
    }

    #[test]
    fn test_post_load_observer_during_bootstrap() {
        let backend: Arc<dyn ObjectStore> =
            Arc::new(KvObjectStore::new(KvStore::in_memory().unwrap()));
        backend
            .serialize("Settings", &serde_json::json!({ "startView": "mapView" }))
            .unwrap();

        let seen = Arc::new(Mutex::new(None));
        let mut store = SettingsStore::new(backend);
        let slot = seen.clone();
        store.on(LifecycleEvent::PostLoad, move |_, settings| {
            *slot.lock().unwrap() = Some(settings.start_view.clone());
            Ok(())
        });

        let shared = store.into_shared();
        let mut startup = Startup::new();
        register_pre_init(&mut startup, shared.clone());
        startup.run_pre_init().unwrap();

        assert_eq!(seen.lock().unwrap().as_deref(), Some("mapView"));
        assert!(shared.try_lock().is_some());
    }
}
