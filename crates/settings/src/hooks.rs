//! Lifecycle notifications for load and save
//!
//! Observers register a callback for one [`LifecycleEvent`]. Firing an event
//! runs its callbacks synchronously in registration order. An observer cannot
//! veto the operation, but an error it returns stops the dispatch and is
//! handed back to the caller of `load`/`save`.
//!
//! Callbacks receive the store's current [`Settings`] read-only. They run
//! while the store is borrowed (and, behind `SharedSettings`, locked), so
//! they must read the values they need from that argument.

use std::fmt;

use crate::model::Settings;

/// Points in the load/save lifecycle at which observers are notified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// Before the persisted record is read
    PreLoad,
    /// After fields are restored and catalogs rebuilt
    PostLoad,
    /// Before the record is written
    PreSave,
    /// After the write returned successfully
    PostSave,
}

impl LifecycleEvent {
    /// All events in lifecycle order
    pub const ALL: [LifecycleEvent; 4] = [
        LifecycleEvent::PreLoad,
        LifecycleEvent::PostLoad,
        LifecycleEvent::PreSave,
        LifecycleEvent::PostSave,
    ];

    /// Event name as used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::PreLoad => "PreLoad",
            LifecycleEvent::PostLoad => "PostLoad",
            LifecycleEvent::PreSave => "PreSave",
            LifecycleEvent::PostSave => "PostSave",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observer callback
pub type Callback = Box<dyn FnMut(LifecycleEvent, &Settings) -> anyhow::Result<()> + Send>;

/// Error returned by a failing observer
#[derive(Debug, thiserror::Error)]
#[error("{event} observer failed: {source}")]
pub struct ObserverError {
    /// Event being dispatched
    pub event: LifecycleEvent,
    /// Error returned by the observer
    #[source]
    pub source: anyhow::Error,
}

/// Callback registry for lifecycle events
#[derive(Default)]
pub struct Hooks {
    observers: Vec<(LifecycleEvent, Callback)>,
}

impl Hooks {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` to run whenever `event` fires
    pub fn on<F>(&mut self, event: LifecycleEvent, callback: F)
    where
        F: FnMut(LifecycleEvent, &Settings) -> anyhow::Result<()> + Send + 'static,
    {
        self.observers.push((event, Box::new(callback)));
    }

    /// Run every callback registered for `event`, in registration order
    pub fn fire(
        &mut self,
        event: LifecycleEvent,
        settings: &Settings,
    ) -> Result<(), ObserverError> {
        tracing::trace!(%event, "firing lifecycle event");

        for (registered, callback) in self.observers.iter_mut() {
            if *registered == event {
                callback(event, settings).map_err(|source| ObserverError { event, source })?;
            }
        }

        Ok(())
    }

    /// Number of callbacks registered for `event`
    pub fn count(&self, event: LifecycleEvent) -> usize {
        self.observers.iter().filter(|(e, _)| *e == event).count()
    }

    /// Total number of registered callbacks
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Check if no callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Remove all callbacks
    pub fn clear(&mut self) {
        self.observers.clear();
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks").field("observers", &self.observers.len()).finish()
    }
}
