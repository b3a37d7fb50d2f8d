//! geosearch bootstrap
//!
//! Opens device storage, wires the settings store into the startup hooks and
//! runs pre-init. Environment:
//!
//! - `GEOSEARCH_DATA_DIR`: storage directory (default `./geosearch-data`)
//! - `GEOSEARCH_BACKEND`: `kv` (sled, default) or `file` (one JSON file per schema)
//! - `RUST_LOG`: tracing filter (default `info`)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use settings::{register_pre_init, SettingsStore, Startup};
use storage::{FileObjectStore, FileStoreConfig, KvConfig, KvObjectStore, KvStore, ObjectStore};
use tracing_subscriber::EnvFilter;

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    Kv,
    File,
}

/// Bootstrap configuration read from the environment
#[derive(Debug, Clone)]
struct AppConfig {
    data_dir: PathBuf,
    backend: Backend,
}

impl AppConfig {
    fn from_env() -> anyhow::Result<Self> {
        let data_dir = std::env::var_os("GEOSEARCH_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("geosearch-data"));

        let backend = match std::env::var("GEOSEARCH_BACKEND").as_deref() {
            Ok("kv") | Err(_) => Backend::Kv,
            Ok("file") => Backend::File,
            Ok(other) => bail!("unknown GEOSEARCH_BACKEND '{}', expected 'kv' or 'file'", other),
        };

        Ok(Self { data_dir, backend })
    }

    fn open_store(&self) -> anyhow::Result<Arc<dyn ObjectStore>> {
        let store: Arc<dyn ObjectStore> = match self.backend {
            Backend::Kv => {
                let path = self.data_dir.join("kv");
                let kv = KvStore::new(KvConfig::new(path.to_string_lossy()))
                    .with_context(|| format!("opening key-value store at {}", path.display()))?;
                Arc::new(KvObjectStore::new(kv))
            }
            Backend::File => {
                let config = FileStoreConfig::new(&self.data_dir).backups(true, 3);
                Arc::new(FileObjectStore::new(config).with_context(|| {
                    format!("opening file store at {}", self.data_dir.display())
                })?)
            }
        };
        Ok(store)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(?config, "starting geosearch");

    let settings = SettingsStore::new(config.open_store()?).into_shared();

    let mut startup = Startup::new();
    register_pre_init(&mut startup, settings.clone());
    startup.run_pre_init()?;

    let store = settings.lock();
    let current = store.settings();
    let catalogs = store.catalogs();
    tracing::info!(
        map = catalogs.map_type_name(&current.start_map_type).unwrap_or(&current.start_map_type),
        zoom = current.start_map_zoom_level,
        distance_km = current.start_search_distance,
        results = current.start_result_amount,
        view = %current.start_view,
        caching = !current.disable_caching,
        "settings ready"
    );

    let unlisted = store.unlisted_fields();
    if !unlisted.is_empty() {
        tracing::info!(?unlisted, "some settings use values not offered in the settings screen");
    }

    Ok(())
}
