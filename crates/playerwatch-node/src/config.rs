//! Node configuration.

use crate::error::{Error, Result};
use playerwatch_registry::HighlightConfig;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File in the data directory holding the [`HighlightConfig`].
pub const HIGHLIGHT_FILE: &str = "highlight.json";

/// Document store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// One JSON file per document
    #[default]
    File,
    /// RocksDB database (requires the `rocksdb` feature)
    RocksDb,
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" | "json" => Ok(StoreBackend::File),
            "rocksdb" | "rocks" => Ok(StoreBackend::RocksDb),
            other => Err(Error::Config(format!("unknown store backend: {}", other))),
        }
    }
}

/// Configuration for a Playerwatch node.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Data directory for documents and the highlight config
    pub data_dir: PathBuf,

    /// Admin socket path
    pub admin_socket: PathBuf,

    /// Maximum profile lookups in flight
    pub max_lookups: usize,

    /// Document store backend
    pub store: StoreBackend,
}

impl NodeConfig {
    /// Config rooted at `data_dir` with default settings.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            admin_socket: data_dir.join("admin.sock"),
            data_dir,
            max_lookups: 4,
            store: StoreBackend::File,
        }
    }

    /// Create config from environment variables with sensible defaults.
    ///
    /// - `PLAYERWATCH_DATA_DIR` (default `./playerwatch-data`)
    /// - `PLAYERWATCH_SOCKET` (default `<data dir>/admin.sock`)
    /// - `PLAYERWATCH_MAX_LOOKUPS` (default 4)
    /// - `PLAYERWATCH_STORE`: `file` or `rocksdb` (default `file`)
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("PLAYERWATCH_DATA_DIR")
            .unwrap_or_else(|_| "./playerwatch-data".to_string());
        let mut config = Self::new(data_dir);

        if let Ok(socket) = std::env::var("PLAYERWATCH_SOCKET") {
            config.admin_socket = PathBuf::from(socket);
        }

        if let Ok(max) = std::env::var("PLAYERWATCH_MAX_LOOKUPS") {
            config.max_lookups = max
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("invalid PLAYERWATCH_MAX_LOOKUPS: {}", e)))?;
        }

        if let Ok(store) = std::env::var("PLAYERWATCH_STORE") {
            config.store = store.parse()?;
        }

        Ok(config)
    }

    /// Path of the highlight config file.
    pub fn highlight_path(&self) -> PathBuf {
        self.data_dir.join(HIGHLIGHT_FILE)
    }

    /// Read the highlight config, falling back to defaults when the file
    /// does not exist.
    pub fn load_highlight(&self) -> Result<HighlightConfig> {
        load_highlight(&self.highlight_path())
    }
}

fn load_highlight(path: &Path) -> Result<HighlightConfig> {
    match std::fs::read_to_string(path) {
        Ok(json) => Ok(HighlightConfig::from_json(&json)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No highlight config at {:?}, using defaults", path);
            Ok(HighlightConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}
