//! Persistent document stores.
//!
//! [`FileStore`] keeps one pretty-printed JSON file per document. With the
//! `rocksdb` feature, [`RocksStore`] keeps documents in a RocksDB database.

use crate::config::{NodeConfig, StoreBackend};
use crate::error::{Error, Result};
use playerwatch_registry::{DocumentStore, Error as RegistryError};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Open the store selected by `config`.
pub fn open_store(config: &NodeConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.store {
        StoreBackend::File => Ok(Arc::new(FileStore::open(&config.data_dir)?)),
        #[cfg(feature = "rocksdb")]
        StoreBackend::RocksDb => Ok(Arc::new(RocksStore::open(config.data_dir.join("db"))?)),
        #[cfg(not(feature = "rocksdb"))]
        StoreBackend::RocksDb => Err(Error::Config(
            "rocksdb store requested but the rocksdb feature is disabled".into(),
        )),
    }
}

/// Directory of JSON documents, one file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open or create a store in `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> playerwatch_registry::Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(RegistryError::Storage(format!("invalid document key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl DocumentStore for FileStore {
    fn get(&self, key: &str) -> playerwatch_registry::Result<Option<Value>> {
        let path = self.path(key)?;
        match std::fs::read(&path) {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, document: &Value) -> playerwatch_registry::Result<()> {
        let path = self.path(key)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(document)?)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// RocksDB-backed document store.
#[cfg(feature = "rocksdb")]
pub struct RocksStore {
    db: rocksdb::DB,
}

#[cfg(feature = "rocksdb")]
impl RocksStore {
    /// Open or create a database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = rocksdb::Options::default();
        opts.create_if_missing(true);
        let db = rocksdb::DB::open(&opts, path).map_err(storage_error)?;
        Ok(Self { db })
    }
}

#[cfg(feature = "rocksdb")]
fn storage_error(e: rocksdb::Error) -> RegistryError {
    RegistryError::Storage(e.to_string())
}

#[cfg(feature = "rocksdb")]
impl DocumentStore for RocksStore {
    fn get(&self, key: &str) -> playerwatch_registry::Result<Option<Value>> {
        let key = format!("doc:{}", key);
        match self.db.get(key.as_bytes()).map_err(storage_error)? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, document: &Value) -> playerwatch_registry::Result<()> {
        let key = format!("doc:{}", key);
        let value = serde_json::to_vec(document)?;
        self.db.put(key.as_bytes(), value).map_err(storage_error)?;
        Ok(())
    }
}
