//! Document storage seam.
//!
//! Registries persist themselves as one JSON document per registry key. The
//! backend is supplied by the host; [`MemoryStore`] keeps documents in memory.

use crate::error::Result;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Key-value store of structured documents.
pub trait DocumentStore: Send + Sync {
    /// Fetch the document stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the document stored under `key`.
    fn put(&self, key: &str, document: &Value) -> Result<()>;
}

/// In-memory document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.documents.lock().get(key).cloned())
    }

    fn put(&self, key: &str, document: &Value) -> Result<()> {
        self.documents.lock().insert(key.to_string(), document.clone());
        Ok(())
    }
}

/// Read the list document under `key`, decoding each entry on its own.
///
/// Entries that fail to decode (missing required fields, wrong types) are
/// skipped. A document that is not a list is treated as empty.
pub(crate) fn load_entries<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    key: &str,
) -> Result<Vec<T>> {
    let Some(document) = store.get(key)? else {
        return Ok(Vec::new());
    };

    let Value::Array(items) = document else {
        tracing::warn!("Document {} is not a list, starting empty", key);
        return Ok(Vec::new());
    };

    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value(item) {
            Ok(entry) => entries.push(entry),
            Err(e) => tracing::warn!("Skipping malformed entry {} in {}: {}", index, key, e),
        }
    }
    Ok(entries)
}

/// Serialize `entries` and store them under `key`.
pub(crate) fn save_entries<T: serde::Serialize>(
    store: &dyn DocumentStore,
    key: &str,
    entries: &[T],
) -> Result<()> {
    let document = serde_json::to_value(entries)?;
    store.put(key, &document)
}
