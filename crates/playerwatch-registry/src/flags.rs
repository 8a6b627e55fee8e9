//! Flag registries: named sets of players marked scary or blacklisted.

use crate::error::Result;
use crate::models::{is_valid_name, PersonRecord, StoredPerson};
use crate::profile::{ProfileId, RefreshScheduler};
use crate::store::{load_entries, save_entries, DocumentStore};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// The classification a [`FlagRegistry`] tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKind {
    Scary,
    Blacklisted,
}

impl FlagKind {
    /// Key of the registry's document in the store.
    pub const fn storage_key(self) -> &'static str {
        match self {
            FlagKind::Scary => "scarypeople",
            FlagKind::Blacklisted => "blacklistedpeople",
        }
    }

    /// Human-readable collection name.
    pub const fn title(self) -> &'static str {
        match self {
            FlagKind::Scary => "scary people",
            FlagKind::Blacklisted => "blacklisted people",
        }
    }
}

/// Insertion-ordered set of flagged players, persisted on every change.
pub struct FlagRegistry {
    kind: FlagKind,
    people: Vec<Arc<PersonRecord>>,
    store: Arc<dyn DocumentStore>,
    refresher: Option<Arc<dyn RefreshScheduler>>,
}

impl FlagRegistry {
    /// Create an empty registry without loading anything.
    pub fn new(kind: FlagKind, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            kind,
            people: Vec::new(),
            store,
            refresher: None,
        }
    }

    /// Schedule profile resolution through `refresher` for added records.
    pub fn with_refresher(mut self, refresher: Arc<dyn RefreshScheduler>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Load the registry from `store`.
    ///
    /// Invalid names are skipped and duplicate names keep their first
    /// occurrence. The result is sorted by
    /// name and every record is scheduled for resolution.
    pub fn load(
        kind: FlagKind,
        store: Arc<dyn DocumentStore>,
        refresher: Option<Arc<dyn RefreshScheduler>>,
    ) -> Result<Self> {
        let entries: Vec<StoredPerson> = load_entries(store.as_ref(), kind.storage_key())?;

        let mut seen = HashSet::new();
        let mut people = Vec::with_capacity(entries.len());
        for entry in entries {
            if !is_valid_name(&entry.name) {
                tracing::warn!("Skipping {} entry with invalid name {:?}", kind.title(), entry.name);
                continue;
            }
            if !seen.insert(entry.name.clone()) {
                tracing::debug!("Dropping duplicate {} entry {}", kind.title(), entry.name);
                continue;
            }
            let id = entry.id.and_then(ProfileId::new);
            people.push(Arc::new(PersonRecord::with_id(entry.name, id)));
        }
        people.sort_by(|a, b| a.name().cmp(b.name()));

        let registry = Self {
            kind,
            people,
            store,
            refresher,
        };
        for record in &registry.people {
            registry.schedule(record);
        }

        tracing::info!("Loaded {} {}", registry.count(), kind.title());
        Ok(registry)
    }

    /// Flag `name`. Fails for invalid names and names already flagged.
    pub fn add(&mut self, name: &str) -> bool {
        if !is_valid_name(name) || self.contains(name) {
            return false;
        }

        let record = Arc::new(PersonRecord::new(name));
        self.schedule(&record);
        self.people.push(record);
        self.save();

        tracing::debug!("Added {} to {}", name, self.kind.title());
        true
    }

    /// Unflag `name`. Returns whether a record was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(index) = self.people.iter().position(|p| p.name() == name) else {
            return false;
        };

        self.people.remove(index);
        self.save();

        tracing::debug!("Removed {} from {}", name, self.kind.title());
        true
    }

    pub fn get(&self, name: &str) -> Option<&Arc<PersonRecord>> {
        self.people.iter().find(|p| p.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn count(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<PersonRecord>> {
        self.people.iter()
    }

    /// Flagged names present in `online`, in roster order.
    pub fn flagged_among<'a, S: AsRef<str>>(&self, online: &'a [S]) -> Vec<&'a str> {
        online
            .iter()
            .map(|name| name.as_ref())
            .filter(|name| self.contains(name))
            .collect()
    }

    /// Reschedule resolution for records that have no portrait and no
    /// resolution in flight. Returns how many were scheduled.
    pub fn refresh_stale(&self) -> usize {
        if self.refresher.is_none() {
            return 0;
        }
        let stale: Vec<_> = self
            .people
            .iter()
            .filter(|p| p.profile().needs_refresh())
            .collect();
        for record in &stale {
            self.schedule(record);
        }
        stale.len()
    }

    fn schedule(&self, record: &PersonRecord) {
        if let Some(refresher) = &self.refresher {
            refresher.schedule(Arc::clone(record.profile()), record.name());
        }
    }

    fn save(&self) {
        let entries: Vec<StoredPerson> = self.people.iter().map(|p| p.to_stored()).collect();
        if let Err(e) = save_entries(self.store.as_ref(), self.kind.storage_key(), &entries) {
            tracing::error!("Failed to save {}: {}", self.kind.title(), e);
        }
    }
}

impl fmt::Debug for FlagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagRegistry")
            .field("kind", &self.kind)
            .field("people", &self.people)
            .finish_non_exhaustive()
    }
}

impl<'a> IntoIterator for &'a FlagRegistry {
    type Item = &'a Arc<PersonRecord>;
    type IntoIter = std::slice::Iter<'a, Arc<PersonRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.people.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileSlot;
    use crate::store::MemoryStore;
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingScheduler {
        names: Mutex<Vec<String>>,
    }

    impl RefreshScheduler for RecordingScheduler {
        fn schedule(&self, _slot: Arc<ProfileSlot>, name: &str) {
            self.names.lock().push(name.to_string());
        }
    }

    fn scary(store: &Arc<MemoryStore>) -> FlagRegistry {
        FlagRegistry::new(FlagKind::Scary, store.clone())
    }

    #[test]
    fn add_get_remove_scenario() {
        let store = Arc::new(MemoryStore::new());
        let mut registry = scary(&store);

        assert!(registry.add("Steve"));
        assert!(registry.get("Steve").is_some());
        assert!(!registry.add("Steve"));

        assert!(!registry.remove("Steye"));
        assert!(registry.get("Steye").is_none());
        assert!(registry.remove("Steve"));
        assert!(registry.get("Steve").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn rejects_invalid_names() {
        let store = Arc::new(MemoryStore::new());
        let mut registry = scary(&store);

        assert!(!registry.add(""));
        assert!(!registry.add("Steve Jobs"));
        assert_eq!(registry.count(), 0);
        assert!(store.get("scarypeople").unwrap().is_none());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let store = Arc::new(MemoryStore::new());
        let mut registry = scary(&store);
        registry.add("Steve");

        assert!(registry.contains("Steve"));
        assert!(!registry.contains("steve"));
        assert!(registry.add("steve"));
        assert_eq!(registry.count(), 2);
    }

    #[test]
    fn every_mutation_persists() {
        let store = Arc::new(MemoryStore::new());
        let mut registry = scary(&store);

        registry.add("Zed");
        registry.add("Abe");
        assert_eq!(
            store.get("scarypeople").unwrap(),
            Some(json!([{"name": "Zed"}, {"name": "Abe"}]))
        );

        registry.remove("Zed");
        assert_eq!(
            store.get("scarypeople").unwrap(),
            Some(json!([{"name": "Abe"}]))
        );
    }

    #[test]
    fn load_dedupes_and_sorts() {
        let store = Arc::new(MemoryStore::new());
        store
            .put(
                "blacklistedpeople",
                &json!([
                    {"name": "Zed", "id": "first"},
                    {"id": "nameless"},
                    {"name": "Abe"},
                    {"name": "Zed", "id": "second"},
                    {"name": "Mia", "id": ""},
                    {"name": ""},
                    {"name": "Two Words"}
                ]),
            )
            .unwrap();

        let registry = FlagRegistry::load(FlagKind::Blacklisted, store.clone(), None).unwrap();
        let names: Vec<_> = registry.iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["Abe", "Mia", "Zed"]);
        assert_eq!(registry.get("Zed").unwrap().id().unwrap().as_str(), "first");
        assert!(registry.get("Mia").unwrap().id().is_none());
        assert!(!registry.contains(""));
        assert!(!registry.contains("Two Words"));
    }

    #[test]
    fn appended_entries_follow_sorted_prefix() {
        let store = Arc::new(MemoryStore::new());
        store
            .put("scarypeople", &json!([{"name": "Mia"}, {"name": "Bob"}]))
            .unwrap();

        let mut registry = FlagRegistry::load(FlagKind::Scary, store.clone(), None).unwrap();
        registry.add("Abe");
        let names: Vec<_> = registry.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Bob", "Mia", "Abe"]);
    }

    #[test]
    fn load_and_add_schedule_resolution() {
        let store = Arc::new(MemoryStore::new());
        store
            .put("scarypeople", &json!([{"name": "Bob"}, {"name": "Abe"}]))
            .unwrap();

        let scheduler = Arc::new(RecordingScheduler::default());
        let mut registry =
            FlagRegistry::load(FlagKind::Scary, store, Some(scheduler.clone())).unwrap();
        registry.add("Cat");
        registry.add("Cat");

        assert_eq!(*scheduler.names.lock(), vec!["Abe", "Bob", "Cat"]);
    }

    #[test]
    fn refresh_stale_skips_in_flight_and_cached() {
        let store = Arc::new(MemoryStore::new());
        let scheduler = Arc::new(RecordingScheduler::default());
        let mut registry = scary(&store).with_refresher(scheduler.clone());
        registry.add("Abe");
        registry.add("Bob");
        scheduler.names.lock().clear();

        registry.get("Abe").unwrap().profile().begin_update();
        assert_eq!(registry.refresh_stale(), 1);
        assert_eq!(*scheduler.names.lock(), vec!["Bob"]);
    }

    #[test]
    fn flagged_among_roster() {
        let store = Arc::new(MemoryStore::new());
        let mut registry = scary(&store);
        registry.add("Steve");
        registry.add("Herobrine");

        let online = vec!["Alex".to_string(), "Herobrine".to_string(), "Steve".to_string()];
        assert_eq!(registry.flagged_among(&online), vec!["Herobrine", "Steve"]);
    }
}
