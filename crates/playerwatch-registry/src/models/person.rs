//! Flagged player records.

use crate::profile::{Portrait, ProfileId, ProfileSlot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A player in a flag registry.
///
/// Identity is the `name` alone (case-sensitive). The profile is resolved in
/// the background and may lag behind the record's creation.
#[derive(Debug)]
pub struct PersonRecord {
    name: String,
    profile: Arc<ProfileSlot>,
}

impl PersonRecord {
    /// Create a record with an empty profile.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(name, None)
    }

    /// Create a record whose id is already known.
    pub fn with_id(name: impl Into<String>, id: Option<ProfileId>) -> Self {
        Self {
            name: name.into(),
            profile: Arc::new(ProfileSlot::with_id(id)),
        }
    }

    /// The name this record is keyed by.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical spelling once resolved, otherwise the stored name.
    pub fn display_name(&self) -> String {
        self.profile
            .canonical_name()
            .unwrap_or_else(|| self.name.clone())
    }

    pub fn id(&self) -> Option<ProfileId> {
        self.profile.id()
    }

    pub fn portrait(&self) -> Option<Portrait> {
        self.profile.portrait()
    }

    /// Shared profile slot, handed to refresh tasks.
    pub fn profile(&self) -> &Arc<ProfileSlot> {
        &self.profile
    }

    pub(crate) fn to_stored(&self) -> StoredPerson {
        StoredPerson {
            name: self.name.clone(),
            id: self.profile.id().map(|id| id.as_str().to_string()),
        }
    }
}

impl PartialEq for PersonRecord {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for PersonRecord {}

/// Persisted shape of a [`PersonRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredPerson {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}
