//! Background-resolved profile data.
//!
//! Every registry entry owns a [`ProfileSlot`]. The registry hands a clone of
//! the slot's `Arc` to a [`RefreshScheduler`], whose task writes the resolved
//! canonical name, id and portrait back into the slot. The whole profile sits
//! behind one lock so a reader never observes a half-applied update.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Opaque account identifier handed out by the name resolution service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    /// Wrap an identifier. Blank identifiers are treated as absent.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    /// The identifier as stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cached portrait image handle. Cheap to clone.
#[derive(Clone, PartialEq, Eq)]
pub struct Portrait(Arc<[u8]>);

impl Portrait {
    /// Wrap raw image bytes.
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    /// Raw image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Portrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Portrait({} bytes)", self.0.len())
    }
}

/// Outcome of a successful background resolution.
#[derive(Debug, Clone)]
pub struct ResolvedProfile {
    /// Canonical spelling of the account name
    pub name: String,

    /// Account identifier
    pub id: ProfileId,

    /// Portrait, when the fetch succeeded
    pub portrait: Option<Portrait>,
}

/// Snapshot of a slot's contents.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    /// Canonical spelling of the name, once resolved
    pub canonical_name: Option<String>,

    /// Account identifier, loaded from storage or resolved
    pub id: Option<ProfileId>,

    /// Portrait, once fetched
    pub portrait: Option<Portrait>,

    /// A resolution is in flight
    pub updating: bool,
}

/// Lock-guarded profile shared between a registry entry and its refresh task.
#[derive(Debug, Default)]
pub struct ProfileSlot {
    state: RwLock<Profile>,
}

impl ProfileSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot with an identifier already known (e.g. from storage).
    pub fn with_id(id: Option<ProfileId>) -> Self {
        Self {
            state: RwLock::new(Profile {
                id,
                ..Profile::default()
            }),
        }
    }

    /// Copy of the current profile.
    pub fn snapshot(&self) -> Profile {
        self.state.read().clone()
    }

    pub fn id(&self) -> Option<ProfileId> {
        self.state.read().id.clone()
    }

    pub fn portrait(&self) -> Option<Portrait> {
        self.state.read().portrait.clone()
    }

    pub fn canonical_name(&self) -> Option<String> {
        self.state.read().canonical_name.clone()
    }

    pub fn is_updating(&self) -> bool {
        self.state.read().updating
    }

    /// True when no resolution is in flight and no portrait is cached yet.
    pub fn needs_refresh(&self) -> bool {
        let state = self.state.read();
        !state.updating && state.portrait.is_none()
    }

    /// Mark the slot as updating.
    ///
    /// Returns false when a resolution is already in flight, in which case
    /// the caller must not start another one.
    pub fn begin_update(&self) -> bool {
        let mut state = self.state.write();
        if state.updating {
            return false;
        }
        state.updating = true;
        true
    }

    /// Store a resolved profile and clear the updating flag.
    ///
    /// A previously cached portrait is kept when the new resolution did not
    /// fetch one.
    pub fn apply(&self, resolved: ResolvedProfile) {
        let mut state = self.state.write();
        state.canonical_name = Some(resolved.name);
        state.id = Some(resolved.id);
        if let Some(portrait) = resolved.portrait {
            state.portrait = Some(portrait);
        }
        state.updating = false;
    }

    /// Clear the updating flag after a failed resolution, leaving the
    /// profile otherwise untouched so a later pass can retry.
    pub fn abandon(&self) {
        self.state.write().updating = false;
    }
}

/// Schedules background resolution of profile slots.
///
/// Implementations must return immediately; the resolution itself runs
/// elsewhere and reports back only through the slot.
pub trait RefreshScheduler: Send + Sync {
    /// Queue resolution of `name` into `slot`.
    fn schedule(&self, slot: Arc<ProfileSlot>, name: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(name: &str, portrait: Option<Portrait>) -> ResolvedProfile {
        ResolvedProfile {
            name: name.to_string(),
            id: ProfileId::new("069a79f444e94726a5befca90e38aaf5").unwrap(),
            portrait,
        }
    }

    #[test]
    fn blank_id_is_absent() {
        assert!(ProfileId::new("").is_none());
        assert!(ProfileId::new("   ").is_none());
        assert_eq!(ProfileId::new("abc").unwrap().as_str(), "abc");
    }

    #[test]
    fn begin_update_guards_in_flight() {
        let slot = ProfileSlot::new();
        assert!(slot.needs_refresh());
        assert!(slot.begin_update());
        assert!(!slot.begin_update());
        assert!(!slot.needs_refresh());

        slot.abandon();
        assert!(!slot.is_updating());
        assert!(slot.needs_refresh());
    }

    #[test]
    fn apply_sets_everything_at_once() {
        let slot = ProfileSlot::new();
        assert!(slot.begin_update());
        slot.apply(resolved("Notch", Some(Portrait::new(vec![1u8, 2, 3]))));

        let profile = slot.snapshot();
        assert_eq!(profile.canonical_name.as_deref(), Some("Notch"));
        assert!(profile.id.is_some());
        assert_eq!(profile.portrait.unwrap().bytes(), &[1, 2, 3]);
        assert!(!profile.updating);
        assert!(!slot.needs_refresh());
    }

    #[test]
    fn apply_keeps_cached_portrait() {
        let slot = ProfileSlot::new();
        slot.apply(resolved("Notch", Some(Portrait::new(vec![9u8]))));
        slot.apply(resolved("Notch", None));
        assert_eq!(slot.portrait().unwrap().bytes(), &[9]);
    }

    #[test]
    fn abandon_keeps_loaded_id() {
        let slot = ProfileSlot::with_id(ProfileId::new("abc"));
        assert!(slot.begin_update());
        slot.abandon();
        assert_eq!(slot.id().unwrap().as_str(), "abc");
        assert!(slot.canonical_name().is_none());
    }
}
