//! Social state shared by the node's tasks.

use crate::error::Result;
use playerwatch_registry::{
    AltTracker, DocumentStore, FlagKind, FlagRegistry, Friends, HighlightConfig, NoFriends,
    RefreshScheduler, SocialResolver,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handle to the node's state.
pub type SharedState = Arc<RwLock<SocialState>>;

/// Every registry of the node plus the latest view of the server.
///
/// There is exactly one instance per node; commands mutate it under the
/// write lock of [`SharedState`].
pub struct SocialState {
    pub scary: FlagRegistry,
    pub blacklisted: FlagRegistry,
    pub alts: AltTracker,
    pub highlight: HighlightConfig,

    /// Names currently online, as last pushed by the client
    pub roster: Vec<String>,

    /// Name of the local player, if known
    pub self_name: Option<String>,

    friends: Box<dyn Friends + Send + Sync>,
}

impl SocialState {
    /// Load all registries from `store`.
    pub fn load(
        store: Arc<dyn DocumentStore>,
        refresher: Option<Arc<dyn RefreshScheduler>>,
        highlight: HighlightConfig,
    ) -> Result<Self> {
        let scary = FlagRegistry::load(FlagKind::Scary, Arc::clone(&store), refresher.clone())?;
        let blacklisted =
            FlagRegistry::load(FlagKind::Blacklisted, Arc::clone(&store), refresher.clone())?;
        let alts = AltTracker::load(store, refresher)?;

        Ok(Self {
            scary,
            blacklisted,
            alts,
            highlight,
            roster: Vec::new(),
            self_name: None,
            friends: Box::new(NoFriends),
        })
    }

    /// Replace the friends list.
    pub fn with_friends(mut self, friends: impl Friends + Send + Sync + 'static) -> Self {
        self.friends = Box::new(friends);
        self
    }

    /// Wrap in a [`SharedState`].
    pub fn into_shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }

    /// Resolver over the current registries.
    pub fn resolver(&self) -> SocialResolver<'_> {
        SocialResolver::new(
            &self.scary,
            &self.blacklisted,
            &self.alts,
            &*self.friends,
            &self.highlight,
        )
    }

    pub fn flags(&self, kind: FlagKind) -> &FlagRegistry {
        match kind {
            FlagKind::Scary => &self.scary,
            FlagKind::Blacklisted => &self.blacklisted,
        }
    }

    pub fn flags_mut(&mut self, kind: FlagKind) -> &mut FlagRegistry {
        match kind {
            FlagKind::Scary => &mut self.scary,
            FlagKind::Blacklisted => &mut self.blacklisted,
        }
    }

    pub fn is_self(&self, name: &str) -> bool {
        self.self_name.as_deref() == Some(name)
    }

    /// Replace the online roster and, when given, the local player's name.
    pub fn update_roster(&mut self, players: Vec<String>, self_name: Option<String>) {
        self.roster = players;
        if self_name.is_some() {
            self.self_name = self_name;
        }
        tracing::debug!("Roster updated: {} players online", self.roster.len());
    }

    /// Reschedule every profile that still lacks a portrait.
    pub fn refresh_stale(&self) -> usize {
        self.scary.refresh_stale() + self.blacklisted.refresh_stale() + self.alts.refresh_stale()
    }
}
