//! Alt-account tracking.
//!
//! [`AltTracker`] partitions tracked names into disjoint [`AltGroup`]s. Every
//! name belongs to at most one group, and within a group the main account is
//! never listed among the alts. Linking two names unions their groups;
//! removing a main promotes an alt when one is left.

use crate::error::Result;
use crate::models::{is_valid_name, AltGroup, StoredGroup};
use crate::profile::RefreshScheduler;
use crate::store::{load_entries, save_entries, DocumentStore};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

/// Key of the tracker's document in the store.
pub const STORAGE_KEY: &str = "alttracker";

/// What [`AltTracker::link`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Neither name was tracked; a new group was created.
    Created { main: String, alt: String },
    /// One name joined the other's existing group as an alt.
    Joined { alt: String, main: String },
    /// Two groups were merged; `absorbed` no longer keys a group.
    Merged { main: String, absorbed: String },
    /// Both names were already in the same group.
    AlreadyLinked,
    /// A name was empty, contained whitespace, or both names were equal.
    Invalid,
}

impl LinkOutcome {
    /// Whether the tracker changed.
    pub fn is_linked(&self) -> bool {
        matches!(
            self,
            LinkOutcome::Created { .. } | LinkOutcome::Joined { .. } | LinkOutcome::Merged { .. }
        )
    }
}

/// Online players tracked as alts, as counted by
/// [`AltTracker::online_alt_summary`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnlineAltSummary {
    /// Online players that are an alt of some group
    pub online_alts: usize,
    /// Size of the roster, local player included
    pub total_players: usize,
    /// Mains owning at least one online alt
    pub mains: BTreeSet<String>,
}

/// Registry of alt groups, persisted on every change.
pub struct AltTracker {
    groups: Vec<AltGroup>,
    store: Arc<dyn DocumentStore>,
    refresher: Option<Arc<dyn RefreshScheduler>>,
}

impl AltTracker {
    /// Create an empty tracker without loading anything.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            groups: Vec::new(),
            store,
            refresher: None,
        }
    }

    /// Schedule portrait resolution of mains through `refresher`.
    pub fn with_refresher(mut self, refresher: Arc<dyn RefreshScheduler>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Load the tracker from `store`.
    ///
    /// Entries repeating a main seen earlier in the document are dropped,
    /// even when that main has since been folded into another group. An
    /// entry sharing other names with an earlier group is folded into it so
    /// groups stay disjoint. Groups are sorted by main and scheduled for resolution.
    pub fn load(
        store: Arc<dyn DocumentStore>,
        refresher: Option<Arc<dyn RefreshScheduler>>,
    ) -> Result<Self> {
        let entries: Vec<StoredGroup> = load_entries(store.as_ref(), STORAGE_KEY)?;

        let mut tracker = Self {
            groups: Vec::with_capacity(entries.len()),
            store,
            refresher,
        };

        let mut seen = HashSet::new();
        for entry in entries {
            if !is_valid_name(&entry.main) {
                tracing::warn!("Skipping alt group with invalid main {:?}", entry.main);
                continue;
            }
            if !seen.insert(entry.main.clone()) {
                tracing::debug!("Dropping duplicate alt group {}", entry.main);
                continue;
            }

            let alts: Vec<String> = entry
                .alts
                .into_iter()
                .filter(|alt| {
                    let valid = is_valid_name(alt);
                    if !valid {
                        tracing::warn!("Skipping invalid alt {:?} of {}", alt, entry.main);
                    }
                    valid
                })
                .collect();

            let group = AltGroup::with_alts(entry.main, alts);
            let overlap = group.accounts().find_map(|name| tracker.index_of_player(name));
            match overlap {
                Some(index) => {
                    let target = tracker.groups[index].main().to_string();
                    tracing::warn!("Alt group {} overlaps {}, merging", group.main(), target);
                    tracker.fold_into(&target, group.into_accounts());
                }
                None => tracker.groups.push(group),
            }
        }

        tracker.groups.sort_by(|a, b| a.main().cmp(b.main()));
        for group in &tracker.groups {
            tracker.schedule(group);
        }

        tracing::info!(
            "Loaded {} alt groups ({} players)",
            tracker.count(),
            tracker.total_tracked_players()
        );
        Ok(tracker)
    }

    /// Add a group, merging it with any group it overlaps.
    ///
    /// With an existing group keyed by the same main, the incoming alts are
    /// added to it. Otherwise, if any incoming name is already tracked, every
    /// incoming name is folded into that name's group. Only a structurally
    /// invalid group (bad main or alt name) is rejected.
    pub fn add_group(&mut self, group: AltGroup) -> bool {
        if !group.accounts().all(is_valid_name) {
            return false;
        }

        if self.index_by_main(group.main()).is_some() {
            let main = group.main().to_string();
            self.fold_into(&main, group.into_accounts());
            self.save();
            return true;
        }

        let overlap = group.accounts().find_map(|name| self.index_of_player(name));
        if let Some(index) = overlap {
            let target = self.groups[index].main().to_string();
            self.fold_into(&target, group.into_accounts());
            self.save();
            return true;
        }

        self.schedule(&group);
        self.groups.push(group);
        self.save();
        true
    }

    /// Delete the group keyed by `main`.
    pub fn remove_group(&mut self, main: &str) -> bool {
        let Some(index) = self.index_by_main(main) else {
            return false;
        };
        self.groups.remove(index);
        self.save();
        true
    }

    /// Stop tracking `name`.
    ///
    /// Removing a main with alts promotes the alphabetically first alt;
    /// removing a main without alts deletes the group; removing an alt only
    /// drops it from its group.
    pub fn remove_player(&mut self, name: &str) -> bool {
        let Some(index) = self.index_of_player(name) else {
            return false;
        };

        let group = &mut self.groups[index];
        if group.is_main(name) {
            match group.promote() {
                Some(new_main) => {
                    tracing::debug!("Promoted {} to main in place of {}", new_main, name);
                    let group = &self.groups[index];
                    self.schedule(group);
                }
                None => {
                    self.groups.remove(index);
                    tracing::debug!("Removed alt group {}", name);
                }
            }
        } else {
            group.remove_alt(name);
            tracing::debug!("Removed alt {} from {}", name, group.main());
        }

        self.save();
        true
    }

    /// Same as [`remove_player`](Self::remove_player).
    pub fn unlink_account(&mut self, name: &str) -> bool {
        self.remove_player(name)
    }

    /// Link `a` and `b` as accounts of the same person.
    pub fn link_accounts(&mut self, a: &str, b: &str) -> bool {
        self.link(a, b).is_linked()
    }

    /// Link `a` and `b`, reporting how the groups changed.
    ///
    /// If neither is tracked, `a` becomes the main of a new group. If one is
    /// tracked, the other joins its group. If both are tracked in different
    /// groups, `b`'s group is folded into `a`'s.
    pub fn link(&mut self, a: &str, b: &str) -> LinkOutcome {
        if !is_valid_name(a) || !is_valid_name(b) || a == b {
            return LinkOutcome::Invalid;
        }

        let outcome = match (self.index_of_player(a), self.index_of_player(b)) {
            (Some(x), Some(y)) if x == y => return LinkOutcome::AlreadyLinked,
            (None, None) => {
                let group = AltGroup::with_alts(a, [b]);
                self.schedule(&group);
                self.groups.push(group);
                LinkOutcome::Created {
                    main: a.to_string(),
                    alt: b.to_string(),
                }
            }
            (None, Some(y)) => {
                self.groups[y].add_alt(a);
                LinkOutcome::Joined {
                    alt: a.to_string(),
                    main: self.groups[y].main().to_string(),
                }
            }
            (Some(x), None) => {
                self.groups[x].add_alt(b);
                LinkOutcome::Joined {
                    alt: b.to_string(),
                    main: self.groups[x].main().to_string(),
                }
            }
            (Some(x), Some(y)) => {
                let absorbed = self.groups.remove(y);
                let x = if y < x { x - 1 } else { x };
                let absorbed_main = absorbed.main().to_string();
                self.groups[x].absorb(absorbed.into_accounts());
                LinkOutcome::Merged {
                    main: self.groups[x].main().to_string(),
                    absorbed: absorbed_main,
                }
            }
        };

        tracing::debug!("Linked {} and {}: {:?}", a, b, outcome);
        self.save();
        outcome
    }

    /// The group `name` belongs to, as main or alt.
    pub fn group_by_player(&self, name: &str) -> Option<&AltGroup> {
        self.groups.iter().find(|g| g.contains(name))
    }

    /// The group whose main is `main`.
    pub fn by_main_account(&self, main: &str) -> Option<&AltGroup> {
        self.groups.iter().find(|g| g.is_main(main))
    }

    pub fn is_tracked(&self, name: &str) -> bool {
        self.group_by_player(name).is_some()
    }

    /// Main of `name`'s group, or `name` itself when untracked.
    pub fn main_account_for<'a>(&'a self, name: &'a str) -> &'a str {
        self.group_by_player(name).map_or(name, AltGroup::main)
    }

    /// The other accounts in `name`'s group. When `name` is an alt, its main
    /// comes first.
    pub fn alts_for(&self, name: &str) -> Vec<String> {
        let Some(group) = self.group_by_player(name) else {
            return Vec::new();
        };

        let mut alts = Vec::with_capacity(group.size());
        if !group.is_main(name) {
            alts.push(group.main().to_string());
        }
        alts.extend(group.alts().iter().filter(|alt| *alt != name).cloned());
        alts
    }

    /// Label for `name`: see [`AltGroup::display_text`].
    pub fn display_name(&self, name: &str) -> String {
        match self.group_by_player(name) {
            Some(group) => group.display_text(name),
            None => name.to_string(),
        }
    }

    /// Label for `name` counting only online alts: see
    /// [`AltGroup::display_text_online`].
    pub fn display_name_online<S: AsRef<str>>(&self, name: &str, online: &[S]) -> String {
        match self.group_by_player(name) {
            Some(group) => group.display_text_online(name, online),
            None => name.to_string(),
        }
    }

    /// Count online players tracked as alts, skipping the local player.
    pub fn online_alt_summary<S: AsRef<str>>(
        &self,
        online: &[S],
        self_name: Option<&str>,
    ) -> OnlineAltSummary {
        let mut summary = OnlineAltSummary {
            total_players: online.len(),
            ..OnlineAltSummary::default()
        };

        for name in online.iter().map(|n| n.as_ref()) {
            if self_name == Some(name) {
                continue;
            }
            if let Some(group) = self.group_by_player(name) {
                if group.has_alt(name) {
                    summary.online_alts += 1;
                    summary.mains.insert(group.main().to_string());
                }
            }
        }
        summary
    }

    /// Number of groups.
    pub fn count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of tracked names across all groups.
    pub fn total_tracked_players(&self) -> usize {
        self.groups.iter().map(AltGroup::size).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AltGroup> {
        self.groups.iter()
    }

    /// Every tracked name, mains and alts.
    pub fn tracked_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().flat_map(AltGroup::accounts)
    }

    /// Reschedule resolution for groups whose main has no portrait and no
    /// resolution in flight. Returns how many were scheduled.
    pub fn refresh_stale(&self) -> usize {
        if self.refresher.is_none() {
            return 0;
        }
        let stale: Vec<_> = self
            .groups
            .iter()
            .filter(|g| g.profile().needs_refresh())
            .collect();
        for group in &stale {
            self.schedule(group);
        }
        stale.len()
    }

    fn index_by_main(&self, main: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.is_main(main))
    }

    fn index_of_player(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(name))
    }

    /// Fold `names` into the group keyed by `target`. A name already tracked
    /// elsewhere brings its whole group along, which is then removed.
    fn fold_into<I: IntoIterator<Item = String>>(&mut self, target: &str, names: I) {
        for name in names {
            match self.index_of_player(&name) {
                Some(index) if self.groups[index].is_main(target) => {}
                Some(index) => {
                    let absorbed = self.groups.remove(index);
                    tracing::debug!("Merging alt group {} into {}", absorbed.main(), target);
                    if let Some(target) = self.index_by_main(target) {
                        self.groups[target].absorb(absorbed.into_accounts());
                    }
                }
                None => {
                    if let Some(target) = self.index_by_main(target) {
                        self.groups[target].add_alt(name);
                    }
                }
            }
        }
    }

    fn schedule(&self, group: &AltGroup) {
        if let Some(refresher) = &self.refresher {
            refresher.schedule(Arc::clone(group.profile()), group.main());
        }
    }

    fn save(&self) {
        let entries: Vec<StoredGroup> = self.groups.iter().map(AltGroup::to_stored).collect();
        if let Err(e) = save_entries(self.store.as_ref(), STORAGE_KEY, &entries) {
            tracing::error!("Failed to save alt groups: {}", e);
        }
    }
}

impl fmt::Debug for AltTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AltTracker")
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

impl<'a> IntoIterator for &'a AltTracker {
    type Item = &'a AltGroup;
    type IntoIter = std::slice::Iter<'a, AltGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}
