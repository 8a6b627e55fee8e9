//! Alternate-account groups.

use crate::profile::{Portrait, ProfileSlot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// One person's accounts: a main account and zero or more alts.
///
/// The main is never a member of `alts`. Alts are kept ordered, which makes
/// promotion on removal of the main deterministic.
#[derive(Debug, Clone)]
pub struct AltGroup {
    main: String,
    alts: BTreeSet<String>,
    profile: Arc<ProfileSlot>,
}

impl AltGroup {
    /// Create a group with no alts.
    pub fn new(main: impl Into<String>) -> Self {
        Self {
            main: main.into(),
            alts: BTreeSet::new(),
            profile: Arc::new(ProfileSlot::new()),
        }
    }

    /// Create a group with the given alts. The main is dropped from the alts
    /// if present.
    pub fn with_alts<I, S>(main: impl Into<String>, alts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut group = Self::new(main);
        for alt in alts {
            group.add_alt(alt);
        }
        group
    }

    pub fn main(&self) -> &str {
        &self.main
    }

    /// Alts in name order.
    pub fn alts(&self) -> &BTreeSet<String> {
        &self.alts
    }

    pub fn has_alt(&self, name: &str) -> bool {
        self.alts.contains(name)
    }

    pub fn is_main(&self, name: &str) -> bool {
        self.main == name
    }

    /// Whether `name` is the main or one of the alts.
    pub fn contains(&self, name: &str) -> bool {
        self.is_main(name) || self.has_alt(name)
    }

    /// Number of accounts in the group, main included.
    pub fn size(&self) -> usize {
        1 + self.alts.len()
    }

    /// The main followed by the alts.
    pub fn accounts(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.main.as_str()).chain(self.alts.iter().map(String::as_str))
    }

    /// Portrait of the main account, once fetched.
    pub fn portrait(&self) -> Option<Portrait> {
        self.profile.portrait()
    }

    /// Shared profile slot of the main account.
    pub fn profile(&self) -> &Arc<ProfileSlot> {
        &self.profile
    }

    /// Label for `current` as seen in lists:
    /// `main (+N alts)` for the main, `alt (main)` for an alt.
    pub fn display_text(&self, current: &str) -> String {
        if self.is_main(current) {
            if self.alts.is_empty() {
                return self.main.clone();
            }
            format!("{} (+{} alts)", self.main, self.alts.len())
        } else if self.has_alt(current) {
            format!("{} ({})", current, self.main)
        } else {
            current.to_string()
        }
    }

    /// Like [`display_text`](Self::display_text), but the main's count only
    /// includes alts present in `online`.
    pub fn display_text_online<S: AsRef<str>>(&self, current: &str, online: &[S]) -> String {
        if self.is_main(current) {
            let online_alts = self
                .alts
                .iter()
                .filter(|alt| online.iter().any(|name| name.as_ref() == alt.as_str()))
                .count();
            if online_alts == 0 {
                return self.main.clone();
            }
            format!("{} (+{})", self.main, online_alts)
        } else if self.has_alt(current) {
            format!("{} ({})", current, self.main)
        } else {
            current.to_string()
        }
    }

    /// Add an alt. Adding the main is a no-op.
    pub(crate) fn add_alt(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if name == self.main {
            return false;
        }
        self.alts.insert(name)
    }

    pub(crate) fn remove_alt(&mut self, name: &str) -> bool {
        self.alts.remove(name)
    }

    /// Fold a set of names into this group's alts, skipping the main.
    pub(crate) fn absorb<I: IntoIterator<Item = String>>(&mut self, names: I) {
        for name in names {
            self.add_alt(name);
        }
    }

    /// Replace the main with the first alt in name order.
    ///
    /// The promoted account gets a fresh profile slot. Returns the new main,
    /// or `None` when there is no alt to promote.
    pub(crate) fn promote(&mut self) -> Option<&str> {
        let new_main = self.alts.pop_first()?;
        self.main = new_main;
        self.profile = Arc::new(ProfileSlot::new());
        Some(self.main.as_str())
    }

    /// Consume the group, yielding the main followed by the alts.
    pub(crate) fn into_accounts(self) -> impl Iterator<Item = String> {
        std::iter::once(self.main).chain(self.alts)
    }

    pub(crate) fn to_stored(&self) -> StoredGroup {
        StoredGroup {
            main: self.main.clone(),
            alts: self.alts.iter().cloned().collect(),
        }
    }
}

/// Persisted shape of an [`AltGroup`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredGroup {
    #[serde(alias = "mainAccount")]
    pub main: String,
    #[serde(default, alias = "altAccounts")]
    pub alts: Vec<String>,
}
