//! Social status resolution.
//!
//! A player name resolves through a fixed list of tiers, highest priority
//! first:
//!
//! 1. Self (the local player)
//! 2. Scary
//! 3. Blacklisted
//! 4. Alt (tracked in any alt group)
//! 5. Friend
//!
//! The first enabled tier that matches supplies both the label and the
//! color. When none matches, the player falls back to their team color or
//! the caller's default.

use crate::alts::AltTracker;
use crate::config::HighlightConfig;
use crate::flags::FlagRegistry;
use crate::models::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Friends list maintained outside the registries.
pub trait Friends {
    fn is_friend(&self, name: &str) -> bool;
}

/// A friends list with nobody on it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFriends;

impl Friends for NoFriends {
    fn is_friend(&self, _name: &str) -> bool {
        false
    }
}

impl Friends for HashSet<String> {
    fn is_friend(&self, name: &str) -> bool {
        self.contains(name)
    }
}

/// Social status of a player, in resolution priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialStatus {
    #[serde(rename = "self")]
    SelfPlayer,
    Scary,
    Blacklisted,
    Alt,
    Friend,
    Player,
}

impl SocialStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SocialStatus::SelfPlayer => "Self",
            SocialStatus::Scary => "Scary",
            SocialStatus::Blacklisted => "Blacklisted",
            SocialStatus::Alt => "Alt",
            SocialStatus::Friend => "Friend",
            SocialStatus::Player => "Player",
        }
    }
}

impl fmt::Display for SocialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolved status and the color drawn from the same tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub status: SocialStatus,
    pub color: Color,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        self.status.label()
    }
}

type TierCheck = fn(&SocialResolver<'_>, &str, bool) -> bool;

/// Tiers in priority order. Adding a classification is one entry here.
const TIERS: [(SocialStatus, TierCheck); 5] = [
    (SocialStatus::SelfPlayer, matches_self),
    (SocialStatus::Scary, matches_scary),
    (SocialStatus::Blacklisted, matches_blacklisted),
    (SocialStatus::Alt, matches_alt),
    (SocialStatus::Friend, matches_friend),
];

fn matches_self(_: &SocialResolver<'_>, _: &str, is_self: bool) -> bool {
    is_self
}

fn matches_scary(resolver: &SocialResolver<'_>, name: &str, _: bool) -> bool {
    resolver.scary.contains(name)
}

fn matches_blacklisted(resolver: &SocialResolver<'_>, name: &str, _: bool) -> bool {
    resolver.blacklisted.contains(name)
}

fn matches_alt(resolver: &SocialResolver<'_>, name: &str, _: bool) -> bool {
    resolver.alts.is_tracked(name)
}

fn matches_friend(resolver: &SocialResolver<'_>, name: &str, _: bool) -> bool {
    resolver.friends.is_friend(name)
}

/// Read-only view over the registries that answers status queries.
pub struct SocialResolver<'a> {
    scary: &'a FlagRegistry,
    blacklisted: &'a FlagRegistry,
    alts: &'a AltTracker,
    friends: &'a dyn Friends,
    config: &'a HighlightConfig,
}

impl<'a> SocialResolver<'a> {
    pub fn new(
        scary: &'a FlagRegistry,
        blacklisted: &'a FlagRegistry,
        alts: &'a AltTracker,
        friends: &'a dyn Friends,
        config: &'a HighlightConfig,
    ) -> Self {
        Self {
            scary,
            blacklisted,
            alts,
            friends,
            config,
        }
    }

    /// Resolve `name` to a status and color.
    ///
    /// `is_self` is the caller's judgement of whether `name` is the local
    /// player. `team_color` is the player's team color, if the caller knows
    /// one. Friend and team colors take the alpha of `default`.
    pub fn resolve(
        &self,
        name: &str,
        is_self: bool,
        default: Color,
        team_color: Option<Color>,
    ) -> Classification {
        match self.first_tier(name, is_self, true) {
            Some(status) => Classification {
                status,
                color: self.tier_color(status, default),
            },
            None => Classification {
                status: SocialStatus::Player,
                color: self.fallback_color(default, team_color),
            },
        }
    }

    /// Color of the first enabled matching tier, without any fallback.
    pub fn highlight_color(&self, name: &str, is_self: bool) -> Option<Color> {
        self.first_tier(name, is_self, true)
            .and_then(|status| self.config.color(status))
    }

    /// Whether any tier matches, regardless of which tiers are enabled.
    pub fn has_special_status(&self, name: &str, is_self: bool) -> bool {
        self.first_tier(name, is_self, false).is_some()
    }

    /// Status label regardless of which tiers are enabled.
    pub fn social_status(&self, name: &str, is_self: bool) -> SocialStatus {
        self.first_tier(name, is_self, false)
            .unwrap_or(SocialStatus::Player)
    }

    /// Name as shown in the tab list. Alts are annotated with their group,
    /// counting only the online alts of a main.
    pub fn tab_display_name<S: AsRef<str>>(&self, name: &str, is_self: bool, online: &[S]) -> String {
        match self.first_tier(name, is_self, true) {
            Some(SocialStatus::Alt) => self.alts.display_name_online(name, online),
            _ => name.to_string(),
        }
    }

    /// Name as shown on the radar: `name [Status]`, or the bare name for
    /// ordinary players.
    pub fn radar_label(&self, name: &str, is_self: bool) -> String {
        match self.social_status(name, is_self) {
            SocialStatus::Player => name.to_string(),
            status => format!("{} [{}]", name, status),
        }
    }

    fn first_tier(&self, name: &str, is_self: bool, honor_switches: bool) -> Option<SocialStatus> {
        TIERS
            .iter()
            .find(|(status, check)| {
                (!honor_switches || self.config.is_enabled(*status)) && check(self, name, is_self)
            })
            .map(|(status, _)| *status)
    }

    fn tier_color(&self, status: SocialStatus, default: Color) -> Color {
        let color = self.config.color(status).unwrap_or(default);
        if status == SocialStatus::Friend {
            color.with_alpha(default.a)
        } else {
            color
        }
    }

    fn fallback_color(&self, default: Color, team_color: Option<Color>) -> Color {
        match team_color {
            Some(team) if self.config.use_team_color && !team.same_rgb(&Color::WHITE) => {
                team.with_alpha(default.a)
            }
            _ => default,
        }
    }
}

/// Which players a radar-style list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityFilter {
    pub friends: bool,
    pub scary: bool,
    pub blacklisted: bool,
    pub alts: bool,
    /// Show only players with a special status
    pub special_only: bool,
}

impl Default for VisibilityFilter {
    fn default() -> Self {
        Self {
            friends: true,
            scary: true,
            blacklisted: true,
            alts: true,
            special_only: false,
        }
    }
}

impl VisibilityFilter {
    /// Whether `name` passes the filter.
    ///
    /// With `special_only`, a player counts as special when any tier
    /// matches, even one whose highlight is disabled.
    pub fn should_show(&self, resolver: &SocialResolver<'_>, name: &str, is_self: bool) -> bool {
        if !self.friends && resolver.friends.is_friend(name) {
            return false;
        }
        if !self.scary && resolver.scary.contains(name) {
            return false;
        }
        if !self.blacklisted && resolver.blacklisted.contains(name) {
            return false;
        }
        if !self.alts && resolver.alts.is_tracked(name) {
            return false;
        }
        if self.special_only {
            return resolver.has_special_status(name, is_self);
        }
        true
    }
}
