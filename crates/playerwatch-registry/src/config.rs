//! Highlight configuration: which social tiers are enabled and their colors.

use crate::error::Result;
use crate::models::Color;
use crate::resolver::SocialStatus;
use serde::{Deserialize, Serialize};

/// Per-tier switches and colors consumed by the resolver.
///
/// Every field has a default, so a partial document deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Highlight the local player
    pub highlight_self: bool,
    pub scary: bool,
    pub blacklisted: bool,
    pub alts: bool,
    pub friends: bool,

    /// Fall back to the player's team color before the default color
    pub use_team_color: bool,

    pub self_color: Color,
    pub scary_color: Color,
    pub blacklisted_color: Color,
    pub alt_color: Color,
    pub friend_color: Color,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            highlight_self: true,
            scary: true,
            blacklisted: true,
            alts: true,
            friends: true,
            use_team_color: true,
            self_color: Color::DEFAULT_SELF,
            scary_color: Color::DEFAULT_SCARY,
            blacklisted_color: Color::DEFAULT_BLACKLISTED,
            alt_color: Color::DEFAULT_ALT,
            friend_color: Color::DEFAULT_FRIEND,
        }
    }
}

impl HighlightConfig {
    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether the tier for `status` takes part in resolution.
    /// The `Player` fallback is always enabled.
    pub fn is_enabled(&self, status: SocialStatus) -> bool {
        match status {
            SocialStatus::SelfPlayer => self.highlight_self,
            SocialStatus::Scary => self.scary,
            SocialStatus::Blacklisted => self.blacklisted,
            SocialStatus::Alt => self.alts,
            SocialStatus::Friend => self.friends,
            SocialStatus::Player => true,
        }
    }

    /// Configured color of a tier; `None` for the `Player` fallback.
    pub fn color(&self, status: SocialStatus) -> Option<Color> {
        match status {
            SocialStatus::SelfPlayer => Some(self.self_color),
            SocialStatus::Scary => Some(self.scary_color),
            SocialStatus::Blacklisted => Some(self.blacklisted_color),
            SocialStatus::Alt => Some(self.alt_color),
            SocialStatus::Friend => Some(self.friend_color),
            SocialStatus::Player => None,
        }
    }
}
