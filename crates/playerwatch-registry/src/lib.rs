//! Playerwatch Registry - social classification of player identities
//!
//! Tracks which players are flagged as scary or blacklisted, which accounts
//! belong to the same person, and resolves a single display status and color
//! for any player name.
//!
//! # Architecture
//!
//! - **Flags**: [`FlagRegistry`], one instance per [`FlagKind`]
//! - **Alts**: [`AltTracker`], a disjoint partition of names into [`AltGroup`]s
//! - **Resolver**: [`SocialResolver`], fixed-priority tiers over the registries
//! - **Store**: [`DocumentStore`], where registries flush their documents
//! - **Profiles**: [`ProfileSlot`], background-resolved id and portrait
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use playerwatch_registry::{
//!     AltTracker, Color, FlagKind, FlagRegistry, HighlightConfig, MemoryStore, NoFriends,
//!     SocialResolver, SocialStatus,
//! };
//!
//! let store = Arc::new(MemoryStore::new());
//! let mut scary = FlagRegistry::new(FlagKind::Scary, store.clone());
//! let blacklisted = FlagRegistry::new(FlagKind::Blacklisted, store.clone());
//! let mut alts = AltTracker::new(store);
//!
//! scary.add("Steve");
//! alts.link_accounts("Alice", "Bob");
//!
//! let config = HighlightConfig::default();
//! let resolver = SocialResolver::new(&scary, &blacklisted, &alts, &NoFriends, &config);
//! assert_eq!(resolver.resolve("Steve", false, Color::WHITE, None).status, SocialStatus::Scary);
//! assert_eq!(resolver.resolve("Bob", false, Color::WHITE, None).label(), "Alt");
//! ```

pub mod alts;
pub mod config;
pub mod error;
pub mod flags;
pub mod models;
pub mod profile;
pub mod resolver;
pub mod store;

pub use alts::{AltTracker, LinkOutcome, OnlineAltSummary};
pub use config::HighlightConfig;
pub use error::{Error, Result};
pub use flags::{FlagKind, FlagRegistry};
pub use models::{is_valid_name, AltGroup, Color, PersonRecord};
pub use profile::{Portrait, Profile, ProfileId, ProfileSlot, RefreshScheduler, ResolvedProfile};
pub use resolver::{Classification, Friends, NoFriends, SocialResolver, SocialStatus, VisibilityFilter};
pub use store::{DocumentStore, MemoryStore};
