//! Registry data types.
//!
//! - [`PersonRecord`] - a flagged player (scary or blacklisted)
//! - [`AltGroup`] - one main account and its alternate accounts
//! - [`Color`] - RGBA highlight color

mod alt_group;
mod color;
mod person;

pub use alt_group::AltGroup;
pub use color::Color;
pub use person::PersonRecord;

pub(crate) use alt_group::StoredGroup;
pub(crate) use person::StoredPerson;

/// Whether `name` may be tracked: non-empty and free of whitespace.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}
