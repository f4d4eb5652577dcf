//! Input validation for hall identifiers, submitted keys, and hall content.

use std::collections::HashSet;

use log::warn;

use crate::content::Hall;

/// Longest hall id accepted before any fetch is attempted.
pub const MAX_HALL_ID_LEN: usize = 64;

/// Hall identifier validation errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HallIdError {
    #[error("Hall id is empty")]
    Empty,

    #[error("Hall id is too long (maximum {max} characters)")]
    TooLong { max: usize },

    #[error("Hall id contains invalid characters: {chars}")]
    InvalidCharacters { chars: String },
}

/// Validate a hall id for use as a file stem or URL path segment.
///
/// Only lowercase ASCII letters, digits, `_` and `-` are allowed, so an id can
/// never climb out of the content directory (`..`, `/`) or smuggle a query string.
pub fn validate_hall_id(id: &str) -> Result<&str, HallIdError> {
    if id.is_empty() {
        return Err(HallIdError::Empty);
    }
    if id.len() > MAX_HALL_ID_LEN {
        return Err(HallIdError::TooLong {
            max: MAX_HALL_ID_LEN,
        });
    }

    let mut invalid: Vec<char> = id
        .chars()
        .filter(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-'))
        .collect();
    if !invalid.is_empty() {
        invalid.sort_unstable();
        invalid.dedup();
        return Err(HallIdError::InvalidCharacters {
            chars: invalid.into_iter().collect(),
        });
    }

    Ok(id)
}

/// Normalize a submitted key: trim surrounding whitespace (including
/// U+FEFF), then lowercase.
pub fn normalize_key(input: &str) -> String {
    input
        .trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
        .to_lowercase()
}

/// Sanity-check a parsed hall. Returns a description of the first hard failure.
///
/// Keys that are not already normalized can never match a submission, but the
/// hall is still usable, so those only produce a warning.
pub fn check_hall(hall: &Hall) -> Result<(), String> {
    let mut seen = HashSet::new();
    for (index, room) in hall.rooms.iter().enumerate() {
        if room.id.trim().is_empty() {
            return Err(format!("room at index {} has an empty id", index));
        }
        if !seen.insert(room.id.as_str()) {
            return Err(format!("duplicate room id '{}'", room.id));
        }
        if normalize_key(&room.key) != room.key {
            warn!(
                "Hall {} room {} has a key that is not normalized; it will never match",
                hall.id, room.id
            );
        }
    }
    Ok(())
}
