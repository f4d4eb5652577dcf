//! # Hall Content
//!
//! Static hall definitions: an ordered list of rooms, each with a key and a
//! list of progressively revealed hints. Hall documents are JSON:
//!
//! ```json
//! {
//!   "displayName": "Nate's Puzzle Hall",
//!   "rooms": [
//!     { "id": "foyer", "title": "The Foyer", "description": "<a href='...'>clue</a>",
//!       "image": "img/foyer.png", "key": "sesame", "hints": ["Ali Baba", "Open ..."] }
//!   ]
//! }
//! ```
//!
//! The hall id is not part of the document; it is the name the document was
//! fetched under. Documents are obtained through a [`HallSource`].

pub mod source;

use serde::{Deserialize, Serialize};

use crate::errors::LoadCause;
use crate::validation::check_hall;

pub use source::{ContentSource, DirSource, HallSource};
#[cfg(feature = "remote")]
pub use source::HttpSource;

/// A single lockable puzzle room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Rich text handed to the renderer untouched; may contain markup and links.
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    /// Pre-normalized match target (trimmed, lowercase).
    pub key: String,
    #[serde(default)]
    pub hints: Vec<String>,
}

impl Room {
    /// All image references: the single `image` first, then `images` in order.
    pub fn images(&self) -> Vec<&str> {
        self.image
            .iter()
            .chain(self.images.iter())
            .map(String::as_str)
            .collect()
    }

    pub fn hint_count(&self) -> usize {
        self.hints.len()
    }
}

/// A named, ordered collection of rooms. Room order is the unlock chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hall {
    pub id: String,
    pub display_name: String,
    pub rooms: Vec<Room>,
}

/// On-the-wire hall document (no id).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HallDocument {
    display_name: String,
    rooms: Vec<Room>,
}

impl Hall {
    /// Parse and sanity-check a hall document fetched under `hall_id`.
    pub fn from_json(hall_id: &str, contents: &str) -> Result<Self, LoadCause> {
        // Guard against any accidental leading NULs or BOM
        let cleaned = contents.trim_start_matches(['\0', '\u{feff}']);
        let doc: HallDocument = serde_json::from_str(cleaned)?;
        let hall = Hall {
            id: hall_id.to_string(),
            display_name: doc.display_name,
            rooms: doc.rooms,
        };
        check_hall(&hall).map_err(LoadCause::Invalid)?;
        Ok(hall)
    }

    pub fn room_index(&self, room_id: &str) -> Option<usize> {
        self.rooms.iter().position(|r| r.id == room_id)
    }
}

/// Dropdown label for a hall id, e.g. `nate` => `Nate’s Puzzle Hall`.
pub fn hall_label(hall_id: &str) -> String {
    let mut chars = hall_id.chars();
    let name = match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    };
    format!("{}’s Puzzle Hall", name)
}
