//! # Progress Store
//!
//! Per-room unlock flags and revealed-hint counts, persisted to a durable
//! slot after every mutation. The serialized shape is:
//!
//! ```json
//! { "unlockedRooms": { "foyer": true }, "revealedHints": { "library": 2 } }
//! ```
//!
//! Mutations are all-or-nothing: the new state is built on a copy, written to
//! the slot, and only then becomes visible. A failed write leaves the store
//! exactly as it was and returns a [`StorageError`].

pub mod backend;

use std::collections::BTreeMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::content::{Hall, Room};
use crate::errors::{StorageError, ValidationError};
use crate::logutil::preview;
use crate::validation::normalize_key;

pub use backend::{FileBackend, MemoryBackend, ProgressBackend};

/// Persisted player progress. Absent entries mean locked / zero hints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    #[serde(default)]
    pub unlocked_rooms: BTreeMap<String, bool>,
    #[serde(default)]
    pub revealed_hints: BTreeMap<String, usize>,
}

impl Progress {
    /// Parse persisted progress. Entries recorded as `false` or `0` are dropped
    /// so that membership alone means "unlocked" / "has hints".
    pub fn from_json(data: &str) -> Result<Self, ValidationError> {
        let mut progress: Progress = serde_json::from_str(data)?;
        progress.unlocked_rooms.retain(|_, unlocked| *unlocked);
        progress.revealed_hints.retain(|_, count| *count > 0);
        Ok(progress)
    }
}

/// Owns the player's progress and the slot it is persisted to.
pub struct ProgressStore {
    progress: Progress,
    backend: Box<dyn ProgressBackend>,
}

impl std::fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStore")
            .field("progress", &self.progress)
            .finish_non_exhaustive()
    }
}

impl ProgressStore {
    /// Load progress from `backend`, falling back to empty progress when the
    /// slot is empty, unreadable, or malformed.
    pub fn open(backend: impl ProgressBackend + 'static) -> Self {
        let progress = match backend.load() {
            Ok(Some(data)) => match Progress::from_json(&data) {
                Ok(progress) => progress,
                Err(e) => {
                    warn!("{}; starting with empty progress", e);
                    Progress::default()
                }
            },
            Ok(None) => {
                debug!("No saved progress; starting fresh");
                Progress::default()
            }
            Err(e) => {
                warn!("Failed to read saved progress ({}); starting with empty progress", e);
                Progress::default()
            }
        };
        Self {
            progress,
            backend: Box::new(backend),
        }
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn is_unlocked(&self, room_id: &str) -> bool {
        self.progress.unlocked_rooms.contains_key(room_id)
    }

    /// Try `input` against the room's key (trimmed, case-insensitive).
    ///
    /// A wrong key is `Ok(false)` with no mutation; retries are unlimited.
    pub fn attempt_unlock(&mut self, room: &Room, input: &str) -> Result<bool, StorageError> {
        if normalize_key(input) != room.key {
            debug!("Wrong key for room {}: \"{}\"", room.id, preview(input));
            return Ok(false);
        }

        if self.is_unlocked(&room.id) {
            return Ok(true);
        }

        let mut next = self.progress.clone();
        next.unlocked_rooms.insert(room.id.clone(), true);
        self.commit(next)?;
        info!("Room {} unlocked", room.id);
        Ok(true)
    }

    /// Revealed hints for `room`, never more than the room actually has.
    pub fn revealed_hint_count(&self, room: &Room) -> usize {
        self.progress
            .revealed_hints
            .get(&room.id)
            .copied()
            .unwrap_or(0)
            .min(room.hint_count())
    }

    /// The hints currently visible for `room`, in order.
    pub fn visible_hints<'a>(&self, room: &'a Room) -> &'a [String] {
        &room.hints[..self.revealed_hint_count(room)]
    }

    pub fn can_reveal_hint(&self, room: &Room) -> bool {
        self.revealed_hint_count(room) < room.hint_count()
    }

    /// Reveal one more hint. At the maximum this is a no-op, not an error.
    /// Returns the revealed count afterwards.
    pub fn reveal_next_hint(&mut self, room: &Room) -> Result<usize, StorageError> {
        let current = self.revealed_hint_count(room);
        if current >= room.hint_count() {
            debug!("Room {} has no more hints ({} revealed)", room.id, current);
            return Ok(current);
        }

        let mut next = self.progress.clone();
        next.revealed_hints.insert(room.id.clone(), current + 1);
        self.commit(next)?;
        debug!("Room {} hint {}/{} revealed", room.id, current + 1, room.hint_count());
        Ok(current + 1)
    }

    /// Relock every room at `start_index` or later and clear its hints.
    /// Persists once for the whole batch.
    pub fn relock_from(&mut self, hall: &Hall, start_index: usize) -> Result<(), StorageError> {
        let mut next = self.progress.clone();
        for room in hall.rooms.iter().skip(start_index) {
            next.unlocked_rooms.remove(&room.id);
            next.revealed_hints.remove(&room.id);
        }
        self.commit(next)?;
        info!("Hall {} relocked from room index {}", hall.id, start_index);
        Ok(())
    }

    /// Unlocked rooms in `hall`.
    pub fn unlocked_count(&self, hall: &Hall) -> usize {
        hall.rooms.iter().filter(|r| self.is_unlocked(&r.id)).count()
    }

    /// Write the current progress to the slot.
    pub fn persist(&mut self) -> Result<(), StorageError> {
        save_progress(self.backend.as_mut(), &self.progress)
    }

    fn commit(&mut self, next: Progress) -> Result<(), StorageError> {
        save_progress(self.backend.as_mut(), &next)?;
        self.progress = next;
        Ok(())
    }
}

/// Serialize `progress` and write it to the slot.
fn save_progress(backend: &mut dyn ProgressBackend, progress: &Progress) -> Result<(), StorageError> {
    let data = serde_json::to_string(progress)?;
    backend.save(&data)
}
