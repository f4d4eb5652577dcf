//! # Puzzle House
//!
//! The caller-facing surface. A [`PuzzleHouse`] owns one [`ProgressStore`]
//! and one [`HallSession`] and turns player intents (select a hall, submit a
//! key, reveal a hint, relock) into store operations against the current hall.
//!
//! ```rust,no_run
//! use puzzlehall::config::Config;
//! use puzzlehall::house::PuzzleHouse;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let mut house = PuzzleHouse::from_config(&config).await?;
//!
//!     if house.submit_key("foyer", "  Sesame ")? {
//!         println!("Unlocked!");
//!     }
//!     for view in house.room_views()? {
//!         println!("{} {:?}", view.room.title, view.state);
//!     }
//!     Ok(())
//! }
//! ```

use log::{info, warn};

use crate::config::Config;
use crate::content::{hall_label, ContentSource, Hall, HallSource, Room};
use crate::errors::PuzzleError;
use crate::progress::{FileBackend, ProgressBackend, ProgressStore};
use crate::session::{accessible_rooms, summary, AccessState, HallSession, HallSummary};

/// One entry of the hall picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HallChoice {
    pub id: String,
    pub label: String,
}

/// Everything a renderer needs for one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomView<'a> {
    pub index: usize,
    pub room: &'a Room,
    pub state: AccessState,
    pub visible_hints: &'a [String],
    pub can_reveal_hint: bool,
}

/// Explicit session object for one player.
pub struct PuzzleHouse<S> {
    hall_ids: Vec<String>,
    session: HallSession<S>,
    progress: ProgressStore,
}

impl PuzzleHouse<ContentSource> {
    /// Build from configuration and select the first configured hall.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let source = ContentSource::from_config(&config.halls)?;
        let backend = FileBackend::new(&config.storage.progress_file);
        Ok(Self::open(config.halls.ids.clone(), source, backend).await)
    }
}

impl<S: HallSource> PuzzleHouse<S> {
    /// Create a house with no hall selected.
    pub fn new(hall_ids: Vec<String>, source: S, backend: impl ProgressBackend + 'static) -> Self {
        Self {
            hall_ids,
            session: HallSession::new(source),
            progress: ProgressStore::open(backend),
        }
    }

    /// Create a house and try to select the first hall. A load failure is
    /// logged and leaves no hall selected.
    pub async fn open(hall_ids: Vec<String>, source: S, backend: impl ProgressBackend + 'static) -> Self {
        let mut house = Self::new(hall_ids, source, backend);
        if let Some(first) = house.hall_ids.first().cloned() {
            if let Err(e) = house.select_hall(&first).await {
                warn!("Failed to load default hall: {}", e);
            }
        }
        house
    }

    /// The known halls, in picker order.
    pub fn halls(&self) -> Vec<HallChoice> {
        self.hall_ids
            .iter()
            .map(|id| HallChoice {
                id: id.clone(),
                label: hall_label(id),
            })
            .collect()
    }

    /// Load (or reuse) a hall and make it current.
    pub async fn select_hall(&mut self, hall_id: &str) -> Result<&Hall, PuzzleError> {
        if !self.hall_ids.iter().any(|id| id == hall_id) {
            return Err(PuzzleError::UnknownHall(hall_id.to_string()));
        }
        Ok(self.session.load_hall(hall_id).await?)
    }

    pub fn current_hall(&self) -> Option<&Hall> {
        self.session.current_hall()
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    /// Rooms of the current hall with their access state.
    pub fn accessible_rooms(&self) -> Result<Vec<(&Room, AccessState)>, PuzzleError> {
        let hall = current(&self.session)?;
        Ok(accessible_rooms(hall, &self.progress))
    }

    /// Rooms of the current hall with state and hint visibility.
    pub fn room_views(&self) -> Result<Vec<RoomView<'_>>, PuzzleError> {
        let hall = current(&self.session)?;
        Ok(accessible_rooms(hall, &self.progress)
            .into_iter()
            .enumerate()
            .map(|(index, (room, state))| RoomView {
                index,
                room,
                state,
                visible_hints: self.progress.visible_hints(room),
                can_reveal_hint: self.progress.can_reveal_hint(room),
            })
            .collect())
    }

    pub fn summary(&self) -> Result<HallSummary, PuzzleError> {
        let hall = current(&self.session)?;
        Ok(summary(hall, &self.progress))
    }

    /// Submit a key for a room in the current hall. `Ok(false)` for a wrong key.
    pub fn submit_key(&mut self, room_id: &str, text: &str) -> Result<bool, PuzzleError> {
        let hall = current(&self.session)?;
        let (_, room) = reachable_room(hall, &self.progress, room_id)?;
        Ok(self.progress.attempt_unlock(room, text)?)
    }

    /// Reveal the next hint for a room; returns the revealed count.
    pub fn reveal_hint(&mut self, room_id: &str) -> Result<usize, PuzzleError> {
        let hall = current(&self.session)?;
        let (_, room) = reachable_room(hall, &self.progress, room_id)?;
        Ok(self.progress.reveal_next_hint(room)?)
    }

    /// Relock every room in the current hall.
    pub fn reset_hall(&mut self) -> Result<(), PuzzleError> {
        let hall = current(&self.session)?;
        self.progress.relock_from(hall, 0)?;
        info!("Hall {} reset", hall.id);
        Ok(())
    }

    /// Relock `room_id` and every later room in the current hall.
    pub fn relock_from(&mut self, room_id: &str) -> Result<(), PuzzleError> {
        let hall = current(&self.session)?;
        let (index, _) = find_room(hall, room_id)?;
        Ok(self.progress.relock_from(hall, index)?)
    }
}

fn current<S: HallSource>(session: &HallSession<S>) -> Result<&Hall, PuzzleError> {
    session.current_hall().ok_or(PuzzleError::NoHallSelected)
}

fn find_room<'a>(hall: &'a Hall, room_id: &str) -> Result<(usize, &'a Room), PuzzleError> {
    hall.room_index(room_id)
        .map(|index| (index, &hall.rooms[index]))
        .ok_or_else(|| PuzzleError::UnknownRoom {
            hall_id: hall.id.clone(),
            room_id: room_id.to_string(),
        })
}

/// Like [`find_room`], but refuses rooms whose predecessor is still locked.
fn reachable_room<'a>(
    hall: &'a Hall,
    progress: &ProgressStore,
    room_id: &str,
) -> Result<(usize, &'a Room), PuzzleError> {
    let (index, room) = find_room(hall, room_id)?;
    if index > 0 && !progress.is_unlocked(&hall.rooms[index - 1].id) {
        return Err(PuzzleError::RoomLocked {
            room_id: room_id.to_string(),
        });
    }
    Ok((index, room))
}
