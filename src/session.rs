//! Hall session: lazily loads and caches hall content, and derives the
//! per-room access view from a [`ProgressStore`].
//!
//! Loaded halls are immutable and cached for the life of the session; there
//! is no invalidation. The access view is recomputed on every call.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use log::{debug, info};

use crate::content::{Hall, HallSource, Room};
use crate::errors::LoadError;
use crate::progress::ProgressStore;

/// How a room presents to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessState {
    /// Predecessor not yet unlocked.
    Locked,
    /// Reachable, key not yet entered.
    Available,
    /// Unlocked.
    Completed,
}

/// Completion summary for a hall (drives the progress bar).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HallSummary {
    pub unlocked: usize,
    pub total: usize,
    /// `round(unlocked / total * 100)`, 0 for an empty hall.
    pub percent: u8,
}

/// Caches hall documents fetched from `S` and tracks the current hall.
pub struct HallSession<S> {
    source: S,
    cache: HashMap<String, Hall>,
    current: Option<String>,
}

impl<S: HallSource> HallSession<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: HashMap::new(),
            current: None,
        }
    }

    /// Load `hall_id` (from cache if present) and make it the current hall.
    ///
    /// On failure the cache and current hall are left as they were.
    pub async fn load_hall(&mut self, hall_id: &str) -> Result<&Hall, LoadError> {
        let hall = match self.cache.entry(hall_id.to_string()) {
            Entry::Occupied(entry) => {
                debug!("Hall cache hit: {}", hall_id);
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                debug!("Hall cache miss: {}", hall_id);
                let hall = fetch_hall(&self.source, hall_id).await?;
                info!(
                    "Loaded hall {} ({}, {} rooms)",
                    hall_id,
                    hall.display_name,
                    hall.rooms.len()
                );
                entry.insert(hall)
            }
        };
        self.current = Some(hall_id.to_string());
        Ok(hall)
    }

    /// The most recently loaded hall, if any load has succeeded.
    pub fn current_hall(&self) -> Option<&Hall> {
        self.current.as_deref().and_then(|id| self.cache.get(id))
    }

    pub fn current_hall_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_cached(&self, hall_id: &str) -> bool {
        self.cache.contains_key(hall_id)
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

async fn fetch_hall<S: HallSource>(source: &S, hall_id: &str) -> Result<Hall, LoadError> {
    let raw = source
        .fetch(hall_id)
        .await
        .map_err(|cause| LoadError::new(hall_id, cause))?;
    Hall::from_json(hall_id, &raw).map_err(|cause| LoadError::new(hall_id, cause))
}

/// Derive each room's access state, in hall order.
///
/// Room 0 is always reachable; room *i* is reachable once room *i-1* is unlocked.
pub fn accessible_rooms<'a>(hall: &'a Hall, progress: &ProgressStore) -> Vec<(&'a Room, AccessState)> {
    let mut previous_unlocked = true;
    hall.rooms
        .iter()
        .map(|room| {
            let unlocked = progress.is_unlocked(&room.id);
            let state = if !previous_unlocked {
                AccessState::Locked
            } else if unlocked {
                AccessState::Completed
            } else {
                AccessState::Available
            };
            previous_unlocked = unlocked;
            (room, state)
        })
        .collect()
}

/// Unlocked-room count and rounded completion percentage for `hall`.
pub fn summary(hall: &Hall, progress: &ProgressStore) -> HallSummary {
    let total = hall.rooms.len();
    let unlocked = progress.unlocked_count(hall);
    let percent = if total == 0 {
        0
    } else {
        ((unlocked as f64 / total as f64) * 100.0).round() as u8
    };
    HallSummary {
        unlocked,
        total,
        percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LoadCause;
    use crate::progress::MemoryBackend;
    use std::cell::Cell;

    struct FakeSource {
        docs: HashMap<String, String>,
        fetches: Cell<usize>,
    }

    impl FakeSource {
        fn new(docs: &[(&str, &str)]) -> Self {
            Self {
                docs: docs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                fetches: Cell::new(0),
            }
        }
    }

    impl HallSource for FakeSource {
        async fn fetch(&self, hall_id: &str) -> Result<String, LoadCause> {
            self.fetches.set(self.fetches.get() + 1);
            self.docs
                .get(hall_id)
                .cloned()
                .ok_or_else(|| LoadCause::Http("HTTP error 404 Not Found".to_string()))
        }
    }

    const NATE: &str = r#"{"displayName":"Nate","rooms":[
        {"id":"r0","title":"R0","key":"sesame","hints":["a","b","c"]},
        {"id":"r1","title":"R1","key":"dewey"},
        {"id":"r2","title":"R2","key":"last"}
    ]}"#;
    const ERIK: &str = r#"{"displayName":"Erik","rooms":[{"id":"e0","key":"x"}]}"#;

    fn states(hall: &Hall, store: &ProgressStore) -> Vec<AccessState> {
        accessible_rooms(hall, store).into_iter().map(|(_, s)| s).collect()
    }

    #[tokio::test]
    async fn load_caches_and_sets_current() {
        let mut session = HallSession::new(FakeSource::new(&[("nate", NATE), ("erik", ERIK)]));
        assert!(session.current_hall().is_none());

        session.load_hall("nate").await.expect("nate");
        session.load_hall("erik").await.expect("erik");
        assert_eq!(session.current_hall().map(|h| h.id.as_str()), Some("erik"));

        let hall = session.load_hall("nate").await.expect("nate again");
        assert_eq!(hall.display_name, "Nate");
        assert_eq!(session.source().fetches.get(), 2);
        assert!(session.is_cached("erik"));
        assert_eq!(session.current_hall_id(), Some("nate"));
    }

    #[tokio::test]
    async fn failed_load_leaves_current_unchanged() {
        let mut session = HallSession::new(FakeSource::new(&[("nate", NATE), ("bad", "{oops")]));
        session.load_hall("nate").await.expect("nate");

        let err = session.load_hall("missing").await.unwrap_err();
        assert_eq!(err.hall_id, "missing");
        assert!(matches!(err.cause, LoadCause::Http(_)));

        let err = session.load_hall("bad").await.unwrap_err();
        assert!(matches!(err.cause, LoadCause::Parse(_)));

        assert_eq!(session.current_hall_id(), Some("nate"));
        assert!(!session.is_cached("missing"));
        assert!(!session.is_cached("bad"));
    }

    #[tokio::test]
    async fn failed_load_is_retried_on_next_call() {
        let mut session = HallSession::new(FakeSource::new(&[]));
        assert!(session.load_hall("nate").await.is_err());
        assert!(session.load_hall("nate").await.is_err());
        assert_eq!(session.source().fetches.get(), 2);
    }

    #[tokio::test]
    async fn access_states_follow_unlock_chain() {
        let mut session = HallSession::new(FakeSource::new(&[("nate", NATE)]));
        let hall = session.load_hall("nate").await.expect("nate").clone();
        let mut store = ProgressStore::open(MemoryBackend::new());

        assert_eq!(
            states(&hall, &store),
            vec![AccessState::Available, AccessState::Locked, AccessState::Locked]
        );

        store.attempt_unlock(&hall.rooms[0], "sesame").unwrap();
        assert_eq!(
            states(&hall, &store),
            vec![AccessState::Completed, AccessState::Available, AccessState::Locked]
        );

        store.attempt_unlock(&hall.rooms[1], "dewey").unwrap();
        store.attempt_unlock(&hall.rooms[2], "last").unwrap();
        assert_eq!(
            states(&hall, &store),
            vec![AccessState::Completed; 3]
        );

        store.relock_from(&hall, 1).unwrap();
        assert_eq!(
            states(&hall, &store),
            vec![AccessState::Completed, AccessState::Available, AccessState::Locked]
        );
    }

    #[test]
    fn unlocked_room_behind_locked_predecessor_shows_locked() {
        let hall = Hall::from_json("nate", NATE).unwrap();
        let store = ProgressStore::open(MemoryBackend::with_contents(
            r#"{"unlockedRooms":{"r2":true}}"#,
        ));
        assert_eq!(
            states(&hall, &store),
            vec![AccessState::Available, AccessState::Locked, AccessState::Locked]
        );
    }

    #[test]
    fn summary_rounds_percentage() {
        let hall = Hall::from_json("nate", NATE).unwrap();
        let mut store = ProgressStore::open(MemoryBackend::new());
        assert_eq!(
            summary(&hall, &store),
            HallSummary { unlocked: 0, total: 3, percent: 0 }
        );
        store.attempt_unlock(&hall.rooms[0], "sesame").unwrap();
        assert_eq!(summary(&hall, &store).percent, 33);
        store.attempt_unlock(&hall.rooms[1], "dewey").unwrap();
        assert_eq!(summary(&hall, &store).percent, 67);

        let empty = Hall::from_json("e", r#"{"displayName":"E","rooms":[]}"#).unwrap();
        assert_eq!(summary(&empty, &store).percent, 0);
    }
}
