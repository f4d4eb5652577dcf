//! Error types shared by the content, progress, and session layers.

use thiserror::Error;

/// Why a hall document could not be produced.
#[derive(Debug, Error)]
pub enum LoadCause {
    /// Reading the document from the content directory failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport failure or non-success HTTP status.
    #[error("http error: {0}")]
    Http(String),

    /// The document was fetched but is not a valid hall.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The hall identifier is not safe to use as a path or URL segment.
    #[error("invalid hall id: {0}")]
    InvalidId(String),

    /// The document parsed but breaks a content rule (duplicate room ids, etc.).
    #[error("invalid hall content: {0}")]
    Invalid(String),
}

/// Hall content fetch/parse failure. Recoverable; the caller decides whether to retry.
#[derive(Debug, Error)]
#[error("failed to load hall '{hall_id}': {cause}")]
pub struct LoadError {
    pub hall_id: String,
    #[source]
    pub cause: LoadCause,
}

impl LoadError {
    pub fn new(hall_id: impl Into<String>, cause: impl Into<LoadCause>) -> Self {
        Self {
            hall_id: hall_id.into(),
            cause: cause.into(),
        }
    }
}

/// Failure writing (or reading) the durable progress slot.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The slot could not be locked or is otherwise unavailable.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Persisted progress that could not be understood. Recovered at startup by
/// substituting empty progress; never surfaced as fatal.
#[derive(Debug, Error)]
#[error("malformed progress data: {0}")]
pub struct ValidationError(#[from] pub serde_json::Error);

/// Errors returned by the caller-facing [`crate::house::PuzzleHouse`] surface.
#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The id is not one of the configured halls.
    #[error("unknown hall: {0}")]
    UnknownHall(String),

    #[error("room '{room_id}' not found in hall '{hall_id}'")]
    UnknownRoom { hall_id: String, room_id: String },

    /// The room's predecessor has not been unlocked yet.
    #[error("room '{room_id}' is locked")]
    RoomLocked { room_id: String },

    #[error("no hall selected")]
    NoHallSelected,
}
