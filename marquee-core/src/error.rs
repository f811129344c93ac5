use crate::movie::MovieId;
use crate::repository::StoreError;
use crate::showtime::ShowtimeId;
use uuid::Uuid;

/// Coarse classification callers branch on: what to report, and whether a retry can help.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    UnknownReference,
    Conflict,
    Transient,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::UnknownReference => "unknown_reference",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Transient => "transient",
            ErrorKind::Internal => "internal",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("No movie found with id={0}")]
    UnknownMovie(MovieId),

    #[error("No showtime found with id={0}")]
    UnknownShowtime(ShowtimeId),

    #[error("Showtime with ID {0} not found")]
    ShowtimeNotFound(ShowtimeId),

    #[error("Booking {0} not found")]
    BookingNotFound(Uuid),

    #[error("No movie found with title '{0}'")]
    MovieNotFound(String),

    #[error("Another showtime overlaps in theater '{theater}'")]
    Overlap {
        theater: String,
        conflicting: Vec<ShowtimeId>,
    },

    #[error("Seat {seat_number} is already booked for showtime {showtime_id}")]
    SeatTaken {
        showtime_id: ShowtimeId,
        seat_number: i32,
    },

    #[error("Another movie already has the title '{0}'")]
    MovieTitleTaken(String),

    #[error("Movie '{0}' is still scheduled in showtimes")]
    MovieInUse(String),

    #[error("Store temporarily unavailable, retry the request: {0}")]
    Transient(String),

    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ValidationError(_) => ErrorKind::InvalidArgument,
            CoreError::UnknownMovie(_)
            | CoreError::UnknownShowtime(_)
            | CoreError::ShowtimeNotFound(_)
            | CoreError::BookingNotFound(_)
            | CoreError::MovieNotFound(_) => ErrorKind::UnknownReference,
            CoreError::Overlap { .. }
            | CoreError::SeatTaken { .. }
            | CoreError::MovieTitleTaken(_)
            | CoreError::MovieInUse(_) => ErrorKind::Conflict,
            CoreError::Transient(_) => ErrorKind::Transient,
            CoreError::InternalError(_) => ErrorKind::Internal,
        }
    }

    /// Only transient failures may be retried unchanged.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}

/// Context-free translation. Services intercept `NotFound`, `MissingReference`
/// and `Referenced` first, since only they know which record was meant.
impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SeatTaken {
                showtime_id,
                seat_number,
            } => CoreError::SeatTaken {
                showtime_id,
                seat_number,
            },
            StoreError::DuplicateTitle(title) => CoreError::MovieTitleTaken(title),
            StoreError::Busy(msg) => CoreError::Transient(msg),
            StoreError::NotFound => {
                CoreError::InternalError("record vanished mid-request".to_string())
            }
            StoreError::MissingReference(msg)
            | StoreError::Referenced(msg)
            | StoreError::Backend(msg) => CoreError::InternalError(msg),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
