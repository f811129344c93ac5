use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::booking::{Booking, BookingId, NewBooking};
use crate::movie::{Movie, MovieFields, MovieId};
use crate::showtime::{Showtime, ShowtimeFields, ShowtimeId};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("seat {seat_number} already booked for showtime {showtime_id}")]
    SeatTaken {
        showtime_id: ShowtimeId,
        seat_number: i32,
    },

    #[error("duplicate movie title '{0}'")]
    DuplicateTitle(String),

    /// A write pointed at a row that does not exist (foreign key).
    #[error("missing referenced record: {0}")]
    MissingReference(String),

    /// A delete was refused because other rows still point at the record.
    #[error("record still referenced: {0}")]
    Referenced(String),

    /// Lock wait, serialization failure, pool exhaustion or lost connection.
    #[error("store busy: {0}")]
    Busy(String),

    #[error("store failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Atomic check-and-write unit over one theater's intervals.
///
/// While a unit is open no other unit for the same theater can run, so an
/// overlap check and the write that depends on it see the same state. Nothing
/// is visible to other readers until `commit`; dropping the unit rolls back.
#[async_trait]
pub trait TheaterUnit: Send {
    async fn find_overlapping(
        &mut self,
        theater: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude_id: Option<ShowtimeId>,
    ) -> StoreResult<Vec<Showtime>>;

    async fn create(&mut self, fields: &ShowtimeFields) -> StoreResult<ShowtimeId>;

    /// Full replace of every field; `NotFound` if `id` is unknown.
    async fn update(&mut self, id: ShowtimeId, fields: &ShowtimeFields) -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// Persistence for showtimes. Conflict checking is the caller's job: open a
/// unit with `begin_theater`, check, write, commit.
#[async_trait]
pub trait IntervalStore: Send + Sync {
    async fn begin_theater(&self, theater: &str) -> StoreResult<Box<dyn TheaterUnit>>;

    async fn get(&self, id: ShowtimeId) -> StoreResult<Option<Showtime>>;

    async fn delete(&self, id: ShowtimeId) -> StoreResult<()>;

    async fn find_overlapping(
        &self,
        theater: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude_id: Option<ShowtimeId>,
    ) -> StoreResult<Vec<Showtime>> {
        let mut unit = self.begin_theater(theater).await?;
        let found = unit.find_overlapping(theater, start, end, exclude_id).await?;
        unit.commit().await?;
        Ok(found)
    }

    async fn create(&self, fields: &ShowtimeFields) -> StoreResult<ShowtimeId> {
        let mut unit = self.begin_theater(&fields.theater).await?;
        let id = unit.create(fields).await?;
        unit.commit().await?;
        Ok(id)
    }

    async fn update(&self, id: ShowtimeId, fields: &ShowtimeFields) -> StoreResult<()> {
        let mut unit = self.begin_theater(&fields.theater).await?;
        unit.update(id, fields).await?;
        unit.commit().await
    }
}

/// Atomic check-and-write unit over one (showtime, seat) pair.
#[async_trait]
pub trait SeatUnit: Send {
    async fn is_seat_taken(
        &mut self,
        showtime_id: ShowtimeId,
        seat_number: i32,
    ) -> StoreResult<bool>;

    /// Assigns identity and creation timestamp. A unique-constraint hit is
    /// reported as `StoreError::SeatTaken`.
    async fn create(&mut self, booking: &NewBooking) -> StoreResult<Booking>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

#[async_trait]
pub trait SeatLedger: Send + Sync {
    async fn begin_seat(
        &self,
        showtime_id: ShowtimeId,
        seat_number: i32,
    ) -> StoreResult<Box<dyn SeatUnit>>;

    async fn get(&self, id: BookingId) -> StoreResult<Option<Booking>>;

    async fn find_all(&self) -> StoreResult<Vec<Booking>>;

    async fn is_seat_taken(&self, showtime_id: ShowtimeId, seat_number: i32) -> StoreResult<bool> {
        let mut unit = self.begin_seat(showtime_id, seat_number).await?;
        let taken = unit.is_seat_taken(showtime_id, seat_number).await?;
        unit.commit().await?;
        Ok(taken)
    }

    async fn create(&self, booking: &NewBooking) -> StoreResult<Booking> {
        let mut unit = self.begin_seat(booking.showtime_id, booking.seat_number).await?;
        let created = unit.create(booking).await?;
        unit.commit().await?;
        Ok(created)
    }
}

/// Movie lookups and CRUD. Scheduling only needs `exists_by_id`.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    async fn exists_by_id(&self, id: MovieId) -> StoreResult<bool>;

    async fn find_all(&self) -> StoreResult<Vec<Movie>>;

    async fn find_by_title(&self, title: &str) -> StoreResult<Option<Movie>>;

    /// `DuplicateTitle` if the title is taken.
    async fn create(&self, fields: &MovieFields) -> StoreResult<Movie>;

    /// Full replace keyed by the current title. `NotFound` if absent,
    /// `DuplicateTitle` if renaming onto another movie's title.
    async fn update_by_title(&self, title: &str, fields: &MovieFields) -> StoreResult<Movie>;

    /// `NotFound` if absent, `Referenced` while showtimes still point at it.
    async fn delete_by_title(&self, title: &str) -> StoreResult<()>;
}
