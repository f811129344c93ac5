use async_trait::async_trait;
use chrono::{DateTime, Utc};
use marquee_core::{
    Booking, BookingId, NewBooking, SeatLedger, SeatUnit, ShowtimeId, StoreError, StoreResult,
};
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

use crate::database::{begin_scoped, store_error};

const UNIQUE_SEAT_CONSTRAINT: &str = "bookings_showtime_seat_key";

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    showtime_id: i64,
    seat_number: i32,
    user_id: Uuid,
    booking_time: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            showtime_id: row.showtime_id,
            seat_number: row.seat_number,
            holder_id: row.user_id,
            booking_time: row.booking_time,
        }
    }
}

pub struct PostgresBookingRepository {
    pool: PgPool,
    lock_wait: Duration,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool, lock_wait: Duration) -> Self {
        Self { pool, lock_wait }
    }
}

/// One transaction holding the advisory lock for `seat:{showtime}:{seat}`.
pub struct PgSeatUnit {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl SeatUnit for PgSeatUnit {
    async fn is_seat_taken(
        &mut self,
        showtime_id: ShowtimeId,
        seat_number: i32,
    ) -> StoreResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM bookings WHERE showtime_id = $1 AND seat_number = $2)",
        )
        .bind(showtime_id)
        .bind(seat_number)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(store_error)?;

        Ok(taken)
    }

    async fn create(&mut self, booking: &NewBooking) -> StoreResult<Booking> {
        let id = Uuid::new_v4();

        let booking_time: DateTime<Utc> = sqlx::query_scalar(
            r#"
            INSERT INTO bookings (id, showtime_id, seat_number, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING booking_time
            "#,
        )
        .bind(id)
        .bind(booking.showtime_id)
        .bind(booking.seat_number)
        .bind(booking.holder_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some(UNIQUE_SEAT_CONSTRAINT)
                {
                    warn!(
                        "Unique constraint caught a double booking of seat {} for showtime {}",
                        booking.seat_number, booking.showtime_id
                    );
                    return StoreError::SeatTaken {
                        showtime_id: booking.showtime_id,
                        seat_number: booking.seat_number,
                    };
                }
            }
            store_error(e)
        })?;

        Ok(Booking {
            id,
            showtime_id: booking.showtime_id,
            seat_number: booking.seat_number,
            holder_id: booking.holder_id,
            booking_time,
        })
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await.map_err(store_error)
    }
}

#[async_trait]
impl SeatLedger for PostgresBookingRepository {
    async fn begin_seat(
        &self,
        showtime_id: ShowtimeId,
        seat_number: i32,
    ) -> StoreResult<Box<dyn SeatUnit>> {
        let scope = format!("seat:{}:{}", showtime_id, seat_number);
        let tx = begin_scoped(&self.pool, &scope, self.lock_wait).await?;
        Ok(Box::new(PgSeatUnit { tx }))
    }

    async fn get(&self, id: BookingId) -> StoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(
            "SELECT id, showtime_id, seat_number, user_id, booking_time \
             FROM bookings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(Booking::from))
    }

    async fn find_all(&self) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT id, showtime_id, seat_number, user_id, booking_time \
             FROM bookings ORDER BY booking_time",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }
}
