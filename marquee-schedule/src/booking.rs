use marquee_core::{
    Booking, BookingId, BookingRequest, CoreError, CoreResult, IntervalStore, SeatLedger,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Books seats against existing showtimes, at most one holder per seat.
pub struct BookingService {
    ledger: Arc<dyn SeatLedger>,
    showtimes: Arc<dyn IntervalStore>,
}

impl BookingService {
    pub fn new(ledger: Arc<dyn SeatLedger>, showtimes: Arc<dyn IntervalStore>) -> Self {
        Self { ledger, showtimes }
    }

    pub async fn book_seat(&self, request: BookingRequest) -> CoreResult<BookingId> {
        let booking = request.validate()?;

        if self.showtimes.get(booking.showtime_id).await?.is_none() {
            return Err(CoreError::UnknownShowtime(booking.showtime_id));
        }

        let mut unit = self
            .ledger
            .begin_seat(booking.showtime_id, booking.seat_number)
            .await?;
        if unit.is_seat_taken(booking.showtime_id, booking.seat_number).await? {
            warn!(
                "Seat {} for showtime {} is already booked",
                booking.seat_number, booking.showtime_id
            );
            return Err(CoreError::SeatTaken {
                showtime_id: booking.showtime_id,
                seat_number: booking.seat_number,
            });
        }

        let created = unit.create(&booking).await?;
        unit.commit().await?;

        info!(
            "Booked seat {} for showtime {} (booking {})",
            created.seat_number, created.showtime_id, created.id
        );
        Ok(created.id)
    }

    pub async fn get_booking(&self, id: BookingId) -> CoreResult<Booking> {
        self.ledger.get(id).await?.ok_or(CoreError::BookingNotFound(id))
    }

    pub async fn list_bookings(&self) -> CoreResult<Vec<Booking>> {
        Ok(self.ledger.find_all().await?)
    }
}
