use async_trait::async_trait;
use chrono::Utc;
use marquee_core::{
    Booking, BookingId, NewBooking, SeatLedger, SeatUnit, ShowtimeId, StoreError, StoreResult,
};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;
use tracing::warn;
use uuid::Uuid;

use super::locks::LockTable;

type SeatKey = (ShowtimeId, i32);

#[derive(Default)]
struct BookingTable {
    rows: Vec<Booking>,
    by_id: HashMap<BookingId, usize>,
    /// Plays the role of the (showtime, seat) unique constraint.
    seats: HashSet<SeatKey>,
}

pub struct MemoryBookingStore {
    table: Arc<RwLock<BookingTable>>,
    locks: LockTable<SeatKey>,
}

impl MemoryBookingStore {
    pub fn new(lock_wait: Duration) -> Self {
        Self {
            table: Arc::new(RwLock::new(BookingTable::default())),
            locks: LockTable::new(lock_wait),
        }
    }
}

impl Default for MemoryBookingStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

pub struct MemorySeatUnit {
    _guard: OwnedMutexGuard<()>,
    table: Arc<RwLock<BookingTable>>,
    staged: Vec<Booking>,
}

#[async_trait]
impl SeatUnit for MemorySeatUnit {
    async fn is_seat_taken(
        &mut self,
        showtime_id: ShowtimeId,
        seat_number: i32,
    ) -> StoreResult<bool> {
        let key = (showtime_id, seat_number);
        let staged = self
            .staged
            .iter()
            .any(|b| (b.showtime_id, b.seat_number) == key);
        Ok(staged || self.table.read().seats.contains(&key))
    }

    async fn create(&mut self, booking: &NewBooking) -> StoreResult<Booking> {
        let created = Booking {
            id: Uuid::new_v4(),
            showtime_id: booking.showtime_id,
            seat_number: booking.seat_number,
            holder_id: booking.holder_id,
            booking_time: Utc::now(),
        };
        self.staged.push(created.clone());
        Ok(created)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemorySeatUnit { _guard, table, staged } = *self;
        let mut table = table.write();

        let mut keys = HashSet::new();
        for b in &staged {
            let key = (b.showtime_id, b.seat_number);
            if table.seats.contains(&key) || !keys.insert(key) {
                warn!(
                    "Unique constraint caught a double booking of seat {} for showtime {}",
                    b.seat_number, b.showtime_id
                );
                return Err(StoreError::SeatTaken {
                    showtime_id: b.showtime_id,
                    seat_number: b.seat_number,
                });
            }
        }

        for b in staged {
            table.seats.insert((b.showtime_id, b.seat_number));
            let pos = table.rows.len();
            table.by_id.insert(b.id, pos);
            table.rows.push(b);
        }
        Ok(())
    }
}

#[async_trait]
impl SeatLedger for MemoryBookingStore {
    async fn begin_seat(
        &self,
        showtime_id: ShowtimeId,
        seat_number: i32,
    ) -> StoreResult<Box<dyn SeatUnit>> {
        let guard = self.locks.acquire(&(showtime_id, seat_number)).await?;
        Ok(Box::new(MemorySeatUnit {
            _guard: guard,
            table: self.table.clone(),
            staged: Vec::new(),
        }))
    }

    async fn get(&self, id: BookingId) -> StoreResult<Option<Booking>> {
        let table = self.table.read();
        Ok(table.by_id.get(&id).map(|&pos| table.rows[pos].clone()))
    }

    async fn find_all(&self) -> StoreResult<Vec<Booking>> {
        Ok(self.table.read().rows.clone())
    }
}
