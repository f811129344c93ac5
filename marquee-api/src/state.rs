use marquee_schedule::{BookingService, MovieService, SchedulingService};
use marquee_store::{
    DbClient, MemoryBookingStore, MemoryMovieStore, PostgresBookingRepository,
    PostgresMovieRepository, PostgresShowtimeRepository,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub scheduling: Arc<SchedulingService>,
    pub bookings: Arc<BookingService>,
    pub movies: Arc<MovieService>,
}

impl AppState {
    /// Everything lives in process memory; nothing survives a restart.
    pub fn in_memory(lock_wait: Duration) -> Self {
        let (catalog, showtimes) = MemoryMovieStore::linked(lock_wait);
        let ledger = Arc::new(MemoryBookingStore::new(lock_wait));

        Self {
            scheduling: Arc::new(SchedulingService::new(showtimes.clone(), catalog.clone())),
            bookings: Arc::new(BookingService::new(ledger, showtimes)),
            movies: Arc::new(MovieService::new(catalog)),
        }
    }

    pub fn postgres(db: &DbClient, lock_wait: Duration) -> Self {
        let showtimes = Arc::new(PostgresShowtimeRepository::new(db.pool.clone(), lock_wait));
        let catalog = Arc::new(PostgresMovieRepository::new(db.pool.clone()));
        let ledger = Arc::new(PostgresBookingRepository::new(db.pool.clone(), lock_wait));

        Self {
            scheduling: Arc::new(SchedulingService::new(showtimes.clone(), catalog.clone())),
            bookings: Arc::new(BookingService::new(ledger, showtimes)),
            movies: Arc::new(MovieService::new(catalog)),
        }
    }
}
