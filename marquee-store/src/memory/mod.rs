//! Process-local backends. Same contracts as the Postgres repositories,
//! with keyed async mutexes standing in for advisory locks.

mod bookings;
mod locks;
mod movies;
mod showtimes;

pub use bookings::{MemoryBookingStore, MemorySeatUnit};
pub use movies::MemoryMovieStore;
pub use showtimes::{MemoryShowtimeStore, MemoryTheaterUnit};
