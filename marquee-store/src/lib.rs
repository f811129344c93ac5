pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod memory;
pub mod movie_repo;
pub mod showtime_repo;

pub use booking_repo::PostgresBookingRepository;
pub use database::DbClient;
pub use memory::{MemoryBookingStore, MemoryMovieStore, MemoryShowtimeStore};
pub use movie_repo::PostgresMovieRepository;
pub use showtime_repo::PostgresShowtimeRepository;
