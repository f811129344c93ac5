#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use marquee_core::{BookingRequest, Movie, MovieRequest, ShowtimeRequest};
use marquee_schedule::{BookingService, MovieService, SchedulingService};
use marquee_store::{MemoryBookingStore, MemoryMovieStore, MemoryShowtimeStore};
use std::sync::Arc;
use std::time::Duration;

pub struct Harness {
    pub showtimes: Arc<MemoryShowtimeStore>,
    pub ledger: Arc<MemoryBookingStore>,
    pub scheduling: SchedulingService,
    pub bookings: BookingService,
    pub movies: MovieService,
}

impl Harness {
    pub fn new() -> Self {
        let (catalog, showtimes) = MemoryMovieStore::linked(Duration::from_secs(2));
        let ledger = Arc::new(MemoryBookingStore::default());

        Self {
            scheduling: SchedulingService::new(showtimes.clone(), catalog.clone()),
            bookings: BookingService::new(ledger.clone(), showtimes.clone()),
            movies: MovieService::new(catalog),
            showtimes,
            ledger,
        }
    }

    pub async fn movie(&self, title: &str) -> Movie {
        self.movies.add_movie(movie_request(title)).await.unwrap()
    }
}

pub fn movie_request(title: &str) -> MovieRequest {
    MovieRequest {
        title: title.to_string(),
        genre: "Science Fiction".to_string(),
        duration: 117,
        rating: 8.5,
        release_year: 1979,
    }
}

pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 5, 10)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

pub fn showtime(
    movie_id: i64,
    theater: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> ShowtimeRequest {
    ShowtimeRequest {
        movie_id,
        theater: theater.to_string(),
        start_time: start,
        end_time: end,
        price: None,
    }
}

pub fn booking(showtime_id: i64, seat_number: i64) -> BookingRequest {
    BookingRequest {
        showtime_id,
        seat_number,
        holder_id: uuid::Uuid::new_v4().to_string(),
    }
}
