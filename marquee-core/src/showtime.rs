use crate::error::{CoreError, CoreResult};
use crate::movie::MovieId;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type ShowtimeId = i64;

pub const MAX_THEATER_LEN: usize = 100;

/// Prices are stored as `NUMERIC(10, 2)`: two decimal places, below 10^8.
pub const PRICE_SCALE: u32 = 2;
pub const PRICE_LIMIT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// Half-open interval test: `[s1, e1)` and `[s2, e2)` intersect iff `s1 < e2 && s2 < e1`.
/// A showtime ending exactly when another starts does not overlap it.
pub fn intervals_overlap(
    start_a: NaiveDateTime,
    end_a: NaiveDateTime,
    start_b: NaiveDateTime,
    end_b: NaiveDateTime,
) -> bool {
    start_a < end_b && start_b < end_a
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Showtime {
    pub id: ShowtimeId,
    pub movie_id: MovieId,
    pub theater: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub price: Decimal,
}

impl Showtime {
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        intervals_overlap(self.start_time, self.end_time, start, end)
    }
}

/// Inbound create/update payload. Only `price` may be omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowtimeRequest {
    pub movie_id: MovieId,
    pub theater: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(default)]
    pub price: Option<Decimal>,
}

/// A validated showtime without identity: what the interval store persists.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowtimeFields {
    pub movie_id: MovieId,
    pub theater: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub price: Decimal,
}

impl ShowtimeFields {
    pub fn into_showtime(self, id: ShowtimeId) -> Showtime {
        Showtime {
            id,
            movie_id: self.movie_id,
            theater: self.theater,
            start_time: self.start_time,
            end_time: self.end_time,
            price: self.price,
        }
    }
}

impl ShowtimeRequest {
    /// Shape checks that need no store access: theater length, time order,
    /// price sign and precision.
    pub fn validate(self) -> CoreResult<ShowtimeFields> {
        if self.theater.trim().is_empty() {
            return Err(CoreError::ValidationError("theater must not be blank".to_string()));
        }
        if self.theater.chars().count() > MAX_THEATER_LEN {
            return Err(CoreError::ValidationError(format!(
                "theater must be at most {} characters",
                MAX_THEATER_LEN
            )));
        }
        if self.end_time <= self.start_time {
            return Err(CoreError::ValidationError(
                "endTime must be after startTime".to_string(),
            ));
        }

        let price = self.price.unwrap_or(Decimal::ZERO);
        if price < Decimal::ZERO {
            return Err(CoreError::ValidationError("price must be >= 0.0".to_string()));
        }
        if price.normalize().scale() > PRICE_SCALE {
            return Err(CoreError::ValidationError(format!(
                "price must have at most {} decimal places",
                PRICE_SCALE
            )));
        }
        if price >= PRICE_LIMIT {
            return Err(CoreError::ValidationError(format!(
                "price must be below {}",
                PRICE_LIMIT
            )));
        }

        Ok(ShowtimeFields {
            movie_id: self.movie_id,
            theater: self.theater,
            start_time: self.start_time,
            end_time: self.end_time,
            price,
        })
    }
}
