use crate::error::{CoreError, CoreResult};
use crate::showtime::ShowtimeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type BookingId = Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub showtime_id: ShowtimeId,
    pub seat_number: i32,
    #[serde(rename = "userId")]
    pub holder_id: Uuid,
    pub booking_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub showtime_id: ShowtimeId,
    pub seat_number: i64,
    #[serde(rename = "userId")]
    pub holder_id: String,
}

/// A validated booking; identity and timestamp are assigned by the seat ledger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewBooking {
    pub showtime_id: ShowtimeId,
    pub seat_number: i32,
    pub holder_id: Uuid,
}

impl BookingRequest {
    pub fn validate(&self) -> CoreResult<NewBooking> {
        if self.seat_number <= 0 {
            return Err(CoreError::ValidationError("seatNumber must be > 0".to_string()));
        }
        let seat_number = i32::try_from(self.seat_number).map_err(|_| {
            CoreError::ValidationError(format!("seatNumber {} is out of range", self.seat_number))
        })?;

        let holder_id = parse_holder_id(&self.holder_id).ok_or_else(|| {
            CoreError::ValidationError("Invalid userId: must be a valid UUID".to_string())
        })?;

        Ok(NewBooking {
            showtime_id: self.showtime_id,
            seat_number,
            holder_id,
        })
    }
}

/// Accepts the canonical hyphenated form only (`8-4-4-4-12`); the simple,
/// braced and URN spellings are rejected rather than coerced.
fn parse_holder_id(raw: &str) -> Option<Uuid> {
    if raw.len() != uuid::fmt::Hyphenated::LENGTH {
        return None;
    }
    Uuid::try_parse(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(seat_number: i64, holder_id: &str) -> BookingRequest {
        BookingRequest {
            showtime_id: 1,
            seat_number,
            holder_id: holder_id.to_string(),
        }
    }

    #[test]
    fn test_valid_request() {
        let booking = request(15, "84438967-f68f-4fa0-b620-0f08217e76af")
            .validate()
            .unwrap();
        assert_eq!(booking.seat_number, 15);
        assert_eq!(
            booking.holder_id.to_string(),
            "84438967-f68f-4fa0-b620-0f08217e76af"
        );
    }

    #[test]
    fn test_non_positive_seat_rejected() {
        let holder = "00000000-0000-0000-0000-000000000000";
        assert!(matches!(request(0, holder).validate(), Err(CoreError::ValidationError(_))));
        assert!(matches!(request(-3, holder).validate(), Err(CoreError::ValidationError(_))));
        assert!(request(i64::from(i32::MAX) + 1, holder).validate().is_err());
    }

    #[test]
    fn test_malformed_holder_rejected() {
        for raw in [
            "NOT-A-UUID",
            "",
            "84438967f68f4fa0b6200f08217e76af",
            "{84438967-f68f-4fa0-b620-0f08217e76af}",
            "urn:uuid:84438967-f68f-4fa0-b620-0f08217e76af",
            "84438967-f68f-4fa0-b620-0f08217e76ag",
        ] {
            let err = request(5, raw).validate().unwrap_err();
            assert!(matches!(err, CoreError::ValidationError(_)), "accepted {raw:?}");
        }
    }

    #[test]
    fn test_request_json_shape() {
        let req: BookingRequest = serde_json::from_str(
            r#"{"showtimeId": 1, "seatNumber": 15,
                "userId": "84438967-f68f-4fa0-b620-0f08217e76af"}"#,
        )
        .unwrap();
        assert_eq!(req.showtime_id, 1);
        assert_eq!(req.seat_number, 15);
    }
}
