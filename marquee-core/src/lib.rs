pub mod booking;
pub mod error;
pub mod movie;
pub mod repository;
pub mod showtime;

pub use booking::{Booking, BookingId, BookingRequest, NewBooking};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use movie::{Movie, MovieFields, MovieId, MovieRequest};
pub use repository::{
    IntervalStore, MovieCatalog, SeatLedger, SeatUnit, StoreError, StoreResult, TheaterUnit,
};
pub use showtime::{intervals_overlap, Showtime, ShowtimeFields, ShowtimeId, ShowtimeRequest};
