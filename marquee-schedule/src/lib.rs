pub mod booking;
pub mod catalog;
pub mod scheduling;

pub use booking::BookingService;
pub use catalog::MovieService;
pub use scheduling::SchedulingService;
