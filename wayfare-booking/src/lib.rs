pub mod request;
pub mod ledger;
pub mod policy;

pub use request::{total_amount, BookingRequest};
pub use ledger::{fits, SlotLedger};
pub use policy::{can_cancel, slot_move, Requester, SlotMove};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BookingError {
    #[error("Missing required fields: {0}")]
    MissingFields(String),

    #[error("{0}")]
    Invalid(String),

    #[error("Only {remaining} spots left on this date")]
    CapacityExceeded { remaining: i32 },

    #[error("Over-release on {date}: releasing {requested}, booked {booked}")]
    OverRelease {
        date: chrono::NaiveDate,
        requested: i32,
        booked: i32,
    },
}

impl From<BookingError> for wayfare_core::CoreError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::CapacityExceeded { remaining } => wayfare_core::CoreError::CapacityExceeded { remaining },
            other => wayfare_core::CoreError::ValidationError(other.to_string()),
        }
    }
}
