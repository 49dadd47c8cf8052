pub mod models;
pub mod query;
pub mod repository;

pub use models::booking::{Booking, BookingStatus, NewBooking, PaymentMethod, PaymentStatus, StatusUpdate};
pub use models::trip::{Difficulty, ItineraryDay, NewTrip, Trip, TripPatch};
pub use models::user::{NewUser, Role, User, UserPatch};
pub use query::{Page, SortField, SortKey, TripFilter, TripQuery};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("{entity} already exists")]
    AlreadyExists { entity: &'static str },
    #[error("Only {remaining} spots left on this date")]
    CapacityExceeded { remaining: i32 },
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
