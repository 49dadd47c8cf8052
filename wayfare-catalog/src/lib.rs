pub mod params;
pub mod filter;
pub mod validate;

pub use params::{SearchParams, TripListParams, MAX_PAGE_SIZE};
pub use filter::{compare, matches, select};
pub use validate::{validate_new_trip, validate_patch};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum QueryError {
    #[error("Invalid value for {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Unknown sort field: {0}")]
    UnknownSortField(String),

    #[error("{0}")]
    OutOfRange(String),

    #[error("{0}")]
    InvalidTrip(String),
}
