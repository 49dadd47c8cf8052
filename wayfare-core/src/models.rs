pub mod trip;
pub mod user;
pub mod booking;
