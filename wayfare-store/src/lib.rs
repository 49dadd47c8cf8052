pub mod app_config;
pub mod database;
pub mod trip_repo;
pub mod user_repo;
pub mod booking_repo;
pub mod memory;
pub mod redis_repo;
pub mod mailer;

use std::sync::Arc;
use wayfare_core::repository::{BookingRepository, TripRepository, UserRepository};

pub use database::DbClient;
pub use memory::MemoryStore;
pub use redis_repo::RedisClient;
pub use mailer::{LogMailer, MailError, Mailer, OutgoingMail, SmtpMailer};

/// The three repositories the API works against, whichever backend provides them.
#[derive(Clone)]
pub struct Repositories {
    pub trips: Arc<dyn TripRepository>,
    pub users: Arc<dyn UserRepository>,
    pub bookings: Arc<dyn BookingRepository>,
}

impl Repositories {
    pub fn postgres(db: &DbClient) -> Self {
        Self {
            trips: Arc::new(trip_repo::PgTripRepository::new(db.pool.clone())),
            users: Arc::new(user_repo::PgUserRepository::new(db.pool.clone())),
            bookings: Arc::new(booking_repo::PgBookingRepository::new(db.pool.clone())),
        }
    }

    pub fn memory(store: MemoryStore) -> Self {
        Self {
            trips: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
            bookings: Arc::new(store),
        }
    }
}

/// Maps a driver error onto the domain taxonomy.
pub(crate) fn storage_error(entity: &'static str) -> impl Fn(sqlx::Error) -> wayfare_core::CoreError {
    move |err| match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            wayfare_core::CoreError::AlreadyExists { entity }
        }
        _ => wayfare_core::CoreError::StorageError(err.to_string()),
    }
}
