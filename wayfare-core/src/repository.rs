use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::booking::{Booking, NewBooking, StatusUpdate};
use crate::models::trip::{NewTrip, Trip, TripPatch};
use crate::models::user::{NewUser, Role, User, UserPatch};
use crate::query::{Page, SortKey, TripFilter, TripQuery};
use crate::CoreResult;

/// Repository trait for trip catalog access
#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn create_trip(&self, input: NewTrip, created_by: Uuid) -> CoreResult<Trip>;

    async fn get_trip(&self, id: Uuid) -> CoreResult<Option<Trip>>;

    /// Paginated listing; `Page::total` counts every match, not just the page.
    async fn list_trips(&self, query: &TripQuery) -> CoreResult<Page<Trip>>;

    async fn find_trips(
        &self,
        filter: &TripFilter,
        sort: &[SortKey],
        limit: Option<u32>,
    ) -> CoreResult<Vec<Trip>>;

    async fn count_trips(&self, filter: &TripFilter) -> CoreResult<u64>;

    async fn update_trip(&self, id: Uuid, patch: TripPatch) -> CoreResult<Option<Trip>>;

    /// Returns false when no trip had that id.
    async fn delete_trip(&self, id: Uuid) -> CoreResult<bool>;
}

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `CoreError::AlreadyExists` when the email is taken.
    async fn create_user(&self, input: NewUser) -> CoreResult<User>;

    async fn get_user(&self, id: Uuid) -> CoreResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>>;

    /// Newest first, at most `limit` when given.
    async fn list_users(&self, limit: Option<u32>) -> CoreResult<Vec<User>>;

    async fn count_users(&self) -> CoreResult<u64>;

    /// Fails with `CoreError::AlreadyExists` when changing to a taken email.
    async fn update_user(&self, id: Uuid, patch: UserPatch) -> CoreResult<Option<User>>;

    async fn update_role(&self, id: Uuid, role: Role) -> CoreResult<Option<User>>;

    async fn delete_user(&self, id: Uuid) -> CoreResult<bool>;

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> CoreResult<()>;

    /// Swaps in `password_hash` for the account holding an unexpired `token`
    /// and clears the token in the same step, so a token resets at most once.
    async fn consume_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> CoreResult<Option<User>>;
}

/// Repository trait for bookings and the per-date slot counters behind them
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Reserves `input.participants` slots against `capacity` and stores the
    /// booking as one atomic step. Fails with `CoreError::CapacityExceeded`
    /// without writing anything when the date is full.
    async fn create_booking(&self, input: NewBooking, capacity: i32) -> CoreResult<Booking>;

    async fn get_booking(&self, id: Uuid) -> CoreResult<Option<Booking>>;

    /// Newest first.
    async fn list_for_user(&self, user_id: Uuid) -> CoreResult<Vec<Booking>>;

    /// Newest first.
    async fn list_all(&self) -> CoreResult<Vec<Booking>>;

    /// Overwrites status fields and moves slots in or out of the counter when
    /// the booking starts or stops holding capacity.
    async fn update_status(&self, id: Uuid, update: &StatusUpdate) -> CoreResult<Option<Booking>>;

    /// Participants currently holding slots on `date`.
    async fn booked_slots(&self, trip_id: Uuid, date: chrono::NaiveDate) -> CoreResult<i32>;
}
