use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use wayfare_booking::{slot_move, SlotLedger, SlotMove};
use wayfare_core::repository::{BookingRepository, TripRepository, UserRepository};
use wayfare_core::{
    Booking, CoreError, CoreResult, NewBooking, NewTrip, NewUser, Page, Role, SortKey, StatusUpdate,
    Trip, TripFilter, TripPatch, TripQuery, User, UserPatch,
};

#[derive(Default)]
struct State {
    trips: HashMap<Uuid, Trip>,
    users: HashMap<Uuid, User>,
    bookings: HashMap<Uuid, Booking>,
    slots: SlotLedger,
}

/// Process-local store behind a single lock. Every repository method takes
/// the lock once, so check-then-write sequences are atomic.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[async_trait]
impl TripRepository for MemoryStore {
    async fn create_trip(&self, input: NewTrip, created_by: Uuid) -> CoreResult<Trip> {
        let trip = Trip::new(input, created_by);
        self.state.write().await.trips.insert(trip.id, trip.clone());
        Ok(trip)
    }

    async fn get_trip(&self, id: Uuid) -> CoreResult<Option<Trip>> {
        Ok(self.state.read().await.trips.get(&id).cloned())
    }

    async fn list_trips(&self, query: &TripQuery) -> CoreResult<Page<Trip>> {
        let state = self.state.read().await;
        let (items, total) = wayfare_catalog::select(
            state.trips.values(),
            &query.filter,
            &query.sort,
            query.offset(),
            Some(query.limit),
        );
        Ok(Page { items, total, page: query.page, limit: query.limit })
    }

    async fn find_trips(
        &self,
        filter: &TripFilter,
        sort: &[SortKey],
        limit: Option<u32>,
    ) -> CoreResult<Vec<Trip>> {
        let state = self.state.read().await;
        let (items, _) = wayfare_catalog::select(state.trips.values(), filter, sort, 0, limit);
        Ok(items)
    }

    async fn count_trips(&self, filter: &TripFilter) -> CoreResult<u64> {
        let state = self.state.read().await;
        Ok(state.trips.values().filter(|t| wayfare_catalog::matches(t, filter)).count() as u64)
    }

    async fn update_trip(&self, id: Uuid, patch: TripPatch) -> CoreResult<Option<Trip>> {
        let mut state = self.state.write().await;
        Ok(state.trips.get_mut(&id).map(|trip| {
            trip.apply(patch);
            trip.clone()
        }))
    }

    async fn delete_trip(&self, id: Uuid) -> CoreResult<bool> {
        let mut state = self.state.write().await;
        let removed = state.trips.remove(&id).is_some();
        if removed {
            state.slots.forget_trip(id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, input: NewUser) -> CoreResult<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == input.email) {
            return Err(CoreError::AlreadyExists { entity: "User" });
        }
        let user = User::new(input);
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> CoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self, limit: Option<u32>) -> CoreResult<Vec<User>> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            users.truncate(limit as usize);
        }
        Ok(users)
    }

    async fn count_users(&self) -> CoreResult<u64> {
        Ok(self.state.read().await.users.len() as u64)
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> CoreResult<Option<User>> {
        let mut state = self.state.write().await;

        if let Some(email) = &patch.email {
            if state.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(CoreError::AlreadyExists { entity: "User" });
            }
        }

        Ok(state.users.get_mut(&id).map(|user| {
            if let Some(v) = patch.user_name { user.user_name = v; }
            if let Some(v) = patch.email { user.email = v; }
            if let Some(v) = patch.password_hash { user.password_hash = v; }
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn update_role(&self, id: Uuid, role: Role) -> CoreResult<Option<User>> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(&id).map(|user| {
            user.role = role;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn delete_user(&self, id: Uuid) -> CoreResult<bool> {
        Ok(self.state.write().await.users.remove(&id).is_some())
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> CoreResult<()> {
        let mut state = self.state.write().await;
        let user = state.users.get_mut(&id).ok_or_else(|| CoreError::NotFound {
            entity: "User",
            id: id.to_string(),
        })?;
        user.reset_password_token = Some(token.to_string());
        user.reset_password_expiry = Some(expires_at);
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> CoreResult<Option<User>> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.values_mut().find(|u| u.reset_token_valid(token, now)) else {
            return Ok(None);
        };
        user.password_hash = password_hash.to_string();
        user.reset_password_token = None;
        user.reset_password_expiry = None;
        user.updated_at = now;
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn create_booking(&self, input: NewBooking, capacity: i32) -> CoreResult<Booking> {
        let mut state = self.state.write().await;
        state
            .slots
            .reserve(input.trip_id, input.selected_date, input.participants, capacity)?;

        let booking = Booking::new(input);
        state.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn get_booking(&self, id: Uuid) -> CoreResult<Option<Booking>> {
        Ok(self.state.read().await.bookings.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> CoreResult<Vec<Booking>> {
        let state = self.state.read().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| b.user_id == Some(user_id))
            .cloned()
            .collect();
        newest_first(&mut bookings);
        Ok(bookings)
    }

    async fn list_all(&self) -> CoreResult<Vec<Booking>> {
        let state = self.state.read().await;
        let mut bookings: Vec<Booking> = state.bookings.values().cloned().collect();
        newest_first(&mut bookings);
        Ok(bookings)
    }

    async fn update_status(&self, id: Uuid, update: &StatusUpdate) -> CoreResult<Option<Booking>> {
        let mut state = self.state.write().await;
        let Some(current) = state.bookings.get(&id).cloned() else {
            return Ok(None);
        };

        let mut booking = current.clone();
        booking.apply(update);

        match slot_move(current.status, booking.status, booking.participants) {
            SlotMove::Reserve(quantity) => {
                let capacity = state
                    .trips
                    .get(&booking.trip_id)
                    .map(|t| t.max_group_size)
                    .ok_or_else(|| CoreError::NotFound {
                        entity: "Trip",
                        id: booking.trip_id.to_string(),
                    })?;
                state
                    .slots
                    .reserve(booking.trip_id, booking.selected_date, quantity, capacity)?;
            }
            SlotMove::Release(quantity) => {
                // Counters of a deleted trip are gone; nothing to give back
                if state.trips.contains_key(&booking.trip_id) {
                    state.slots.release(booking.trip_id, booking.selected_date, quantity)?;
                }
            }
            SlotMove::Keep => {}
        }

        state.bookings.insert(id, booking.clone());
        Ok(Some(booking))
    }

    async fn booked_slots(&self, trip_id: Uuid, date: NaiveDate) -> CoreResult<i32> {
        Ok(self.state.read().await.slots.booked(trip_id, date))
    }
}
