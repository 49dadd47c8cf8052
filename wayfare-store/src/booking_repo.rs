use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};
use uuid::Uuid;
use wayfare_booking::{slot_move, SlotMove};
use wayfare_core::repository::BookingRepository;
use wayfare_core::{Booking, CoreError, CoreResult, NewBooking, StatusUpdate};

use crate::storage_error;

const BOOKING_COLUMNS: &str = "id, trip_id, trip_title, user_id, customer_name, customer_email, \
    customer_phone, participants, selected_date, total_amount, special_requests, payment_method, \
    status, payment_status, created_at, updated_at";

// Compared as `booked <= capacity - n`, which stays inside int4 for any `n >= 1`
const RESERVE_SLOTS_SQL: &str = "UPDATE trip_date_slots SET booked = booked + $3 \
     WHERE trip_id = $1 AND slot_date = $2 AND booked <= $4 - $3 \
     RETURNING booked";

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    trip_id: Uuid,
    trip_title: String,
    user_id: Option<Uuid>,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    participants: i32,
    selected_date: NaiveDate,
    total_amount: f64,
    special_requests: Option<String>,
    payment_method: String,
    status: String,
    payment_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = CoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            trip_id: row.trip_id,
            trip_title: row.trip_title,
            user_id: row.user_id,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            participants: row.participants,
            selected_date: row.selected_date,
            total_amount: row.total_amount,
            special_requests: row.special_requests,
            payment_method: row.payment_method.parse().map_err(CoreError::StorageError)?,
            status: row.status.parse().map_err(CoreError::StorageError)?,
            payment_status: row.payment_status.parse().map_err(CoreError::StorageError)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Adds `quantity` to the date's counter only if the result stays within
/// `capacity`. On refusal returns how many slots are still free.
async fn reserve_slots(
    conn: &mut PgConnection,
    trip_id: Uuid,
    date: NaiveDate,
    quantity: i32,
    capacity: i32,
) -> CoreResult<()> {
    sqlx::query(
        "INSERT INTO trip_date_slots (trip_id, slot_date, booked) VALUES ($1, $2, 0) \
         ON CONFLICT (trip_id, slot_date) DO NOTHING",
    )
    .bind(trip_id)
    .bind(date)
    .execute(&mut *conn)
    .await
    .map_err(storage_error("Slot"))?;

    let reserved: Option<i32> = sqlx::query_scalar(RESERVE_SLOTS_SQL)
    .bind(trip_id)
    .bind(date)
    .bind(quantity)
    .bind(capacity)
    .fetch_optional(&mut *conn)
    .await
    .map_err(storage_error("Slot"))?;

    if reserved.is_some() {
        return Ok(());
    }

    let booked: i32 = sqlx::query_scalar(
        "SELECT booked FROM trip_date_slots WHERE trip_id = $1 AND slot_date = $2",
    )
    .bind(trip_id)
    .bind(date)
    .fetch_one(&mut *conn)
    .await
    .map_err(storage_error("Slot"))?;

    Err(CoreError::CapacityExceeded { remaining: (capacity - booked).max(0) })
}

async fn release_slots(conn: &mut PgConnection, trip_id: Uuid, date: NaiveDate, quantity: i32) -> CoreResult<()> {
    let booked: Option<i32> = sqlx::query_scalar(
        "UPDATE trip_date_slots SET booked = GREATEST(booked - $3, 0) \
         WHERE trip_id = $1 AND slot_date = $2 RETURNING booked",
    )
    .bind(trip_id)
    .bind(date)
    .bind(quantity)
    .fetch_optional(&mut *conn)
    .await
    .map_err(storage_error("Slot"))?;

    // The counter goes away with its trip
    if booked.is_none() {
        warn!(%trip_id, %date, "No slot counter to release into");
    }
    Ok(())
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn create_booking(&self, input: NewBooking, capacity: i32) -> CoreResult<Booking> {
        let booking = Booking::new(input);
        let mut tx = self.pool.begin().await.map_err(storage_error("Booking"))?;

        // Dropping the transaction on error rolls the counter back
        reserve_slots(&mut tx, booking.trip_id, booking.selected_date, booking.participants, capacity).await?;

        sqlx::query(&format!(
            "INSERT INTO bookings ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
            BOOKING_COLUMNS
        ))
        .bind(booking.id)
        .bind(booking.trip_id)
        .bind(&booking.trip_title)
        .bind(booking.user_id)
        .bind(&booking.customer_name)
        .bind(&booking.customer_email)
        .bind(&booking.customer_phone)
        .bind(booking.participants)
        .bind(booking.selected_date)
        .bind(booking.total_amount)
        .bind(&booking.special_requests)
        .bind(booking.payment_method.as_str())
        .bind(booking.status.as_str())
        .bind(booking.payment_status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_error("Booking"))?;

        tx.commit().await.map_err(storage_error("Booking"))?;
        Ok(booking)
    }

    async fn get_booking(&self, id: Uuid) -> CoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("Booking"))?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid) -> CoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC",
            BOOKING_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("Booking"))?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn list_all(&self) -> CoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings ORDER BY created_at DESC",
            BOOKING_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("Booking"))?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn update_status(&self, id: Uuid, update: &StatusUpdate) -> CoreResult<Option<Booking>> {
        let mut tx = self.pool.begin().await.map_err(storage_error("Booking"))?;

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1 FOR UPDATE",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage_error("Booking"))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut booking = Booking::try_from(row)?;
        let previous = booking.status;
        booking.apply(update);

        match slot_move(previous, booking.status, booking.participants) {
            SlotMove::Reserve(quantity) => {
                let capacity: Option<i32> = sqlx::query_scalar("SELECT max_group_size FROM trips WHERE id = $1")
                    .bind(booking.trip_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(storage_error("Trip"))?;
                let capacity = capacity.ok_or_else(|| CoreError::NotFound {
                    entity: "Trip",
                    id: booking.trip_id.to_string(),
                })?;
                reserve_slots(&mut tx, booking.trip_id, booking.selected_date, quantity, capacity).await?;
            }
            SlotMove::Release(quantity) => {
                release_slots(&mut tx, booking.trip_id, booking.selected_date, quantity).await?;
            }
            SlotMove::Keep => {}
        }

        sqlx::query("UPDATE bookings SET status = $2, payment_status = $3, updated_at = $4 WHERE id = $1")
            .bind(booking.id)
            .bind(booking.status.as_str())
            .bind(booking.payment_status.as_str())
            .bind(booking.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(storage_error("Booking"))?;

        tx.commit().await.map_err(storage_error("Booking"))?;

        info!(booking_id = %booking.id, from = %previous, to = %booking.status, "Booking status updated");
        Ok(Some(booking))
    }

    async fn booked_slots(&self, trip_id: Uuid, date: NaiveDate) -> CoreResult<i32> {
        let booked: Option<i32> = sqlx::query_scalar(
            "SELECT booked FROM trip_date_slots WHERE trip_id = $1 AND slot_date = $2",
        )
        .bind(trip_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error("Slot"))?;

        Ok(booked.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_bound_never_adds_before_comparing() {
        assert!(RESERVE_SLOTS_SQL.contains("booked <= $4 - $3"));
        assert!(!RESERVE_SLOTS_SQL.contains("booked + $3 <="));
    }
}
