use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use wayfare_booking::{can_cancel, fits, BookingError, BookingRequest, Requester};
use wayfare_core::{Booking, BookingStatus, StatusUpdate};
use wayfare_shared::models::events::{BookingCreatedEvent, BookingStatusChangedEvent};
use wayfare_shared::{publish, Masked};

use crate::error::AppError;
use crate::extract::{parse_id, ValidJson};
use crate::middleware::{AdminUser, AuthUser, MaybeAuthUser};
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking).get(all_bookings))
        .route("/my", get(my_bookings))
        .route("/{id}/status", put(update_status))
        .route("/{id}/cancel", post(cancel_booking))
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CancelRequest {
    /// Contact email a guest booked with.
    #[serde(default)]
    email: Option<String>,
}

async fn place_booking(
    state: &AppState,
    trip_id: Uuid,
    user_id: Option<Uuid>,
    request: BookingRequest,
) -> Result<ApiResponse<Booking>, AppError> {
    request.validate()?;

    let trip = state
        .trips
        .get_trip(trip_id)
        .await?
        .filter(|t| t.active)
        .ok_or_else(|| AppError::NotFoundError("Trip not found".to_string()))?;

    // Groups larger than the trip never reach the counter; the store re-checks atomically
    let booked = state.bookings.booked_slots(trip.id, request.selected_date).await?;
    fits(booked, request.participants, trip.max_group_size)?;

    let booking = state
        .bookings
        .create_booking(request.into_new_booking(&trip, user_id), trip.max_group_size)
        .await?;

    info!(
        booking_id = %booking.id,
        trip_id = %trip.id,
        customer = %Masked(&booking.customer_email),
        phone = %Masked(&booking.customer_phone),
        "Booking created"
    );
    publish(&BookingCreatedEvent {
        booking_id: booking.id,
        trip_id: booking.trip_id,
        user_id: booking.user_id,
        participants: booking.participants.unsigned_abs(),
        selected_date: booking.selected_date,
        total_amount: booking.total_amount,
        timestamp: Utc::now().timestamp(),
    });

    Ok(ApiResponse::ok(booking).created())
}

async fn create_booking(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ValidJson(request): ValidJson<BookingRequest>,
) -> Result<ApiResponse<Booking>, AppError> {
    let trip_id = request
        .trip_id
        .ok_or_else(|| BookingError::MissingFields("tripId".to_string()))?;
    place_booking(&state, trip_id, Some(claims.sub), request).await
}

/// Booking straight from a trip page. Guests may book without an account.
pub async fn book_trip(
    State(state): State<AppState>,
    Path(id): Path<String>,
    MaybeAuthUser(caller): MaybeAuthUser,
    ValidJson(request): ValidJson<BookingRequest>,
) -> Result<ApiResponse<Booking>, AppError> {
    let trip_id = parse_id(&id, "trip")?;
    if request.trip_id.is_some_and(|body_id| body_id != trip_id) {
        return Err(AppError::ValidationError("tripId does not match the trip in the path".to_string()));
    }
    place_booking(&state, trip_id, caller.map(|c| c.sub), request).await
}

async fn my_bookings(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<ApiResponse<Vec<Booking>>, AppError> {
    Ok(ApiResponse::ok(state.bookings.list_for_user(claims.sub).await?))
}

async fn all_bookings(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<ApiResponse<Vec<Booking>>, AppError> {
    Ok(ApiResponse::ok(state.bookings.list_all().await?))
}

fn publish_status_change(booking: &Booking, changed_by: Option<Uuid>) {
    publish(&BookingStatusChangedEvent {
        booking_id: booking.id,
        status: booking.status.to_string(),
        payment_status: booking.payment_status.to_string(),
        changed_by,
        timestamp: Utc::now().timestamp(),
    });
}

async fn update_status(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Path(id): Path<String>,
    ValidJson(update): ValidJson<StatusUpdate>,
) -> Result<ApiResponse<Booking>, AppError> {
    let id = parse_id(&id, "booking")?;
    if update.status.is_none() && update.payment_status.is_none() {
        return Err(AppError::ValidationError("Provide status or paymentStatus".to_string()));
    }

    let booking = state
        .bookings
        .update_status(id, &update)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;

    publish_status_change(&booking, Some(claims.sub));
    Ok(ApiResponse::ok(booking))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    MaybeAuthUser(caller): MaybeAuthUser,
    body: Bytes,
) -> Result<ApiResponse<Booking>, AppError> {
    let id = parse_id(&id, "booking")?;
    // The body is optional for signed-in callers
    let body: CancelRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CancelRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::ValidationError(e.to_string()))?
    };

    let booking = state
        .bookings
        .get_booking(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;

    let requester = Requester {
        user_id: caller.as_ref().map(|c| c.sub),
        role: caller.as_ref().map(|c| c.role),
        email: body.email,
    };
    if !can_cancel(&booking, &requester) {
        return Err(AppError::AuthorizationError("You are not authorized to cancel this booking".to_string()));
    }

    if booking.status == BookingStatus::Cancelled {
        return Ok(ApiResponse::with_msg("Booking already cancelled", booking));
    }

    let cancelled = state
        .bookings
        .update_status(id, &StatusUpdate::cancel())
        .await?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;

    publish_status_change(&cancelled, requester.user_id);
    Ok(ApiResponse::with_msg("Booking cancelled successfully", cancelled))
}
