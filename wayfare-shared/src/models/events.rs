use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

/// An event worth recording on the structured log stream.
pub trait DomainEvent: Serialize {
    const TOPIC: &'static str;
}

/// Emits the event as a single structured `tracing` record under the
/// `wayfare::events` target.
pub fn publish<E: DomainEvent>(event: &E) {
    match serde_json::to_string(event) {
        Ok(payload) => tracing::info!(target: "wayfare::events", topic = E::TOPIC, %payload, "domain event"),
        Err(e) => tracing::warn!(target: "wayfare::events", topic = E::TOPIC, "failed to serialize event: {}", e),
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct BookingCreatedEvent {
    pub booking_id: Uuid,
    pub trip_id: Uuid,
    pub user_id: Option<Uuid>,
    pub participants: u32,
    pub selected_date: NaiveDate,
    pub total_amount: f64,
    pub timestamp: i64,
}

impl DomainEvent for BookingCreatedEvent {
    const TOPIC: &'static str = "booking.created";
}

#[derive(Debug, Serialize, Clone)]
pub struct BookingStatusChangedEvent {
    pub booking_id: Uuid,
    pub status: String,
    pub payment_status: String,
    pub changed_by: Option<Uuid>,
    pub timestamp: i64,
}

impl DomainEvent for BookingStatusChangedEvent {
    const TOPIC: &'static str = "booking.status_changed";
}

#[derive(Debug, Serialize, Clone)]
pub struct PasswordResetRequestedEvent {
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub email_sent: bool,
}

impl DomainEvent for PasswordResetRequestedEvent {
    const TOPIC: &'static str = "auth.password_reset_requested";
}
