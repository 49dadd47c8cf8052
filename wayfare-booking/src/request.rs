use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use wayfare_core::{NewBooking, PaymentMethod, Trip};

use crate::BookingError;

/// Body of a booking request, from a signed-in user or a guest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookingRequest {
    /// Optional when the trip id is already part of the route.
    #[serde(default)]
    pub trip_id: Option<Uuid>,
    pub participants: i32,
    pub selected_date: NaiveDate,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    #[serde(default)]
    pub special_requests: Option<String>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

impl BookingRequest {
    pub fn validate(&self) -> Result<(), BookingError> {
        let missing: Vec<&str> = [
            ("customerName", self.customer_name.as_str()),
            ("customerEmail", self.customer_email.as_str()),
            ("customerPhone", self.customer_phone.as_str()),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            return Err(BookingError::MissingFields(missing.join(", ")));
        }
        if self.participants < 1 {
            return Err(BookingError::Invalid("participants must be at least 1".to_string()));
        }
        if !looks_like_email(&self.customer_email) {
            return Err(BookingError::Invalid("customerEmail is not a valid email address".to_string()));
        }
        Ok(())
    }

    /// Prices the request against the trip. Capacity is checked by the store.
    pub fn into_new_booking(self, trip: &Trip, user_id: Option<Uuid>) -> NewBooking {
        NewBooking {
            trip_id: trip.id,
            trip_title: trip.title.clone(),
            user_id,
            customer_name: self.customer_name.trim().to_string(),
            customer_email: self.customer_email.trim().to_lowercase(),
            customer_phone: self.customer_phone.trim().to_string(),
            participants: self.participants,
            selected_date: self.selected_date,
            total_amount: total_amount(trip.price, self.participants),
            special_requests: self.special_requests.filter(|s| !s.trim().is_empty()),
            payment_method: self.payment_method.unwrap_or_default(),
        }
    }
}

pub fn total_amount(price: f64, participants: i32) -> f64 {
    price * f64::from(participants)
}

fn looks_like_email(value: &str) -> bool {
    match value.trim().split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}
