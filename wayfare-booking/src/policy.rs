use uuid::Uuid;
use wayfare_core::{Booking, BookingStatus, Role};

/// Whoever is asking for a change to a booking.
#[derive(Debug, Clone, Default)]
pub struct Requester {
    pub user_id: Option<Uuid>,
    pub role: Option<Role>,
    /// Contact email offered by a guest, compared case-insensitively.
    pub email: Option<String>,
}

impl Requester {
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

/// Admins may cancel anything, users their own bookings, and guests the
/// bookings they made without an account under the same email.
pub fn can_cancel(booking: &Booking, requester: &Requester) -> bool {
    if requester.is_admin() {
        return true;
    }

    if let (Some(owner), Some(user_id)) = (booking.user_id, requester.user_id) {
        if owner == user_id {
            return true;
        }
    }

    match (&requester.email, booking.user_id) {
        (Some(email), None) => email.trim().eq_ignore_ascii_case(&booking.customer_email),
        _ => false,
    }
}

/// Slot movement implied by a status overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotMove {
    Reserve(i32),
    Release(i32),
    Keep,
}

pub fn slot_move(from: BookingStatus, to: BookingStatus, participants: i32) -> SlotMove {
    match (from.holds_capacity(), to.holds_capacity()) {
        (true, false) => SlotMove::Release(participants),
        (false, true) => SlotMove::Reserve(participants),
        _ => SlotMove::Keep,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wayfare_core::{NewBooking, PaymentMethod};

    fn booking(user_id: Option<Uuid>) -> Booking {
        Booking::new(NewBooking {
            trip_id: Uuid::new_v4(),
            trip_title: "Ain Draham Forest".to_string(),
            user_id,
            customer_name: "Nour".to_string(),
            customer_email: "nour@example.com".to_string(),
            customer_phone: "+21650000000".to_string(),
            participants: 3,
            selected_date: NaiveDate::from_ymd_opt(2025, 11, 2).unwrap(),
            total_amount: 270.0,
            special_requests: None,
            payment_method: PaymentMethod::Transfer,
        })
    }

    #[test]
    fn test_owner_and_admin_can_cancel() {
        let owner = Uuid::new_v4();
        let b = booking(Some(owner));

        assert!(can_cancel(&b, &Requester { user_id: Some(owner), role: Some(Role::User), email: None }));
        assert!(can_cancel(&b, &Requester { user_id: Some(Uuid::new_v4()), role: Some(Role::Admin), email: None }));
        assert!(!can_cancel(&b, &Requester { user_id: Some(Uuid::new_v4()), role: Some(Role::User), email: None }));
    }

    #[test]
    fn test_guest_email_only_matches_guest_bookings() {
        let guest = booking(None);
        let by_email = Requester { email: Some("NOUR@example.com".to_string()), ..Default::default() };
        assert!(can_cancel(&guest, &by_email));

        let owned = booking(Some(Uuid::new_v4()));
        assert!(!can_cancel(&owned, &by_email));
        assert!(!can_cancel(&guest, &Requester::default()));
    }

    #[test]
    fn test_slot_moves() {
        use BookingStatus::*;
        assert_eq!(slot_move(Pending, Cancelled, 3), SlotMove::Release(3));
        assert_eq!(slot_move(Confirmed, Completed, 3), SlotMove::Release(3));
        assert_eq!(slot_move(Cancelled, Confirmed, 3), SlotMove::Reserve(3));
        assert_eq!(slot_move(Pending, Confirmed, 3), SlotMove::Keep);
        assert_eq!(slot_move(Cancelled, Cancelled, 3), SlotMove::Keep);
    }
}
