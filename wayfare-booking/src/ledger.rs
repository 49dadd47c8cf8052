use chrono::NaiveDate;
use std::collections::HashMap;
use uuid::Uuid;

use crate::BookingError;

/// New booked count if `quantity` more participants fit under `capacity`.
/// Overflowing counts are refused like any other excess.
pub fn fits(booked: i32, quantity: i32, capacity: i32) -> Result<i32, BookingError> {
    match booked.checked_add(quantity) {
        Some(total) if total <= capacity => Ok(total),
        _ => Err(BookingError::CapacityExceeded {
            remaining: capacity.saturating_sub(booked).max(0),
        }),
    }
}

/// Running count of booked participants per trip and date. The caller must
/// hold exclusive access while it reserves and records the booking, so the
/// capacity check and the increment cannot interleave with another request.
#[derive(Debug, Default)]
pub struct SlotLedger {
    booked: HashMap<(Uuid, NaiveDate), i32>,
}

impl SlotLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn booked(&self, trip_id: Uuid, date: NaiveDate) -> i32 {
        self.booked.get(&(trip_id, date)).copied().unwrap_or(0)
    }

    /// Takes `quantity` slots if they fit under `capacity`; returns the new booked count.
    pub fn reserve(
        &mut self,
        trip_id: Uuid,
        date: NaiveDate,
        quantity: i32,
        capacity: i32,
    ) -> Result<i32, BookingError> {
        let booked = self.booked.entry((trip_id, date)).or_insert(0);
        *booked = fits(*booked, quantity, capacity)?;
        Ok(*booked)
    }

    /// Gives `quantity` slots back.
    pub fn release(&mut self, trip_id: Uuid, date: NaiveDate, quantity: i32) -> Result<i32, BookingError> {
        let booked = self.booked.entry((trip_id, date)).or_insert(0);

        if *booked < quantity {
            return Err(BookingError::OverRelease {
                date,
                requested: quantity,
                booked: *booked,
            });
        }

        *booked -= quantity;
        Ok(*booked)
    }

    /// Drops every counter of a deleted trip.
    pub fn forget_trip(&mut self, trip_id: Uuid) {
        self.booked.retain(|(trip, _), _| *trip != trip_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut ledger = SlotLedger::new();
        let trip = Uuid::new_v4();

        ledger.reserve(trip, date(), 8, 10).unwrap();
        assert_eq!(
            ledger.reserve(trip, date(), 3, 10),
            Err(BookingError::CapacityExceeded { remaining: 2 })
        );
        // The failed attempt did not consume anything.
        assert_eq!(ledger.booked(trip, date()), 8);

        assert_eq!(ledger.reserve(trip, date(), 2, 10), Ok(10));
        assert_eq!(ledger.reserve(trip, date(), 1, 10), Err(BookingError::CapacityExceeded { remaining: 0 }));
    }

    #[test]
    fn test_huge_quantity_does_not_wrap() {
        let mut ledger = SlotLedger::new();
        let trip = Uuid::new_v4();

        ledger.reserve(trip, date(), 1, 10).unwrap();
        assert_eq!(
            ledger.reserve(trip, date(), i32::MAX, 10),
            Err(BookingError::CapacityExceeded { remaining: 9 })
        );
        assert_eq!(ledger.booked(trip, date()), 1);
        assert!(ledger.reserve(trip, date(), 9, 10).is_ok());
    }

    #[test]
    fn test_fits() {
        assert_eq!(fits(0, 10, 10), Ok(10));
        assert!(fits(0, 11, 10).is_err());
        assert!(fits(i32::MAX, 1, i32::MAX).is_err());
    }

    #[test]
    fn test_dates_are_independent() {
        let mut ledger = SlotLedger::new();
        let trip = Uuid::new_v4();
        let other = date().succ_opt().unwrap();

        ledger.reserve(trip, date(), 10, 10).unwrap();
        assert!(ledger.reserve(trip, other, 10, 10).is_ok());
    }

    #[test]
    fn test_release_and_forget() {
        let mut ledger = SlotLedger::new();
        let trip = Uuid::new_v4();

        ledger.reserve(trip, date(), 4, 10).unwrap();
        assert_eq!(ledger.release(trip, date(), 3), Ok(1));
        assert!(ledger.release(trip, date(), 2).is_err());

        ledger.forget_trip(trip);
        assert_eq!(ledger.booked(trip, date()), 0);
    }
}
