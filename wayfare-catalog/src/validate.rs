use wayfare_core::{NewTrip, TripPatch};

use crate::QueryError;

pub fn validate_new_trip(input: &NewTrip) -> Result<(), QueryError> {
    require_text("title", &input.title)?;
    require_text("description", &input.description)?;
    require_text("destination", &input.destination)?;
    check_numbers(Some(input.duration), Some(input.price), Some(input.max_group_size))?;
    if input.start_dates.is_empty() {
        return Err(QueryError::InvalidTrip("startDates must contain at least one date".to_string()));
    }
    Ok(())
}

pub fn validate_patch(patch: &TripPatch) -> Result<(), QueryError> {
    if let Some(title) = &patch.title {
        require_text("title", title)?;
    }
    if let Some(description) = &patch.description {
        require_text("description", description)?;
    }
    if let Some(destination) = &patch.destination {
        require_text("destination", destination)?;
    }
    check_numbers(patch.duration, patch.price, patch.max_group_size)?;
    if matches!(&patch.start_dates, Some(dates) if dates.is_empty()) {
        return Err(QueryError::InvalidTrip("startDates must contain at least one date".to_string()));
    }
    Ok(())
}

fn require_text(field: &str, value: &str) -> Result<(), QueryError> {
    if value.trim().is_empty() {
        return Err(QueryError::InvalidTrip(format!("{} is required", field)));
    }
    Ok(())
}

fn check_numbers(duration: Option<i32>, price: Option<f64>, max_group_size: Option<i32>) -> Result<(), QueryError> {
    if matches!(duration, Some(d) if d < 1) {
        return Err(QueryError::InvalidTrip("duration must be at least 1 day".to_string()));
    }
    if matches!(price, Some(p) if !p.is_finite() || p < 0.0) {
        return Err(QueryError::InvalidTrip("price must be zero or more".to_string()));
    }
    if matches!(max_group_size, Some(m) if m < 1) {
        return Err(QueryError::InvalidTrip("maxGroupSize must be at least 1".to_string()));
    }
    Ok(())
}
