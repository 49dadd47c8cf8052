use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::ChatError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub trip_data: Vec<TripSnapshot>,
}

impl ChatRequest {
    pub fn validate(&self) -> Result<(), ChatError> {
        if self.message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        Ok(())
    }
}

/// The client's copy of a trip as sent with each chat message. Whatever the
/// client omits falls back to an empty/zero default, and fields the
/// assistant does not read are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TripSnapshot {
    pub title: String,
    pub destination: String,
    pub description: String,
    pub duration: i64,
    pub price: f64,
    pub max_group_size: i64,
    pub difficulty: String,
    pub featured: bool,
    pub start_dates: Vec<String>,
    pub included: Vec<String>,
}

impl TripSnapshot {
    /// Start dates the client sent in a recognisable format, either
    /// `YYYY-MM-DD` or a full RFC 3339 timestamp.
    pub fn parsed_start_dates(&self) -> Vec<NaiveDate> {
        self.start_dates
            .iter()
            .filter_map(|raw| {
                DateTime::parse_from_rfc3339(raw)
                    .map(|dt| dt.date_naive())
                    .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
                    .ok()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_snapshot_gets_defaults() {
        let snapshot: TripSnapshot = serde_json::from_str(
            r#"{ "_id": "665f", "title": "Djerba Escape", "price": 420, "startDates": ["2025-06-01T00:00:00.000Z", "2025-07-01", "soon"] }"#,
        )
        .unwrap();

        assert_eq!(snapshot.title, "Djerba Escape");
        assert_eq!(snapshot.price, 420.0);
        assert!(snapshot.included.is_empty());
        assert!(!snapshot.featured);
        assert_eq!(
            snapshot.parsed_start_dates(),
            vec![
                NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            ]
        );
    }

    #[test]
    fn test_blank_message_rejected() {
        let request: ChatRequest = serde_json::from_str(r#"{ "message": "  " }"#).unwrap();
        assert_eq!(request.validate(), Err(ChatError::EmptyMessage));
    }
}
