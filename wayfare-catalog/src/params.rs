use serde::Deserialize;
use wayfare_core::{Difficulty, SortField, SortKey, TripFilter, TripQuery};

use crate::QueryError;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw query string of `GET /api/trips`. Everything arrives as text and is
/// checked in [`TripListParams::into_query`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripListParams {
    pub destination: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub duration: Option<String>,
    pub difficulty: Option<String>,
    pub featured: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl TripListParams {
    /// Builds a public (active-only) query.
    pub fn into_query(self) -> Result<TripQuery, QueryError> {
        let mut filter = TripFilter::public();

        filter.destination = non_empty(self.destination);
        filter.min_price = parse_opt::<f64>("minPrice", self.min_price)?;
        filter.max_price = parse_opt::<f64>("maxPrice", self.max_price)?;
        filter.duration = parse_opt::<i32>("duration", self.duration)?;

        if let Some(raw) = non_empty(self.difficulty) {
            let difficulty = raw
                .parse::<Difficulty>()
                .map_err(QueryError::OutOfRange)?;
            filter.difficulty = Some(difficulty);
        }

        if let Some(raw) = non_empty(self.featured) {
            filter.featured = match raw.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => return Err(QueryError::InvalidNumber { field: "featured", value: raw }),
            };
        }

        let sort = match non_empty(self.sort) {
            Some(order) => parse_sort(&order)?,
            None => SortKey::default_order(),
        };

        let page = parse_opt::<u32>("page", self.page)?.unwrap_or(1);
        let limit = parse_opt::<u32>("limit", self.limit)?.unwrap_or(DEFAULT_PAGE_SIZE);

        if page == 0 {
            return Err(QueryError::OutOfRange("page must be at least 1".to_string()));
        }
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(QueryError::OutOfRange(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        Ok(TripQuery { filter, sort, page, limit })
    }
}

/// Query string of `GET /api/trips/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

impl SearchParams {
    pub fn into_filter(self) -> Result<TripFilter, QueryError> {
        let text = non_empty(self.q)
            .ok_or_else(|| QueryError::OutOfRange("Search query is required".to_string()))?;
        Ok(TripFilter { text: Some(text), ..TripFilter::public() })
    }
}

/// Parses `"price,-createdAt"` into ascending price then newest first.
pub fn parse_sort(order: &str) -> Result<Vec<SortKey>, QueryError> {
    let mut keys = Vec::new();

    for raw in order.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (name, descending) = match raw.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (raw, false),
        };
        let field = SortField::from_name(name)
            .ok_or_else(|| QueryError::UnknownSortField(name.to_string()))?;
        keys.push(SortKey { field, descending });
    }

    if keys.is_empty() {
        return Ok(SortKey::default_order());
    }
    Ok(keys)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_opt<T: std::str::FromStr>(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<T>, QueryError> {
    match non_empty(value) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| QueryError::InvalidNumber { field, value: raw }),
        None => Ok(None),
    }
}
