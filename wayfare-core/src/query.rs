use serde::Serialize;
use uuid::Uuid;
use crate::models::trip::Difficulty;

/// Trip fields a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Title,
    Destination,
    Duration,
    Price,
    MaxGroupSize,
    Difficulty,
    RatingsAverage,
    RatingsQuantity,
}

impl SortField {
    /// Resolves the JSON field name used by clients.
    pub fn from_name(name: &str) -> Option<Self> {
        let field = match name {
            "createdAt" => SortField::CreatedAt,
            "updatedAt" => SortField::UpdatedAt,
            "title" => SortField::Title,
            "destination" => SortField::Destination,
            "duration" => SortField::Duration,
            "price" => SortField::Price,
            "maxGroupSize" => SortField::MaxGroupSize,
            "difficulty" => SortField::Difficulty,
            "ratingsAverage" => SortField::RatingsAverage,
            "ratingsQuantity" => SortField::RatingsQuantity,
            _ => return None,
        };
        Some(field)
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Title => "title",
            SortField::Destination => "destination",
            SortField::Duration => "duration",
            SortField::Price => "price",
            SortField::MaxGroupSize => "max_group_size",
            SortField::Difficulty => "difficulty",
            SortField::RatingsAverage => "ratings_average",
            SortField::RatingsQuantity => "ratings_quantity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub descending: bool,
}

impl SortKey {
    pub fn asc(field: SortField) -> Self {
        Self { field, descending: false }
    }

    pub fn desc(field: SortField) -> Self {
        Self { field, descending: true }
    }

    /// Newest first.
    pub fn default_order() -> Vec<SortKey> {
        vec![SortKey::desc(SortField::CreatedAt)]
    }
}

/// Conjunction of optional predicates over trips. `None` means "don't care".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripFilter {
    /// Case-insensitive substring of the destination.
    pub destination: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub duration: Option<i32>,
    pub difficulty: Option<Difficulty>,
    pub featured: Option<bool>,
    pub active: Option<bool>,
    /// Case-insensitive substring of title, destination or description.
    pub text: Option<String>,
    pub created_by: Option<Uuid>,
}

impl TripFilter {
    /// Only trips visible to the public.
    pub fn public() -> Self {
        Self { active: Some(true), ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripQuery {
    pub filter: TripFilter,
    pub sort: Vec<SortKey>,
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

impl TripQuery {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

impl Default for TripQuery {
    fn default() -> Self {
        Self {
            filter: TripFilter::public(),
            sort: SortKey::default_order(),
            page: 1,
            limit: 10,
        }
    }
}

/// One page of a listing plus the size of the whole result set.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_trips: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.limit))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) * u64::from(self.limit) < self.total
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn info(&self) -> PageInfo {
        PageInfo {
            current_page: self.page,
            total_pages: self.total_pages(),
            total_trips: self.total,
            has_next: self.has_next(),
            has_prev: self.has_prev(),
        }
    }
}
