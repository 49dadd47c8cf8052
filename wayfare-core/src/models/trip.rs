use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("Invalid difficulty '{}': expected easy, medium or hard", other)),
        }
    }
}

/// One day of a trip's programme.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ItineraryDay {
    pub day: i32,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub activities: Vec<String>,
}

/// A bookable trip. Hidden from public listings when `active` is false.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub destination: String,
    pub duration: i32,
    pub price: f64,
    pub max_group_size: i32,
    pub difficulty: Difficulty,
    pub start_dates: Vec<NaiveDate>,
    pub images: Vec<String>,
    pub included: Vec<String>,
    pub excluded: Vec<String>,
    pub itinerary: Vec<ItineraryDay>,
    pub created_by: Uuid,
    pub ratings_average: f64,
    pub ratings_quantity: i32,
    pub featured: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    /// Builds a fresh, active trip owned by `created_by`.
    pub fn new(input: NewTrip, created_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title.trim().to_string(),
            description: input.description,
            destination: input.destination,
            duration: input.duration,
            price: input.price,
            max_group_size: input.max_group_size,
            difficulty: input.difficulty.unwrap_or_default(),
            start_dates: input.start_dates,
            images: input.images,
            included: input.included,
            excluded: input.excluded,
            itinerary: input.itinerary,
            created_by,
            ratings_average: 0.0,
            ratings_quantity: 0,
            featured: input.featured,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn duration_in_days(&self) -> String {
        format!("{} days", self.duration)
    }

    /// Applies every field present in the patch and bumps `updated_at`.
    pub fn apply(&mut self, patch: TripPatch) {
        if let Some(v) = patch.title { self.title = v.trim().to_string(); }
        if let Some(v) = patch.description { self.description = v; }
        if let Some(v) = patch.destination { self.destination = v; }
        if let Some(v) = patch.duration { self.duration = v; }
        if let Some(v) = patch.price { self.price = v; }
        if let Some(v) = patch.max_group_size { self.max_group_size = v; }
        if let Some(v) = patch.difficulty { self.difficulty = v; }
        if let Some(v) = patch.start_dates { self.start_dates = v; }
        if let Some(v) = patch.images { self.images = v; }
        if let Some(v) = patch.included { self.included = v; }
        if let Some(v) = patch.excluded { self.excluded = v; }
        if let Some(v) = patch.itinerary { self.itinerary = v; }
        if let Some(v) = patch.featured { self.featured = v; }
        if let Some(v) = patch.active { self.active = v; }
        self.updated_at = Utc::now();
    }
}

/// Body of a trip creation request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewTrip {
    pub title: String,
    pub description: String,
    pub destination: String,
    pub duration: i32,
    pub price: f64,
    pub max_group_size: i32,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    pub start_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub included: Vec<String>,
    #[serde(default)]
    pub excluded: Vec<String>,
    #[serde(default)]
    pub itinerary: Vec<ItineraryDay>,
    #[serde(default)]
    pub featured: bool,
}

/// Partial update of a trip. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TripPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub destination: Option<String>,
    pub duration: Option<i32>,
    pub price: Option<f64>,
    pub max_group_size: Option<i32>,
    pub difficulty: Option<Difficulty>,
    pub start_dates: Option<Vec<NaiveDate>>,
    pub images: Option<Vec<String>>,
    pub included: Option<Vec<String>>,
    pub excluded: Option<Vec<String>>,
    pub itinerary: Option<Vec<ItineraryDay>>,
    pub featured: Option<bool>,
    pub active: Option<bool>,
}
