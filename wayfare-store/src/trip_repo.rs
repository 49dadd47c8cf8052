use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use wayfare_core::repository::TripRepository;
use wayfare_core::{
    CoreError, CoreResult, ItineraryDay, NewTrip, Page, SortKey, Trip, TripFilter, TripPatch,
    TripQuery,
};

use crate::storage_error;

pub(crate) const TRIP_COLUMNS: &str = "id, title, description, destination, duration, price, \
    max_group_size, difficulty, start_dates, images, included, excluded, itinerary, created_by, \
    ratings_average, ratings_quantity, featured, active, created_at, updated_at";

pub struct PgTripRepository {
    pool: PgPool,
}

impl PgTripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct TripRow {
    id: Uuid,
    title: String,
    description: String,
    destination: String,
    duration: i32,
    price: f64,
    max_group_size: i32,
    difficulty: String,
    start_dates: Vec<NaiveDate>,
    images: Vec<String>,
    included: Vec<String>,
    excluded: Vec<String>,
    itinerary: Json<Vec<ItineraryDay>>,
    created_by: Uuid,
    ratings_average: f64,
    ratings_quantity: i32,
    featured: bool,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TripRow> for Trip {
    type Error = CoreError;

    fn try_from(row: TripRow) -> Result<Self, Self::Error> {
        Ok(Trip {
            id: row.id,
            title: row.title,
            description: row.description,
            destination: row.destination,
            duration: row.duration,
            price: row.price,
            max_group_size: row.max_group_size,
            difficulty: row.difficulty.parse().map_err(CoreError::StorageError)?,
            start_dates: row.start_dates,
            images: row.images,
            included: row.included,
            excluded: row.excluded,
            itinerary: row.itinerary.0,
            created_by: row.created_by,
            ratings_average: row.ratings_average,
            ratings_quantity: row.ratings_quantity,
            featured: row.featured,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Wraps `term` for ILIKE, escaping the pattern metacharacters it may contain.
fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &TripFilter) {
    qb.push(" WHERE TRUE");

    if let Some(active) = filter.active {
        qb.push(" AND active = ").push_bind(active);
    }
    if let Some(featured) = filter.featured {
        qb.push(" AND featured = ").push_bind(featured);
    }
    if let Some(destination) = &filter.destination {
        qb.push(" AND destination ILIKE ").push_bind(contains_pattern(destination));
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND price <= ").push_bind(max);
    }
    if let Some(duration) = filter.duration {
        qb.push(" AND duration = ").push_bind(duration);
    }
    if let Some(difficulty) = filter.difficulty {
        qb.push(" AND difficulty = ").push_bind(difficulty.as_str());
    }
    if let Some(created_by) = filter.created_by {
        qb.push(" AND created_by = ").push_bind(created_by);
    }
    if let Some(text) = &filter.text {
        let pattern = contains_pattern(text);
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR destination ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn push_order(qb: &mut QueryBuilder<'_, Postgres>, sort: &[SortKey]) {
    qb.push(" ORDER BY ");
    for key in sort {
        qb.push(key.field.column())
            .push(if key.descending { " DESC, " } else { " ASC, " });
    }
    // Stable pages when sort keys tie
    qb.push("id ASC");
}

#[async_trait]
impl TripRepository for PgTripRepository {
    async fn create_trip(&self, input: NewTrip, created_by: Uuid) -> CoreResult<Trip> {
        let trip = Trip::new(input, created_by);

        sqlx::query(&format!(
            "INSERT INTO trips ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)",
            TRIP_COLUMNS
        ))
        .bind(trip.id)
        .bind(&trip.title)
        .bind(&trip.description)
        .bind(&trip.destination)
        .bind(trip.duration)
        .bind(trip.price)
        .bind(trip.max_group_size)
        .bind(trip.difficulty.as_str())
        .bind(&trip.start_dates)
        .bind(&trip.images)
        .bind(&trip.included)
        .bind(&trip.excluded)
        .bind(Json(&trip.itinerary))
        .bind(trip.created_by)
        .bind(trip.ratings_average)
        .bind(trip.ratings_quantity)
        .bind(trip.featured)
        .bind(trip.active)
        .bind(trip.created_at)
        .bind(trip.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error("Trip"))?;

        Ok(trip)
    }

    async fn get_trip(&self, id: Uuid) -> CoreResult<Option<Trip>> {
        let row = sqlx::query_as::<_, TripRow>(&format!("SELECT {} FROM trips WHERE id = $1", TRIP_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("Trip"))?;

        row.map(Trip::try_from).transpose()
    }

    async fn list_trips(&self, query: &TripQuery) -> CoreResult<Page<Trip>> {
        let total = self.count_trips(&query.filter).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM trips", TRIP_COLUMNS));
        push_filter(&mut qb, &query.filter);
        push_order(&mut qb, &query.sort);
        qb.push(" LIMIT ").push_bind(i64::from(query.limit));
        qb.push(" OFFSET ").push_bind(query.offset() as i64);

        let rows = qb
            .build_query_as::<TripRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("Trip"))?;

        Ok(Page {
            items: rows.into_iter().map(Trip::try_from).collect::<CoreResult<_>>()?,
            total,
            page: query.page,
            limit: query.limit,
        })
    }

    async fn find_trips(
        &self,
        filter: &TripFilter,
        sort: &[SortKey],
        limit: Option<u32>,
    ) -> CoreResult<Vec<Trip>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM trips", TRIP_COLUMNS));
        push_filter(&mut qb, filter);
        push_order(&mut qb, sort);
        if let Some(limit) = limit {
            qb.push(" LIMIT ").push_bind(i64::from(limit));
        }

        let rows = qb
            .build_query_as::<TripRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("Trip"))?;

        rows.into_iter().map(Trip::try_from).collect()
    }

    async fn count_trips(&self, filter: &TripFilter) -> CoreResult<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM trips");
        push_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error("Trip"))?;

        Ok(count.max(0) as u64)
    }

    async fn update_trip(&self, id: Uuid, patch: TripPatch) -> CoreResult<Option<Trip>> {
        let Some(mut trip) = self.get_trip(id).await? else {
            return Ok(None);
        };
        trip.apply(patch);

        let result = sqlx::query(
            r#"
            UPDATE trips SET title = $2, description = $3, destination = $4, duration = $5,
                price = $6, max_group_size = $7, difficulty = $8, start_dates = $9, images = $10,
                included = $11, excluded = $12, itinerary = $13, featured = $14, active = $15,
                updated_at = $16
            WHERE id = $1
            "#,
        )
        .bind(trip.id)
        .bind(&trip.title)
        .bind(&trip.description)
        .bind(&trip.destination)
        .bind(trip.duration)
        .bind(trip.price)
        .bind(trip.max_group_size)
        .bind(trip.difficulty.as_str())
        .bind(&trip.start_dates)
        .bind(&trip.images)
        .bind(&trip.included)
        .bind(&trip.excluded)
        .bind(Json(&trip.itinerary))
        .bind(trip.featured)
        .bind(trip.active)
        .bind(trip.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error("Trip"))?;

        // Deleted between the read and the write
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(trip))
    }

    async fn delete_trip(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM trips WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error("Trip"))?;

        Ok(result.rows_affected() > 0)
    }
}
