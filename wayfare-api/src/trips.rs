use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tracing::info;
use wayfare_catalog::{validate_new_trip, validate_patch, SearchParams, TripListParams};
use wayfare_core::query::PageInfo;
use wayfare_core::{Booking, NewTrip, SortField, SortKey, Trip, TripFilter, TripPatch};

use crate::bookings::book_trip;
use crate::chatbot::chat;
use crate::error::AppError;
use crate::extract::{parse_id, ValidJson, ValidQuery};
use crate::middleware::{AdminUser, Claims, MaybeAuthUser};
use crate::response::ApiResponse;
use crate::state::AppState;

const FEATURED_LIMIT: u32 = 6;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trips).post(create_trip))
        .route("/featured", get(featured_trips))
        .route("/destination/{destination}", get(trips_by_destination))
        .route("/search", get(search_trips))
        .route("/chatbot", post(chat))
        .route("/bookings/all", get(all_bookings))
        .route("/{id}", get(get_trip).put(update_trip).delete(delete_trip))
        .route("/{id}/book", post(book_trip))
}

/// A trip as sent to clients, with its derived `durationInDays`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripView {
    #[serde(flatten)]
    pub trip: Trip,
    pub duration_in_days: String,
}

impl From<Trip> for TripView {
    fn from(trip: Trip) -> Self {
        let duration_in_days = trip.duration_in_days();
        Self { trip, duration_in_days }
    }
}

pub fn views(trips: Vec<Trip>) -> Vec<TripView> {
    trips.into_iter().map(TripView::from).collect()
}

#[derive(Debug, Serialize)]
struct TripPage {
    trips: Vec<TripView>,
    pagination: PageInfo,
}

fn can_manage(trip: &Trip, claims: &Claims) -> bool {
    claims.is_admin() || trip.created_by == claims.sub
}

fn by_rating() -> Vec<SortKey> {
    vec![SortKey::desc(SortField::RatingsAverage)]
}

async fn list_trips(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<TripListParams>,
) -> Result<ApiResponse<TripPage>, AppError> {
    let query = params.into_query()?;
    let page = state.trips.list_trips(&query).await?;
    let pagination = page.info();

    Ok(ApiResponse::ok(TripPage { trips: views(page.items), pagination }))
}

async fn featured_trips(State(state): State<AppState>) -> Result<ApiResponse<Vec<TripView>>, AppError> {
    let filter = TripFilter { featured: Some(true), ..TripFilter::public() };
    let trips = state.trips.find_trips(&filter, &by_rating(), Some(FEATURED_LIMIT)).await?;
    Ok(ApiResponse::ok(views(trips)))
}

async fn trips_by_destination(
    State(state): State<AppState>,
    Path(destination): Path<String>,
) -> Result<ApiResponse<Vec<TripView>>, AppError> {
    let filter = TripFilter { destination: Some(destination), ..TripFilter::public() };
    let trips = state.trips.find_trips(&filter, &by_rating(), None).await?;
    Ok(ApiResponse::ok(views(trips)))
}

async fn search_trips(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<SearchParams>,
) -> Result<ApiResponse<Vec<TripView>>, AppError> {
    let filter = params.into_filter()?;
    let trips = state.trips.find_trips(&filter, &SortKey::default_order(), None).await?;
    Ok(ApiResponse::ok(views(trips)))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<String>,
    MaybeAuthUser(caller): MaybeAuthUser,
) -> Result<ApiResponse<TripView>, AppError> {
    let id = parse_id(&id, "trip")?;
    let trip = state
        .trips
        .get_trip(id)
        .await?
        // Hidden trips stay visible to whoever manages them
        .filter(|t| t.active || caller.as_ref().is_some_and(|c| can_manage(t, c)))
        .ok_or_else(|| AppError::NotFoundError("Trip not found".to_string()))?;

    Ok(ApiResponse::ok(TripView::from(trip)))
}

async fn create_trip(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    ValidJson(input): ValidJson<NewTrip>,
) -> Result<ApiResponse<TripView>, AppError> {
    validate_new_trip(&input)?;
    let trip = state.trips.create_trip(input, claims.sub).await?;

    info!(trip_id = %trip.id, created_by = %claims.sub, "Trip created");
    Ok(ApiResponse::with_msg("Trip created successfully", TripView::from(trip)).created())
}

async fn update_trip(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<TripPatch>,
) -> Result<ApiResponse<TripView>, AppError> {
    let id = parse_id(&id, "trip")?;
    validate_patch(&patch)?;

    let updated = state
        .trips
        .update_trip(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Trip not found".to_string()))?;

    info!(trip_id = %id, by = %claims.sub, "Trip updated");
    Ok(ApiResponse::with_msg("Trip updated successfully", TripView::from(updated)))
}

async fn delete_trip(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let id = parse_id(&id, "trip")?;
    if !state.trips.delete_trip(id).await? {
        return Err(AppError::NotFoundError("Trip not found".to_string()));
    }

    info!(trip_id = %id, by = %claims.sub, "Trip deleted");
    Ok(ApiResponse::message("Trip deleted successfully"))
}

async fn all_bookings(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<ApiResponse<Vec<Booking>>, AppError> {
    Ok(ApiResponse::ok(state.bookings.list_all().await?))
}
