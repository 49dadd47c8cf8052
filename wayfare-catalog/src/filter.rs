//! In-process evaluation of trip filters and sort orders. The SQL store
//! expresses the same predicates in its `WHERE` and `ORDER BY` clauses.

use std::cmp::Ordering;
use wayfare_core::{SortField, SortKey, Trip, TripFilter};

/// True when the trip satisfies every predicate set on the filter.
pub fn matches(trip: &Trip, filter: &TripFilter) -> bool {
    if let Some(active) = filter.active {
        if trip.active != active {
            return false;
        }
    }
    if let Some(destination) = &filter.destination {
        if !contains_ci(&trip.destination, destination) {
            return false;
        }
    }
    if let Some(min) = filter.min_price {
        if trip.price < min {
            return false;
        }
    }
    if let Some(max) = filter.max_price {
        if trip.price > max {
            return false;
        }
    }
    if let Some(duration) = filter.duration {
        if trip.duration != duration {
            return false;
        }
    }
    if let Some(difficulty) = filter.difficulty {
        if trip.difficulty != difficulty {
            return false;
        }
    }
    if let Some(featured) = filter.featured {
        if trip.featured != featured {
            return false;
        }
    }
    if let Some(owner) = filter.created_by {
        if trip.created_by != owner {
            return false;
        }
    }
    if let Some(text) = &filter.text {
        let hit = contains_ci(&trip.title, text)
            || contains_ci(&trip.destination, text)
            || contains_ci(&trip.description, text);
        if !hit {
            return false;
        }
    }
    true
}

/// Lexicographic comparison over the sort keys; ties fall through to the next key
/// and finally to the trip id, so paging never depends on insertion order.
pub fn compare(a: &Trip, b: &Trip, sort: &[SortKey]) -> Ordering {
    for key in sort {
        let ord = compare_field(a, b, key.field);
        let ord = if key.descending { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.id.cmp(&b.id)
}

/// Filters, sorts and slices a collection. Returns the page and the total
/// number of matches before slicing.
pub fn select<'a, I>(
    trips: I,
    filter: &TripFilter,
    sort: &[SortKey],
    offset: u64,
    limit: Option<u32>,
) -> (Vec<Trip>, u64)
where
    I: IntoIterator<Item = &'a Trip>,
{
    let mut hits: Vec<&Trip> = trips.into_iter().filter(|t| matches(t, filter)).collect();
    hits.sort_by(|a, b| compare(a, b, sort));

    let total = hits.len() as u64;
    let take = limit.map(|l| l as usize).unwrap_or(usize::MAX);
    let page = hits
        .into_iter()
        .skip(offset as usize)
        .take(take)
        .cloned()
        .collect();

    (page, total)
}

fn compare_field(a: &Trip, b: &Trip, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::Title => a.title.cmp(&b.title),
        SortField::Destination => a.destination.cmp(&b.destination),
        SortField::Duration => a.duration.cmp(&b.duration),
        SortField::Price => a.price.total_cmp(&b.price),
        SortField::MaxGroupSize => a.max_group_size.cmp(&b.max_group_size),
        SortField::Difficulty => a.difficulty.as_str().cmp(b.difficulty.as_str()),
        SortField::RatingsAverage => a.ratings_average.total_cmp(&b.ratings_average),
        SortField::RatingsQuantity => a.ratings_quantity.cmp(&b.ratings_quantity),
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Utc};
    use uuid::Uuid;
    use wayfare_core::{Difficulty, NewTrip};

    fn trip(title: &str, destination: &str, price: f64, featured: bool, age_days: i64) -> Trip {
        let mut trip = Trip::new(
            NewTrip {
                title: title.to_string(),
                description: format!("{} getaway", destination),
                destination: destination.to_string(),
                duration: 3,
                price,
                max_group_size: 10,
                difficulty: Some(Difficulty::Easy),
                start_dates: vec![NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()],
                images: vec![],
                included: vec![],
                excluded: vec![],
                itinerary: vec![],
                featured,
            },
            Uuid::new_v4(),
        );
        trip.created_at = Utc::now() - Duration::days(age_days);
        trip
    }

    #[test]
    fn test_every_result_satisfies_filter() {
        let mut hidden = trip("Hidden Dunes", "Sahara Desert", 500.0, true, 1);
        hidden.active = false;
        let trips = vec![
            trip("Dune Trek", "Sahara Desert", 700.0, true, 3),
            trip("Medina Walk", "Tunis", 80.0, false, 2),
            trip("Camel Ride", "sahara", 300.0, false, 5),
            hidden,
        ];
        let filter = TripFilter {
            destination: Some("SAHARA".to_string()),
            min_price: Some(250.0),
            ..TripFilter::public()
        };

        let (page, total) = select(&trips, &filter, &SortKey::default_order(), 0, None);

        assert_eq!(total, 2);
        assert!(page.iter().all(|t| t.active && matches(t, &filter)));
        assert_eq!(page[0].title, "Dune Trek");
    }

    #[test]
    fn test_multi_key_sort() {
        let trips = vec![
            trip("B", "Tozeur", 200.0, false, 1),
            trip("A", "Tozeur", 200.0, false, 2),
            trip("C", "Tozeur", 100.0, false, 3),
        ];
        let sort = vec![SortKey::asc(SortField::Price), SortKey::asc(SortField::Title)];
        let (page, _) = select(&trips, &TripFilter::public(), &sort, 0, None);

        let titles: Vec<&str> = page.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_page_slicing_reports_full_total() {
        let trips: Vec<Trip> = (0..7)
            .map(|i| trip(&format!("Trip {}", i), "Sousse", 100.0, false, i))
            .collect();

        let (page, total) = select(&trips, &TripFilter::public(), &SortKey::default_order(), 5, Some(5));

        assert_eq!(total, 7);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].title, "Trip 5");
    }

    #[test]
    fn test_equal_keys_page_by_id() {
        let trips: Vec<Trip> = (0..4)
            .map(|i| trip(&format!("Same {}", i), "Djerba", 90.0, false, 1))
            .collect();
        let sort = vec![SortKey::asc(SortField::Price)];
        let mut ids: Vec<Uuid> = trips.iter().map(|t| t.id).collect();
        ids.sort();

        let (first, _) = select(&trips, &TripFilter::public(), &sort, 0, Some(1));
        let mut reversed = trips.clone();
        reversed.reverse();
        let (second, _) = select(&reversed, &TripFilter::public(), &sort, 1, Some(1));

        assert_eq!(first[0].id, ids[0]);
        assert_eq!(second[0].id, ids[1]);
    }

    #[test]
    fn test_text_search_covers_description() {
        let t = trip("Weekend", "Hammamet", 120.0, false, 1);
        let filter = TripFilter { text: Some("GETAWAY".to_string()), ..Default::default() };
        assert!(matches(&t, &filter));
    }
}
