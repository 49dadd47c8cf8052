use chrono::{Months, NaiveDate};
use std::collections::BTreeSet;

use crate::snapshot::TripSnapshot;

/// Everything a rule may look at when deciding and answering.
pub struct ChatContext<'a> {
    /// Lower-cased, trimmed user message.
    pub message: &'a str,
    pub trips: &'a [TripSnapshot],
    pub today: NaiveDate,
}

impl ChatContext<'_> {
    fn mentions(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.message.contains(n))
    }

    fn has_word(&self, words: &[&str]) -> bool {
        self.message
            .split(|c: char| !c.is_alphanumeric())
            .any(|token| words.contains(&token))
    }

    fn destinations(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.trips
            .iter()
            .map(|t| t.destination.as_str())
            .filter(|d| seen.insert(*d))
            .collect()
    }
}

/// A (predicate, responder) pair. Higher priority is tried first.
#[derive(Clone)]
pub struct ChatRule {
    pub name: &'static str,
    pub priority: i32,
    pub matches: fn(&ChatContext) -> bool,
    pub respond: fn(&ChatContext) -> String,
}

impl std::fmt::Debug for ChatRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRule")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish()
    }
}

const NO_TRIPS: &str = "I don't see any trips available right now. Please check back later!";

pub fn default_rules() -> Vec<ChatRule> {
    vec![
        ChatRule {
            name: "greeting",
            priority: 110,
            matches: |ctx| ctx.has_word(&["hello", "hi", "hey"]),
            respond: |_| "Hello! 👋 I'm your Tunisia Travel Assistant. I can help you explore our amazing trips! What would you like to know?".to_string(),
        },
        ChatRule {
            name: "availability",
            priority: 100,
            // Questions about featured trips are left to the next rule.
            matches: |ctx| {
                ctx.message.contains("trip")
                    && ctx.mentions(&["have", "available", "show"])
                    && !ctx.mentions(&["featured", "special"])
            },
            respond: availability,
        },
        ChatRule {
            name: "featured",
            priority: 90,
            matches: |ctx| ctx.mentions(&["featured", "special"]),
            respond: featured,
        },
        ChatRule {
            name: "price",
            priority: 80,
            matches: |ctx| ctx.mentions(&["price", "cost", "cheap"]),
            respond: price,
        },
        ChatRule {
            name: "dates",
            priority: 70,
            matches: |ctx| ctx.mentions(&["date", "when", "time"]),
            respond: dates,
        },
        ChatRule {
            name: "desert",
            priority: 60,
            matches: |ctx| ctx.mentions(&["sahara", "desert"]),
            respond: desert,
        },
        ChatRule {
            name: "duration",
            priority: 50,
            matches: |ctx| ctx.mentions(&["day", "duration", "long"]),
            respond: duration,
        },
        ChatRule {
            name: "difficulty",
            priority: 40,
            matches: |ctx| ctx.mentions(&["difficult", "easy", "hard"]),
            respond: difficulty,
        },
        ChatRule {
            name: "inclusions",
            priority: 30,
            matches: |ctx| ctx.mentions(&["include", "what", "cover"]),
            respond: inclusions,
        },
        ChatRule {
            name: "trip_details",
            priority: 20,
            matches: |ctx| ctx.mentions(&["tell me about", "more about", "details"]),
            respond: trip_details,
        },
        ChatRule {
            name: "booking",
            priority: 10,
            matches: |ctx| ctx.mentions(&["book", "reserve", "sign up"]),
            respond: |_| {
                "I'd love to help you book a trip! 🎉\n\n\
                 To make a reservation, you can:\n\
                 1. Browse our trips and click 'Book Now' on any trip card\n\
                 2. Go to our Destinations page to see all available trips\n\
                 3. Contact us directly for personalized assistance\n\n\
                 Which trip interests you most?"
                    .to_string()
            },
        },
    ]
}

/// Reply when no rule matches.
pub fn menu(ctx: &ChatContext) -> String {
    let sample: Vec<&str> = ctx.destinations().into_iter().take(3).collect();
    format!(
        "I can help you with trip-related questions! Try asking about:\n\n\
         🌍 Destinations like: {}\n\
         💰 Prices and costs\n\
         📅 Available dates\n\
         ⭐ Featured trips\n\
         ⛰️ Difficulty levels\n\
         🎒 What's included\n\n\
         Or ask me to show you all available trips!",
        sample.join(", ")
    )
}

fn availability(ctx: &ChatContext) -> String {
    if ctx.trips.is_empty() {
        return NO_TRIPS.to_string();
    }
    format!(
        "We currently have {} amazing trips available to destinations like: {}.\n\n\
         Would you like me to show you specific types of trips or featured ones?",
        ctx.trips.len(),
        ctx.destinations().join(", ")
    )
}

fn featured(ctx: &ChatContext) -> String {
    let list: Vec<String> = ctx
        .trips
        .iter()
        .filter(|t| t.featured)
        .take(3)
        .map(|t| format!("• {} - {} ({} TND)", t.title, t.destination, t.price))
        .collect();

    if list.is_empty() {
        return "We don't have any featured trips at the moment, but all our trips are amazing! 🌟".to_string();
    }
    format!(
        "Here are our featured trips:\n\n{}\n\nWould you like more details about any of these?",
        list.join("\n")
    )
}

fn price(ctx: &ChatContext) -> String {
    let cheapest = ctx.trips.iter().min_by(|a, b| a.price.total_cmp(&b.price));
    let priciest = ctx.trips.iter().max_by(|a, b| a.price.total_cmp(&b.price));

    match (cheapest, priciest) {
        (Some(low), Some(high)) => format!(
            "Our trips range from {} TND to {} TND.\n\n\
             💰 Cheapest trip: {} ({} TND)\n\
             💎 Most expensive: {} ({} TND)\n\n\
             What price range are you looking for?",
            low.price, high.price, low.title, low.price, high.title, high.price
        ),
        _ => NO_TRIPS.to_string(),
    }
}

fn dates(ctx: &ChatContext) -> String {
    let horizon = ctx
        .today
        .checked_add_months(Months::new(1))
        .unwrap_or(ctx.today);

    let upcoming: Vec<Vec<NaiveDate>> = ctx
        .trips
        .iter()
        .map(|t| {
            t.parsed_start_dates()
                .into_iter()
                .filter(|d| *d > ctx.today)
                .collect::<Vec<_>>()
        })
        .filter(|dates| !dates.is_empty())
        .collect();

    if upcoming.is_empty() {
        return "I don't see any upcoming trip dates right now. Please contact us for scheduling information!".to_string();
    }

    let next_month = upcoming
        .iter()
        .filter(|dates| dates.iter().any(|d| *d <= horizon))
        .count();

    if next_month > 0 {
        format!(
            "We have {} trips available in the next month!\n\nWould you like to see specific dates?",
            next_month
        )
    } else {
        "We have trips available! Would you like to see the specific dates?".to_string()
    }
}

fn desert(ctx: &ChatContext) -> String {
    let list: Vec<String> = ctx
        .trips
        .iter()
        .filter(|t| {
            let destination = t.destination.to_lowercase();
            let description = t.description.to_lowercase();
            ["sahara", "desert"]
                .iter()
                .any(|k| destination.contains(k) || description.contains(k))
        })
        .take(3)
        .map(|t| format!("• {} - {} ({} days, {} TND)", t.title, t.destination, t.duration, t.price))
        .collect();

    if list.is_empty() {
        return "I don't see any Sahara desert trips currently available, but we have other amazing destinations!".to_string();
    }
    format!(
        "Here are our Sahara desert trips:\n\n{}\n\nThe Sahara offers incredible dune landscapes and authentic desert experiences!",
        list.join("\n")
    )
}

fn duration(ctx: &ChatContext) -> String {
    let shortest = ctx.trips.iter().map(|t| t.duration).min();
    let longest = ctx.trips.iter().map(|t| t.duration).max();

    let (Some(shortest), Some(longest)) = (shortest, longest) else {
        return NO_TRIPS.to_string();
    };

    let short = ctx.trips.iter().filter(|t| t.duration <= 3).count();
    let long = ctx.trips.iter().filter(|t| t.duration >= 7).count();

    format!(
        "We offer trips from {} to {} days.\n\n\
         ⚡ Short trips (1-3 days): {} available\n\
         🗓️ Long trips (7+ days): {} available\n\n\
         What duration are you interested in?",
        shortest, longest, short, long
    )
}

fn difficulty(ctx: &ChatContext) -> String {
    let count = |level: &str| ctx.trips.iter().filter(|t| t.difficulty == level).count();

    format!(
        "We have trips for all fitness levels:\n\n\
         🟢 Easy ({}): Suitable for everyone, minimal physical activity\n\
         🟡 Medium ({}): Moderate fitness required\n\
         🔴 Hard ({}): Good fitness level required\n\n\
         Which level suits you best?",
        count("easy"),
        count("medium"),
        count("hard")
    )
}

fn inclusions(ctx: &ChatContext) -> String {
    match ctx.trips.first() {
        Some(sample) if !sample.included.is_empty() => {
            let items: Vec<&str> = sample.included.iter().take(5).map(String::as_str).collect();
            format!(
                "Our trips typically include: {} and more!\n\n\
                 Each trip is different, so check the specific details for what you're interested in.",
                items.join(", ")
            )
        }
        _ => "Each trip includes different things! Generally, our trips include accommodation, some meals, and guided tours. Check the specific trip details for exact inclusions.".to_string(),
    }
}

fn trip_details(ctx: &ChatContext) -> String {
    let term = ["tell me about", "more about", "details"]
        .iter()
        .fold(ctx.message.to_string(), |acc, phrase| acc.replace(phrase, ""));
    let term = term.trim();

    let found = ctx.trips.iter().find(|t| {
        t.title.to_lowercase().contains(term)
            || t.destination.to_lowercase().contains(term)
            || t.description.to_lowercase().contains(term)
    });

    match found {
        Some(trip) => {
            let summary: String = trip.description.chars().take(200).collect();
            format!(
                "Here's information about \"{}\":\n\n\
                 📍 Destination: {}\n\
                 ⏱️ Duration: {} days\n\
                 💰 Price: {} TND\n\
                 👥 Max group: {} people\n\
                 ⭐ Difficulty: {}\n\n\
                 {}...\n\n\
                 Would you like to book this trip or see more details?",
                trip.title, trip.destination, trip.duration, trip.price, trip.max_group_size, trip.difficulty, summary
            )
        }
        None => "I couldn't find specific information about that. Could you tell me more about what you're looking for? You can ask about destinations, prices, or trip types!".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(message: &'a str, trips: &'a [TripSnapshot]) -> ChatContext<'a> {
        ChatContext { message, trips, today: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap() }
    }

    #[test]
    fn test_greeting_needs_whole_word() {
        let rules = default_rules();
        let greeting = rules.iter().find(|r| r.name == "greeting").unwrap();
        assert!((greeting.matches)(&ctx("hi there", &[])));
        assert!(!(greeting.matches)(&ctx("which trips are in the sahara", &[])));
    }

    #[test]
    fn test_dates_counts_trips_in_next_month() {
        let trips = vec![
            TripSnapshot { title: "Soon".into(), start_dates: vec!["2025-05-20".into()], ..Default::default() },
            TripSnapshot { title: "Later".into(), start_dates: vec!["2025-09-01".into()], ..Default::default() },
            TripSnapshot { title: "Past".into(), start_dates: vec!["2025-01-01".into()], ..Default::default() },
        ];
        assert_eq!(
            dates(&ctx("when", &trips)),
            "We have 1 trips available in the next month!\n\nWould you like to see specific dates?"
        );
    }

    #[test]
    fn test_price_range() {
        let trips = vec![
            TripSnapshot { title: "Budget".into(), price: 90.0, ..Default::default() },
            TripSnapshot { title: "Luxury".into(), price: 1250.5, ..Default::default() },
        ];
        let reply = price(&ctx("price", &trips));
        assert!(reply.starts_with("Our trips range from 90 TND to 1250.5 TND."));
        assert!(reply.contains("Cheapest trip: Budget (90 TND)"));
        assert_eq!(price(&ctx("price", &[])), NO_TRIPS);
    }

    #[test]
    fn test_details_lookup() {
        let trips = vec![TripSnapshot {
            title: "Tabarka Diving".into(),
            destination: "Tabarka".into(),
            description: "Coral reefs".into(),
            duration: 3,
            price: 310.0,
            max_group_size: 8,
            difficulty: "medium".into(),
            ..Default::default()
        }];
        let reply = trip_details(&ctx("tell me about tabarka", &trips));
        assert!(reply.starts_with("Here's information about \"Tabarka Diving\""));
        assert!(reply.contains("👥 Max group: 8 people"));
    }
}
