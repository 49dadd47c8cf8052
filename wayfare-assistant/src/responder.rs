use chrono::NaiveDate;

use crate::rules::{default_rules, menu, ChatContext, ChatRule};
use crate::snapshot::TripSnapshot;

/// A message must contain at least one of these to be answered.
pub const TRIP_KEYWORDS: &[&str] = &[
    "trip", "travel", "destination", "price", "cost", "date", "when",
    "where", "location", "tour", "journey", "adventure", "explore",
    "sahara", "desert", "island", "beach", "mountain", "culture",
    "featured", "special", "discount", "booking", "reserve",
    "duration", "days", "nights", "group", "size", "difficulty",
    "easy", "medium", "hard", "included", "excluded", "itinerary",
];

pub const OFF_TOPIC_REPLY: &str = "I can only help with trip-related questions! Please ask me about:\n\n\
🗺️ Our destinations and trips\n\
💰 Pricing and costs\n\
📅 Available dates\n\
🌟 Featured trips\n\
🎒 What's included/excluded\n\
⛰️ Trip difficulty levels\n\n\
Try asking: 'What trips do you have?' or 'Show me featured trips'";

/// Answer plus the rule that produced it. `topic` is `None` for the
/// off-topic reply and for the fallback menu.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub topic: Option<&'static str>,
    pub text: String,
}

/// Stateless keyword responder over a client-supplied trip snapshot.
pub struct Assistant {
    rules: Vec<ChatRule>,
}

impl Assistant {
    pub fn new(rules: Vec<ChatRule>) -> Self {
        let mut rules = rules;
        rules.sort_by_key(|r| -r.priority);
        Self { rules }
    }

    pub fn respond(&self, message: &str, trips: &[TripSnapshot], today: NaiveDate) -> Reply {
        let message = message.trim().to_lowercase();

        if !TRIP_KEYWORDS.iter().any(|k| message.contains(k)) {
            return Reply { topic: None, text: OFF_TOPIC_REPLY.to_string() };
        }

        let ctx = ChatContext { message: &message, trips, today };

        match self.rules.iter().find(|rule| (rule.matches)(&ctx)) {
            Some(rule) => Reply { topic: Some(rule.name), text: (rule.respond)(&ctx) },
            None => Reply { topic: None, text: menu(&ctx) },
        }
    }
}

impl Default for Assistant {
    fn default() -> Self {
        Self::new(default_rules())
    }
}
