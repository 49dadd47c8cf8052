pub mod snapshot;
pub mod rules;
pub mod responder;

pub use snapshot::{ChatRequest, TripSnapshot};
pub use rules::{default_rules, ChatContext, ChatRule};
pub use responder::{Assistant, Reply, OFF_TOPIC_REPLY, TRIP_KEYWORDS};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ChatError {
    #[error("Message is required")]
    EmptyMessage,
}
