// src/timeline/order.rs

//! How an event feed is arranged before it reaches the parser.

use serde::Deserialize;

use crate::timeline::event::StackEvent;

/// Ordering applied to a fetched event feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EventOrder {
    /// Keep the order the source returned (CloudFormation: newest first).
    #[default]
    AsFetched,

    /// Stable sort by timestamp, newest first. Events sharing a timestamp
    /// keep their relative feed order.
    NewestFirst,
}

/// Arrange `events` according to `order`.
pub fn arrange(mut events: Vec<StackEvent>, order: EventOrder) -> Vec<StackEvent> {
    if order == EventOrder::NewestFirst {
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    }
    events
}
