// src/events_file.rs

//! Saved stack event feeds.
//!
//! Accepts the document printed by
//! `aws cloudformation describe-stack-events --stack-name <name>`:
//!
//! {
//!   "StackEvents": [ { "LogicalResourceId": ..., "ResourceStatus": ..., "Timestamp": ... } ]
//! }
//!
//! or just the bare array. Event order is kept exactly as saved.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::timeline::StackEvent;
use crate::util::read_to_string;

#[derive(Deserialize)]
#[serde(untagged)]
enum EventsDocument {
    Bare(Vec<StackEvent>),
    Described {
        #[serde(rename = "StackEvents")]
        stack_events: Vec<StackEvent>,
    },
}

/// Load a saved event feed from disk.
pub fn load_events(path: &Path) -> Result<Vec<StackEvent>> {
    let raw = read_to_string(path)?;
    parse_events(&raw).with_context(|| format!("Invalid stack events file {:?}", path))
}

pub fn parse_events(raw: &str) -> Result<Vec<StackEvent>> {
    let doc: EventsDocument = serde_json::from_str(raw).context(
        "Expected a describe-stack-events document or an array of events \
         with LogicalResourceId, ResourceStatus and Timestamp",
    )?;

    Ok(match doc {
        EventsDocument::Described { stack_events } => stack_events,
        EventsDocument::Bare(events) => events,
    })
}
