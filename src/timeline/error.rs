use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::timeline::event::ResourceStatus;
use crate::timeline::parser::Phase;

/// An `_IN_PROGRESS` event arrived while the tracker was not waiting for
/// the start of that phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "unexpected event sequence: {status} at {timestamp} (event #{position}) while {}",
    describe_pending(.pending)
)]
pub struct UnexpectedSequenceError {
    /// The status that could not be paired.
    pub status: ResourceStatus,
    pub timestamp: DateTime<Utc>,
    /// Zero-based position in the supplied sequence, foreign events included.
    pub position: usize,
    /// Phase whose start the tracker was waiting for, if any.
    pub pending: Option<Phase>,
}

fn describe_pending(pending: &Option<Phase>) -> String {
    match pending {
        Some(phase) => format!("waiting for the start of a {} phase", phase),
        None => "no phase was open".to_string(),
    }
}
