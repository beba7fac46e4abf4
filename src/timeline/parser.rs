// src/timeline/parser.rs

//! Reconstructs stack durations from a CloudFormation event feed.
//!
//! The feed is consumed in the order supplied. CloudFormation returns events
//! newest first, so for any single lifecycle phase the `_COMPLETE` event is
//! seen before the `_IN_PROGRESS` event that opened it. The parser remembers
//! the completion time and pairs it with the next matching start.
//!
//! Pairing is positional. Use [`crate::timeline::order::arrange`] when the
//! feed order cannot be trusted.

use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;

use crate::timeline::error::UnexpectedSequenceError;
use crate::timeline::event::{ResourceStatus, StackEvent};
use crate::timeline::summary::TimelineSummary;

/// Lifecycle phase of the stack resource itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Create,
    Update,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Create => f.write_str("create"),
            Phase::Update => f.write_str("update"),
        }
    }
}

/// Which phase completion, if any, is waiting for its start event.
///
/// Never returns to `Idle` once a completion has been seen.
#[derive(Debug, Clone, Copy)]
enum Tracker {
    Idle,
    Awaiting { phase: Phase, end: DateTime<Utc> },
}

impl Tracker {
    fn pending(&self) -> Option<Phase> {
        match self {
            Tracker::Idle => None,
            Tracker::Awaiting { phase, .. } => Some(*phase),
        }
    }
}

/// Reduce one stack's event feed to its timeline summary.
///
/// Only events whose logical resource id equals `stack_name` are considered.
/// Fails on the first start event that has no open completion of the same
/// phase; nothing accumulated so far is returned in that case.
pub fn parse(
    events: &[StackEvent],
    stack_name: &str,
) -> Result<TimelineSummary, UnexpectedSequenceError> {
    let mut tracker = Tracker::Idle;
    let mut creation_duration: Option<TimeDelta> = None;
    let mut update_durations: Vec<TimeDelta> = Vec::new();
    let mut failed_update_count: u32 = 0;

    for (position, event) in events.iter().enumerate() {
        if event.logical_resource_id != stack_name {
            continue;
        }

        match &event.resource_status {
            ResourceStatus::UpdateRollbackComplete => failed_update_count += 1,
            ResourceStatus::CreateComplete => {
                tracker = Tracker::Awaiting {
                    phase: Phase::Create,
                    end: event.timestamp,
                };
            }
            ResourceStatus::UpdateComplete => {
                tracker = Tracker::Awaiting {
                    phase: Phase::Update,
                    end: event.timestamp,
                };
            }
            ResourceStatus::CreateInProgress => match tracker {
                Tracker::Awaiting {
                    phase: Phase::Create,
                    end,
                } => creation_duration = Some(end - event.timestamp),
                _ => return Err(unexpected(event, position, &tracker)),
            },
            ResourceStatus::UpdateInProgress => match tracker {
                Tracker::Awaiting {
                    phase: Phase::Update,
                    end,
                } => update_durations.push(end - event.timestamp),
                _ => return Err(unexpected(event, position, &tracker)),
            },
            ResourceStatus::Other(_) => {}
        }
    }

    Ok(TimelineSummary {
        creation_duration,
        update_durations,
        failed_update_count,
    })
}

fn unexpected(event: &StackEvent, position: usize, tracker: &Tracker) -> UnexpectedSequenceError {
    UnexpectedSequenceError {
        status: event.resource_status.clone(),
        timestamp: event.timestamp,
        position,
        pending: tracker.pending(),
    }
}
