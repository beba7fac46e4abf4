//! Stack event timeline: the data model and the parser that turns an event
//! feed into durations.

pub mod error;
pub mod event;
pub mod order;
pub mod parser;
pub mod summary;

pub use error::UnexpectedSequenceError;
pub use event::{ResourceStatus, StackEvent};
pub use order::{arrange, EventOrder};
pub use parser::parse;
pub use summary::TimelineSummary;
