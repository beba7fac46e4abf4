// src/timeline/event.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource status values the timeline cares about.
///
/// Anything else CloudFormation reports (DELETE_*, IMPORT_*, *_FAILED, ...)
/// is kept verbatim in `Other` and ignored by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceStatus {
    CreateInProgress,
    CreateComplete,
    UpdateInProgress,
    UpdateComplete,
    UpdateRollbackComplete,
    Other(String),
}

impl ResourceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceStatus::CreateInProgress => "CREATE_IN_PROGRESS",
            ResourceStatus::CreateComplete => "CREATE_COMPLETE",
            ResourceStatus::UpdateInProgress => "UPDATE_IN_PROGRESS",
            ResourceStatus::UpdateComplete => "UPDATE_COMPLETE",
            ResourceStatus::UpdateRollbackComplete => "UPDATE_ROLLBACK_COMPLETE",
            ResourceStatus::Other(raw) => raw.as_str(),
        }
    }
}

impl From<&str> for ResourceStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "CREATE_IN_PROGRESS" => ResourceStatus::CreateInProgress,
            "CREATE_COMPLETE" => ResourceStatus::CreateComplete,
            "UPDATE_IN_PROGRESS" => ResourceStatus::UpdateInProgress,
            "UPDATE_COMPLETE" => ResourceStatus::UpdateComplete,
            "UPDATE_ROLLBACK_COMPLETE" => ResourceStatus::UpdateRollbackComplete,
            other => ResourceStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for ResourceStatus {
    fn from(raw: String) -> Self {
        ResourceStatus::from(raw.as_str())
    }
}

impl From<ResourceStatus> for String {
    fn from(status: ResourceStatus) -> Self {
        match status {
            ResourceStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lifecycle transition recorded for a resource within a stack.
///
/// Field names follow the CloudFormation API (PascalCase) so saved
/// `describe-stack-events` output deserializes directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackEvent {
    pub logical_resource_id: String,
    pub resource_status: ResourceStatus,
    pub timestamp: DateTime<Utc>,
}

impl StackEvent {
    pub fn new(
        logical_resource_id: impl Into<String>,
        resource_status: ResourceStatus,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            logical_resource_id: logical_resource_id.into(),
            resource_status,
            timestamp,
        }
    }
}
