// src/cfn.rs

//! CloudFormation access.
//!
//! Everything here is I/O glue around two paginated API calls:
//! - ListStacks
//! - DescribeStackEvents
//!
//! The runner only talks to the [`StackSource`] trait so the per-stack loop
//! can be exercised without AWS.

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudformation as cfn;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::config::AwsConfig;
use crate::timeline::{ResourceStatus, StackEvent};

/// Stack metadata shown next to the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackInfo {
    pub name: String,
    pub status: String,
    pub creation_time: DateTime<Utc>,
    pub last_updated_time: Option<DateTime<Utc>>,
}

/// Where stacks and their event feeds come from.
#[allow(async_fn_in_trait)]
pub trait StackSource {
    /// Every stack the account/region reports, deleted ones included.
    async fn list_stacks(&self) -> Result<Vec<StackInfo>>;

    /// The complete event history of one stack, in source order
    /// (newest first for CloudFormation). All pages are fetched.
    async fn stack_events(&self, stack_name: &str) -> Result<Vec<StackEvent>>;
}

/// [`StackSource`] backed by the CloudFormation API.
pub struct CloudFormation {
    client: cfn::Client,
}

impl CloudFormation {
    /// Build a client from the SDK default chain, with optional profile
    /// and region overrides.
    pub async fn connect(aws: &AwsConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(profile) = &aws.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &aws.region {
            loader = loader.region(Region::new(region.clone()));
        }

        let sdk_config = loader.load().await;
        debug!(
            profile = aws.profile.as_deref().unwrap_or("<default>"),
            region = ?sdk_config.region(),
            "CloudFormation client configured"
        );

        Ok(Self {
            client: cfn::Client::new(&sdk_config),
        })
    }
}

impl StackSource for CloudFormation {
    async fn list_stacks(&self) -> Result<Vec<StackInfo>> {
        let mut pages = self.client.list_stacks().into_paginator().items().send();
        let mut stacks = Vec::new();

        while let Some(summary) = pages.next().await {
            let summary = summary.context("ListStacks request failed")?;

            let (Some(name), Some(creation_time)) =
                (summary.stack_name(), summary.creation_time())
            else {
                warn!("Stack summary without name or creation time, skipping");
                continue;
            };

            stacks.push(StackInfo {
                name: name.to_string(),
                status: summary
                    .stack_status()
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_default(),
                creation_time: to_utc(creation_time)?,
                last_updated_time: summary.last_updated_time().map(to_utc).transpose()?,
            });
        }

        debug!(count = stacks.len(), "Listed stacks");
        Ok(stacks)
    }

    async fn stack_events(&self, stack_name: &str) -> Result<Vec<StackEvent>> {
        let mut pages = self
            .client
            .describe_stack_events()
            .stack_name(stack_name)
            .into_paginator()
            .items()
            .send();
        let mut events = Vec::new();

        while let Some(event) = pages.next().await {
            let event = event
                .with_context(|| format!("DescribeStackEvents failed for {}", stack_name))?;

            let (Some(logical_id), Some(status), Some(timestamp)) = (
                event.logical_resource_id(),
                event.resource_status(),
                event.timestamp(),
            ) else {
                debug!(stack = stack_name, event_id = ?event.event_id(), "Incomplete event, skipping");
                continue;
            };

            events.push(StackEvent::new(
                logical_id,
                ResourceStatus::from(status.as_str()),
                to_utc(timestamp)?,
            ));
        }

        debug!(stack = stack_name, count = events.len(), "Fetched stack events");
        Ok(events)
    }
}

fn to_utc(ts: &aws_sdk_cloudformation::primitives::DateTime) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
        .with_context(|| format!("Timestamp out of range: {}", ts))
}
