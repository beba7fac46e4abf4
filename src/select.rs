// src/select.rs

//! Which stacks get reported.

use anyhow::{Context, Result};
use regex::Regex;

use crate::cfn::StackInfo;
use crate::config::Config;

/// Outcome of checking one stack against the selection rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Report,
    /// Current status is in `skip_statuses` (deleted stacks by default).
    SkipStatus,
    /// Name matches none of the configured filters.
    SkipFilter,
}

#[derive(Debug)]
pub struct StackSelector {
    filters: Vec<Regex>,
    skip_statuses: Vec<String>,
}

impl StackSelector {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let filters = cfg
            .stacks
            .iter()
            .map(|p| Regex::new(p).with_context(|| format!("Invalid stack filter {:?}", p)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            filters,
            skip_statuses: cfg.skip_statuses.clone(),
        })
    }

    pub fn select(&self, stack: &StackInfo) -> Selection {
        if self.skip_statuses.iter().any(|s| s == &stack.status) {
            return Selection::SkipStatus;
        }

        if !self.filters.is_empty() && !self.filters.iter().any(|re| re.is_match(&stack.name)) {
            return Selection::SkipFilter;
        }

        Selection::Report
    }
}
