// src/validate.rs

use regex::Regex;
use serde::Serialize;

use crate::config::{Config, OutputMode};

#[derive(Debug, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

#[derive(Debug, Serialize)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn push_error(&mut self, code: &'static str, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            code,
            message: message.into(),
        });
    }

    pub fn is_valid(&self) -> bool {
        self.valid && self.errors.is_empty()
    }

    #[cfg(test)]
    pub fn codes(&self) -> Vec<&'static str> {
        self.errors.iter().map(|e| e.code).collect()
    }
}

/// Check a merged (config + CLI) configuration. All problems are reported,
/// not just the first.
pub fn validate_config(cfg: &Config) -> ValidationResult {
    let mut result = ValidationResult::ok();

    validate_aws(cfg, &mut result);
    validate_stacks(cfg, &mut result);
    validate_skip_statuses(cfg, &mut result);
    validate_output(cfg, &mut result);

    result
}

/* ---------------- aws ---------------- */

fn validate_aws(cfg: &Config, result: &mut ValidationResult) {
    if cfg.aws.profile.as_deref().is_some_and(|p| p.trim().is_empty()) {
        result.push_error("AWS_PROFILE_EMPTY", "aws.profile is set but empty");
    }

    if cfg.aws.region.as_deref().is_some_and(|r| r.trim().is_empty()) {
        result.push_error("AWS_REGION_EMPTY", "aws.region is set but empty");
    }
}

/* ---------------- stack filters ---------------- */

fn validate_stacks(cfg: &Config, result: &mut ValidationResult) {
    for pattern in &cfg.stacks {
        if pattern.trim().is_empty() {
            result.push_error("STACK_FILTER_EMPTY", "Stack filters must not be empty");
            continue;
        }

        if let Err(e) = Regex::new(pattern) {
            result.push_error(
                "STACK_FILTER_INVALID",
                format!("Invalid stack filter {:?}: {}", pattern, e),
            );
        }
    }
}

fn validate_skip_statuses(cfg: &Config, result: &mut ValidationResult) {
    if cfg.skip_statuses.iter().any(|s| s.trim().is_empty()) {
        result.push_error("SKIP_STATUS_EMPTY", "skip_statuses entries must not be empty");
    }
}

/* ---------------- output ---------------- */

fn validate_output(cfg: &Config, result: &mut ValidationResult) {
    if cfg.output.mode == OutputMode::File
        && cfg.output.file.as_deref().map_or(true, |f| f.trim().is_empty())
    {
        result.push_error(
            "OUTPUT_FILE_MISSING",
            "output.file must be set when output.mode = file",
        );
    }
}
