// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

use crate::timeline::EventOrder;

/// Root configuration loaded from `config.yaml`.
///
/// This file controls:
/// - Which AWS profile and region are queried
/// - Which stacks are reported
/// - How event feeds are ordered and what happens on a bad sequence
/// - Where the report goes
///
/// Every section is optional. CLI flags override values from here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// AWS session settings
    #[serde(default)]
    pub aws: AwsConfig,

    /// Regex filters on stack names. Empty means every stack.
    ///
    /// Example:
    /// stacks:
    ///   - ^prod-
    ///   - ^shared-network$
    #[serde(default)]
    pub stacks: Vec<String>,

    /// Stacks whose current status is listed here are not reported.
    #[serde(default = "default_skip_statuses")]
    pub skip_statuses: Vec<String>,

    /// Event feed handling
    #[serde(default)]
    pub timeline: TimelineConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// AWS session section.
///
/// Example in config.yaml:
///
/// aws:
///   profile: ops
///   region: eu-west-1
///
/// Unset values fall back to the SDK default provider chain
/// (AWS_PROFILE, AWS_REGION, ~/.aws/config, ...).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AwsConfig {
    #[serde(default)]
    pub profile: Option<String>,

    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelineConfig {
    #[serde(default)]
    pub order: EventOrder,

    #[serde(default)]
    pub on_sequence_error: SequenceErrorPolicy,
}

/// What to do when a stack's events cannot be paired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceErrorPolicy {
    /// Stop the whole run.
    #[default]
    Abort,
    /// Log the stack as failed and continue with the next one.
    Skip,
}

/// Output configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_mode")]
    pub mode: OutputMode,

    /// Only used when mode = file
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: default_output_mode(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Text,
    Json,
    File,
}

fn default_output_mode() -> OutputMode {
    OutputMode::Text
}

fn default_skip_statuses() -> Vec<String> {
    vec!["DELETE_COMPLETE".to_string()]
}

impl Config {
    /// Load and parse `config.yaml` from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_yaml(&raw)
    }

    /// Load `path` if it exists, otherwise fall back to built-in defaults.
    ///
    /// Only used for the implicit default path; an explicitly passed
    /// config file must exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::builtin())
        }
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        // An empty document deserializes to unit, not a mapping.
        if raw.trim().is_empty() {
            return Ok(Self::builtin());
        }

        let cfg: Config = serde_yaml::from_str(raw).context("Failed to parse YAML config")?;
        Ok(cfg)
    }

    /// Defaults as if an empty config file had been read.
    pub fn builtin() -> Self {
        Self {
            skip_statuses: default_skip_statuses(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = Config::from_yaml("").unwrap();
        assert!(cfg.aws.profile.is_none());
        assert!(cfg.aws.region.is_none());
        assert!(cfg.stacks.is_empty());
        assert_eq!(cfg.skip_statuses, vec!["DELETE_COMPLETE".to_string()]);
        assert_eq!(cfg.timeline.order, EventOrder::AsFetched);
        assert_eq!(cfg.timeline.on_sequence_error, SequenceErrorPolicy::Abort);
        assert_eq!(cfg.output.mode, OutputMode::Text);
    }

    #[test]
    fn test_partial_config_keeps_defaults_elsewhere() {
        let cfg = Config::from_yaml("aws:\n  region: eu-west-1\n").unwrap();
        assert_eq!(cfg.aws.region.as_deref(), Some("eu-west-1"));
        assert_eq!(cfg.skip_statuses, vec!["DELETE_COMPLETE".to_string()]);
    }

    #[test]
    fn test_full_config() {
        let raw = r#"
aws:
  profile: ops
  region: us-east-1
stacks:
  - ^prod-
skip_statuses: [DELETE_COMPLETE, ROLLBACK_COMPLETE]
timeline:
  order: newest_first
  on_sequence_error: skip
output:
  mode: file
  file: out/timings.json
"#;
        let cfg = Config::from_yaml(raw).unwrap();
        assert_eq!(cfg.aws.profile.as_deref(), Some("ops"));
        assert_eq!(cfg.stacks, vec!["^prod-".to_string()]);
        assert_eq!(cfg.skip_statuses.len(), 2);
        assert_eq!(cfg.timeline.order, EventOrder::NewestFirst);
        assert_eq!(cfg.timeline.on_sequence_error, SequenceErrorPolicy::Skip);
        assert_eq!(cfg.output.mode, OutputMode::File);
        assert_eq!(cfg.output.file.as_deref(), Some("out/timings.json"));
    }

    #[test]
    fn test_unknown_order_is_rejected() {
        assert!(Config::from_yaml("timeline:\n  order: oldest_first\n").is_err());
    }

    #[test]
    fn test_load_from_disk_and_missing_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let cfg = Config::load_or_default(&path).unwrap();
        assert_eq!(cfg.skip_statuses, vec!["DELETE_COMPLETE".to_string()]);
        assert!(Config::load(&path).is_err());

        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "output:\n  mode: json").unwrap();

        let cfg = Config::load_or_default(&path).unwrap();
        assert_eq!(cfg.output.mode, OutputMode::Json);
    }
}
