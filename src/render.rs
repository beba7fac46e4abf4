// src/render.rs

//! Report rendering.
//!
//! Text output keeps the classic per-stack block layout, one block per
//! stack separated by a dashed rule. JSON output carries the same data with
//! durations both as display strings and as seconds.

use anyhow::{Context, Result};
use chrono::TimeDelta;
use serde::Serialize;
use std::io::IsTerminal;
use std::path::Path;

use crate::cfn::StackInfo;
use crate::timeline::TimelineSummary;
use crate::util::{duration_seconds, ensure_dir, format_duration, format_timestamp, or_none};

const RULE_WIDTH: usize = 40;

/// One stack's metadata (when known) and its timeline.
#[derive(Debug, Clone)]
pub struct StackReport {
    pub stack_name: String,
    pub info: Option<StackInfo>,
    pub summary: TimelineSummary,
}

/// Render the classic text block for one stack.
pub fn format_text(report: &StackReport, use_color: bool) -> String {
    let summary = &report.summary;
    let mut out = String::new();

    out.push_str(&format!(
        "Stack Name: {}\n",
        paint(&report.stack_name, "1", use_color)
    ));

    if let Some(info) = &report.info {
        out.push_str(&format!("Current Status: {}\n", info.status));
        out.push_str(&format!(
            "Creation Time: {}\n",
            format_timestamp(&info.creation_time)
        ));
        out.push_str(&format!(
            "Last Updated Time: {}\n",
            or_none(info.last_updated_time.as_ref(), format_timestamp)
        ));
    }

    out.push_str(&format!(
        "Creation Time Taken: {}\n",
        or_none(summary.creation_duration, format_duration)
    ));

    for (i, update) in summary.update_durations.iter().enumerate() {
        out.push_str(&format!(
            "Update Time Taken {}: {}\n",
            i + 1,
            format_duration(*update)
        ));
    }

    out.push_str(&format!(
        "Average Update Time Taken: {}\n",
        or_none(summary.average_update_duration(), format_duration)
    ));

    let failed = summary.failed_update_count.to_string();
    let failed = if summary.failed_update_count > 0 {
        paint(&failed, "31", use_color)
    } else {
        failed
    };
    out.push_str(&format!("Failed Update Count: {}\n", failed));
    out.push_str(&"-".repeat(RULE_WIDTH));

    out
}

/* ---------------- json ---------------- */

#[derive(Debug, Serialize)]
struct DurationJson {
    display: String,
    seconds: f64,
}

impl From<TimeDelta> for DurationJson {
    fn from(delta: TimeDelta) -> Self {
        Self {
            display: format_duration(delta),
            seconds: duration_seconds(delta),
        }
    }
}

#[derive(Debug, Serialize)]
struct StackReportJson<'a> {
    stack_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    creation_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_updated_time: Option<String>,
    creation_duration: Option<DurationJson>,
    update_durations: Vec<DurationJson>,
    average_update_duration: Option<DurationJson>,
    failed_update_count: u32,
}

impl<'a> From<&'a StackReport> for StackReportJson<'a> {
    fn from(report: &'a StackReport) -> Self {
        let summary = &report.summary;
        let info = report.info.as_ref();

        Self {
            stack_name: &report.stack_name,
            status: info.map(|i| i.status.as_str()),
            creation_time: info.map(|i| i.creation_time.to_rfc3339()),
            last_updated_time: info
                .and_then(|i| i.last_updated_time)
                .map(|t| t.to_rfc3339()),
            creation_duration: summary.creation_duration.map(DurationJson::from),
            update_durations: summary
                .update_durations
                .iter()
                .copied()
                .map(DurationJson::from)
                .collect(),
            average_update_duration: summary.average_update_duration().map(DurationJson::from),
            failed_update_count: summary.failed_update_count,
        }
    }
}

/// JSON document for a whole run: successful stacks plus the names of
/// stacks whose events could not be paired.
pub fn to_json(reports: &[StackReport], failed: &[String]) -> serde_json::Value {
    let stacks: Vec<StackReportJson<'_>> = reports.iter().map(StackReportJson::from).collect();

    serde_json::json!({
        "ok": failed.is_empty(),
        "stacks": stacks,
        "failed_stacks": failed,
    })
}

pub fn write_output_file(path: &Path, payload: &serde_json::Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }

    let bytes = serde_json::to_vec_pretty(payload).context("Failed to serialize output JSON")?;

    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write output file {:?}", path))?;

    Ok(())
}

/* ---------------- terminal ---------------- */

pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("\x1b[{}m{}\x1b[0m", color, text)
    } else {
        text.to_string()
    }
}
