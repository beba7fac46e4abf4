// src/runner.rs

use crate::cfn::{CloudFormation, StackSource};
use crate::cli::{Cli, Command, RenderArgs};
use crate::config::{Config, OutputMode, SequenceErrorPolicy};
use crate::events_file::load_events;
use crate::render::{format_text, should_use_color, to_json, write_output_file, StackReport};
use crate::select::{Selection, StackSelector};
use crate::timeline::{arrange, parse, UnexpectedSequenceError};
use crate::validate::validate_config;

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const DEFAULT_CONFIG: &str = "config.yaml";

/// Reports produced by one run, plus the stacks whose events could not be
/// paired.
///
/// Under `on_sequence_error: abort` the loop stops at the first such stack
/// and records it in `aborted`; reports finished before it are kept so they
/// still get emitted.
#[derive(Debug, Default)]
struct RunOutcome {
    reports: Vec<StackReport>,
    failed: Vec<String>,
    aborted: Option<(String, UnexpectedSequenceError)>,
}

/// Entry point from `main.rs`.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Init => init_scaffold(Path::new(DEFAULT_CONFIG)),

        Command::Report {
            config,
            profile,
            region,
            stacks,
            skip_invalid,
            render,
        } => {
            let mut cfg = load_config(config.as_deref())?;

            // CLI overrides
            if profile.is_some() {
                cfg.aws.profile = profile;
            }
            if region.is_some() {
                cfg.aws.region = region;
            }
            if !stacks.is_empty() {
                cfg.stacks = stacks;
            }
            if skip_invalid {
                cfg.timeline.on_sequence_error = SequenceErrorPolicy::Skip;
            }
            apply_render_overrides(&mut cfg, render);
            ensure_valid(&cfg)?;

            let source = CloudFormation::connect(&cfg.aws).await?;
            let outcome = collect_reports(&source, &cfg).await?;
            emit(&cfg, &outcome)?;

            if let Some((name, err)) = outcome.aborted {
                return Err(err).with_context(|| format!("Stack {}", name));
            }
            if !outcome.failed.is_empty() {
                bail!(
                    "{} stack(s) had an unexpected event sequence: {}",
                    outcome.failed.len(),
                    outcome.failed.join(", ")
                );
            }
            Ok(())
        }

        Command::Parse {
            file,
            stack,
            config,
            render,
        } => {
            let mut cfg = load_config(config.as_deref())?;
            apply_render_overrides(&mut cfg, render);
            ensure_valid(&cfg)?;

            let outcome = parse_file(&file, &stack, &cfg)?;
            emit(&cfg, &outcome)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => Config::load(p),
        None => Config::load_or_default(Path::new(DEFAULT_CONFIG)),
    }
}

fn apply_render_overrides(cfg: &mut Config, render: RenderArgs) {
    if let Some(order) = render.order {
        cfg.timeline.order = order;
    }
    if let Some(mode) = render.output {
        cfg.output.mode = mode;
    }
    if let Some(path) = render.output_file {
        cfg.output.mode = OutputMode::File;
        cfg.output.file = Some(path.to_string_lossy().to_string());
    }
}

fn ensure_valid(cfg: &Config) -> Result<()> {
    let validation = validate_config(cfg);
    if validation.is_valid() {
        return Ok(());
    }

    for e in &validation.errors {
        eprintln!("✖ [{}] {}", e.code, e.message);
    }
    bail!("Invalid configuration");
}

/* ---------------- core loop ---------------- */

async fn collect_reports<S: StackSource>(source: &S, cfg: &Config) -> Result<RunOutcome> {
    let selector = StackSelector::from_config(cfg)?;
    let stacks = source.list_stacks().await?;
    let mut outcome = RunOutcome::default();

    for stack in stacks {
        match selector.select(&stack) {
            Selection::Report => {}
            Selection::SkipStatus => {
                debug!(stack = %stack.name, status = %stack.status, "Skipping stack by status");
                continue;
            }
            Selection::SkipFilter => {
                debug!(stack = %stack.name, "Stack does not match filters");
                continue;
            }
        }

        info!(stack = %stack.name, "Fetching stack events");
        let events = arrange(source.stack_events(&stack.name).await?, cfg.timeline.order);

        match parse(&events, &stack.name) {
            Ok(summary) => outcome.reports.push(StackReport {
                stack_name: stack.name.clone(),
                info: Some(stack),
                summary,
            }),
            Err(err) => match cfg.timeline.on_sequence_error {
                SequenceErrorPolicy::Abort => {
                    outcome.failed.push(stack.name.clone());
                    outcome.aborted = Some((stack.name, err));
                    break;
                }
                SequenceErrorPolicy::Skip => {
                    warn!(stack = %stack.name, error = %err, "Skipping stack");
                    outcome.failed.push(stack.name);
                }
            },
        }
    }

    Ok(outcome)
}

fn parse_file(file: &Path, stack: &str, cfg: &Config) -> Result<RunOutcome> {
    let events = arrange(load_events(file)?, cfg.timeline.order);

    if !events.iter().any(|e| e.logical_resource_id == stack) {
        warn!(stack, file = %file.display(), "No events for this stack in file");
    }

    let summary =
        parse(&events, stack).with_context(|| format!("Stack {} ({})", stack, file.display()))?;

    Ok(RunOutcome {
        reports: vec![StackReport {
            stack_name: stack.to_string(),
            info: None,
            summary,
        }],
        ..RunOutcome::default()
    })
}

/* ---------------- output ---------------- */

fn emit(cfg: &Config, outcome: &RunOutcome) -> Result<()> {
    match cfg.output.mode {
        OutputMode::Text => {
            let use_color = should_use_color();
            for report in &outcome.reports {
                println!("{}", format_text(report, use_color));
            }
            for name in &outcome.failed {
                eprintln!("✖ {}: unexpected event sequence", name);
            }
        }
        OutputMode::Json => {
            let payload = to_json(&outcome.reports, &outcome.failed);
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        OutputMode::File => {
            let path = PathBuf::from(
                cfg.output
                    .file
                    .as_ref()
                    .context("output.file must be set when output.mode = file")?,
            );
            write_output_file(&path, &to_json(&outcome.reports, &outcome.failed))?;
            eprintln!("Wrote {}", path.display());
        }
    }

    Ok(())
}

/* ---------------- init ---------------- */

fn init_scaffold(path: &Path) -> Result<()> {
    if path.exists() {
        eprintln!("{} already exists (skipping)", path.display());
        return Ok(());
    }

    std::fs::write(path, default_config_yaml())
        .with_context(|| format!("Failed to write {:?}", path))?;
    eprintln!("Created {}", path.display());

    Ok(())
}

fn default_config_yaml() -> &'static str {
    r#"
# Unset values fall back to AWS_PROFILE / AWS_REGION and ~/.aws/config
# aws:
#   profile: default
#   region: eu-west-1

# Regex filters on stack names; empty reports every stack
stacks: []

skip_statuses:
  - DELETE_COMPLETE

timeline:
  order: as_fetched # as_fetched | newest_first
  on_sequence_error: abort # abort | skip

output:
  mode: text # text | json | file
  # file: timings.json
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfn::StackInfo;
    use crate::timeline::{EventOrder, ResourceStatus, StackEvent};
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeSource {
        stacks: Vec<StackInfo>,
        events: HashMap<String, Vec<StackEvent>>,
        fetched: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                stacks: Vec::new(),
                events: HashMap::new(),
                fetched: Mutex::new(Vec::new()),
            }
        }

        fn with_stack(mut self, name: &str, status: &str, events: Vec<StackEvent>) -> Self {
            self.stacks.push(StackInfo {
                name: name.to_string(),
                status: status.to_string(),
                creation_time: at(0),
                last_updated_time: None,
            });
            self.events.insert(name.to_string(), events);
            self
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    impl StackSource for FakeSource {
        async fn list_stacks(&self) -> Result<Vec<StackInfo>> {
            Ok(self.stacks.clone())
        }

        async fn stack_events(&self, stack_name: &str) -> Result<Vec<StackEvent>> {
            self.fetched.lock().unwrap().push(stack_name.to_string());
            self.events
                .get(stack_name)
                .cloned()
                .context("unknown stack")
        }
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, minute, 0).unwrap()
    }

    fn ev(stack: &str, status: ResourceStatus, minute: u32) -> StackEvent {
        StackEvent::new(stack, status, at(minute))
    }

    fn created(stack: &str) -> Vec<StackEvent> {
        vec![
            ev(stack, ResourceStatus::CreateComplete, 5),
            ev(stack, ResourceStatus::CreateInProgress, 2),
        ]
    }

    fn broken(stack: &str) -> Vec<StackEvent> {
        vec![ev(stack, ResourceStatus::UpdateInProgress, 1)]
    }

    #[tokio::test]
    async fn test_reports_live_stacks_and_skips_deleted() {
        let source = FakeSource::new()
            .with_stack("web", "CREATE_COMPLETE", created("web"))
            .with_stack("old", "DELETE_COMPLETE", created("old"));

        let outcome = collect_reports(&source, &Config::builtin()).await.unwrap();

        assert_eq!(source.fetched(), vec!["web".to_string()]);
        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.reports[0].stack_name, "web");
        assert_eq!(
            outcome.reports[0].summary.creation_duration,
            Some(TimeDelta::minutes(3))
        );
        assert!(outcome.reports[0].info.is_some());
        assert!(outcome.failed.is_empty());
    }

    #[tokio::test]
    async fn test_filters_limit_fetched_stacks() {
        let source = FakeSource::new()
            .with_stack("prod-web", "CREATE_COMPLETE", created("prod-web"))
            .with_stack("dev-web", "CREATE_COMPLETE", created("dev-web"));

        let mut cfg = Config::builtin();
        cfg.stacks = vec!["^prod-".to_string()];

        let outcome = collect_reports(&source, &cfg).await.unwrap();
        assert_eq!(source.fetched(), vec!["prod-web".to_string()]);
        assert_eq!(outcome.reports.len(), 1);
    }

    #[tokio::test]
    async fn test_sequence_error_aborts_by_default() {
        let source = FakeSource::new()
            .with_stack("bad", "UPDATE_COMPLETE", broken("bad"))
            .with_stack("web", "CREATE_COMPLETE", created("web"));

        let outcome = collect_reports(&source, &Config::builtin()).await.unwrap();

        let (name, err) = outcome.aborted.expect("run should abort");
        assert_eq!(name, "bad");
        assert_eq!(err.status, ResourceStatus::UpdateInProgress);
        assert_eq!(outcome.failed, vec!["bad".to_string()]);
        assert!(outcome.reports.is_empty());
        assert_eq!(source.fetched(), vec!["bad".to_string()]);
    }

    #[tokio::test]
    async fn test_abort_keeps_reports_finished_before_the_bad_stack() {
        let source = FakeSource::new()
            .with_stack("web", "CREATE_COMPLETE", created("web"))
            .with_stack("bad", "UPDATE_COMPLETE", broken("bad"))
            .with_stack("api", "CREATE_COMPLETE", created("api"));

        let outcome = collect_reports(&source, &Config::builtin()).await.unwrap();

        assert_eq!(source.fetched(), vec!["web".to_string(), "bad".to_string()]);
        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.reports[0].stack_name, "web");
        assert!(outcome.aborted.is_some());

        // The finished stack still reaches the output.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timings.json");
        let mut cfg = Config::builtin();
        cfg.output.mode = OutputMode::File;
        cfg.output.file = Some(path.to_string_lossy().to_string());
        emit(&cfg, &outcome).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["ok"], false);
        assert_eq!(written["stacks"][0]["stack_name"], "web");
        assert_eq!(written["stacks"][0]["creation_duration"]["seconds"], 180.0);
        assert_eq!(written["failed_stacks"][0], "bad");
    }

    #[tokio::test]
    async fn test_sequence_error_skip_policy_continues() {
        let source = FakeSource::new()
            .with_stack("bad", "UPDATE_COMPLETE", broken("bad"))
            .with_stack("web", "CREATE_COMPLETE", created("web"));

        let mut cfg = Config::builtin();
        cfg.timeline.on_sequence_error = SequenceErrorPolicy::Skip;

        let outcome = collect_reports(&source, &cfg).await.unwrap();
        assert_eq!(outcome.failed, vec!["bad".to_string()]);
        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.reports[0].stack_name, "web");
    }

    #[tokio::test]
    async fn test_newest_first_order_is_applied_before_parsing() {
        let oldest_first = vec![
            ev("web", ResourceStatus::UpdateInProgress, 10),
            ev("web", ResourceStatus::UpdateComplete, 14),
        ];
        let source = FakeSource::new().with_stack("web", "UPDATE_COMPLETE", oldest_first);

        assert!(collect_reports(&source, &Config::builtin()).await.is_err());

        let mut cfg = Config::builtin();
        cfg.timeline.order = EventOrder::NewestFirst;

        let outcome = collect_reports(&source, &cfg).await.unwrap();
        assert_eq!(
            outcome.reports[0].summary.update_durations,
            vec![TimeDelta::minutes(4)]
        );
    }

    #[test]
    fn test_parse_file_reports_single_stack() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        let events = vec![
            ev("web", ResourceStatus::UpdateComplete, 30),
            ev("web", ResourceStatus::UpdateInProgress, 20),
            ev("web", ResourceStatus::UpdateRollbackComplete, 15),
        ];
        std::fs::write(
            &path,
            serde_json::to_string(&serde_json::json!({ "StackEvents": events })).unwrap(),
        )
        .unwrap();

        let outcome = parse_file(&path, "web", &Config::builtin()).unwrap();
        assert_eq!(outcome.reports.len(), 1);

        let report = &outcome.reports[0];
        assert!(report.info.is_none());
        assert_eq!(report.summary.update_durations, vec![TimeDelta::minutes(10)]);
        assert_eq!(report.summary.failed_update_count, 1);
    }

    #[test]
    fn test_render_overrides() {
        let mut cfg = Config::builtin();
        apply_render_overrides(
            &mut cfg,
            RenderArgs {
                order: Some(EventOrder::NewestFirst),
                output: Some(OutputMode::Json),
                output_file: Some(PathBuf::from("out/t.json")),
            },
        );

        assert_eq!(cfg.timeline.order, EventOrder::NewestFirst);
        assert_eq!(cfg.output.mode, OutputMode::File);
        assert_eq!(cfg.output.file.as_deref(), Some("out/t.json"));
    }

    #[test]
    fn test_emit_file_mode_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timings.json");

        let mut cfg = Config::builtin();
        cfg.output.mode = OutputMode::File;
        cfg.output.file = Some(path.to_string_lossy().to_string());

        let outcome = RunOutcome {
            failed: vec!["bad".to_string()],
            ..RunOutcome::default()
        };
        emit(&cfg, &outcome).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["ok"], false);
        assert_eq!(written["failed_stacks"][0], "bad");
    }

    #[test]
    fn test_init_scaffold_is_loadable_and_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        init_scaffold(&path).unwrap();
        let cfg = Config::load(&path).unwrap();
        assert!(validate_config(&cfg).is_valid());
        assert_eq!(cfg.skip_statuses, vec!["DELETE_COMPLETE".to_string()]);

        std::fs::write(&path, "output:\n  mode: json\n").unwrap();
        init_scaffold(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap().output.mode, OutputMode::Json);
    }
}
