//! Batch command implementation
//!
//! Runs a YAML manifest of requests against one shared cache. Consecutive
//! fetch steps run concurrently; invalidation and stats steps wait for
//! everything before them and run alone.

use std::path::Path;

use colored::Colorize;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheStats, CachedFigmaClient, ResourceKind};
use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::client::{FigmaApi, ImageFormat, ImageOptions, parse_node_id};
use crate::error::{ConfigError, Error, Result};
use crate::models::{BatchStepDisplay, StatsDisplay};
use crate::output::json::JsonOutput;
use crate::output::table;

const DEFAULT_CONCURRENCY: usize = 4;

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_scale() -> f64 {
    1.0
}

/// Batch manifest
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// File key for every step, replacing the configured one
    #[serde(default)]
    pub file_key: Option<String>,

    /// Maximum fetch steps in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    pub steps: Vec<Step>,
}

impl Manifest {
    /// Read and validate a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::Invalid(format!(
                "Cannot read batch manifest {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Result<Self> {
        let manifest: Manifest = serde_yaml::from_str(contents)
            .map_err(|e| ConfigError::Invalid(format!("Invalid batch manifest: {}", e)))?;

        if manifest.concurrency == 0 {
            return Err(
                ConfigError::Invalid("batch concurrency must be at least 1".to_string()).into(),
            );
        }
        Ok(manifest)
    }
}

/// One manifest step
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Metadata {
        node: String,
    },
    Screenshot {
        node: String,
        #[serde(default = "default_scale")]
        scale: f64,
        #[serde(default)]
        format: ImageFormat,
        #[serde(default)]
        download: bool,
    },
    Code {
        node: String,
    },
    File,
    Variables,
    /// Drop every entry whose key contains `node`
    Invalidate {
        node: String,
    },
    InvalidateAll,
    Stats,
}

impl Step {
    /// Resource fetched by this step, `None` for cache-management steps
    fn kind(&self) -> Option<ResourceKind> {
        match self {
            Step::Metadata { .. } => Some(ResourceKind::Metadata),
            Step::Screenshot { .. } => Some(ResourceKind::Screenshot),
            Step::Code { .. } => Some(ResourceKind::Code),
            Step::File => Some(ResourceKind::File),
            Step::Variables => Some(ResourceKind::Variables),
            Step::Invalidate { .. } | Step::InvalidateAll | Step::Stats => None,
        }
    }

    fn is_barrier(&self) -> bool {
        self.kind().is_none()
    }

    fn op(&self) -> &'static str {
        match (self.kind(), self) {
            (Some(kind), _) => kind.as_str(),
            (None, Step::Invalidate { .. }) => "invalidate",
            (None, Step::InvalidateAll) => "invalidate_all",
            (None, _) => "stats",
        }
    }

    fn target(&self) -> &str {
        match self {
            Step::Metadata { node }
            | Step::Screenshot { node, .. }
            | Step::Code { node }
            | Step::Invalidate { node } => node,
            _ => "-",
        }
    }
}

/// Outcome of one step
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub op: &'static str,
    pub target: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepReport {
    fn new(step: usize, source: &Step, outcome: Result<String>) -> Self {
        let (detail, error) = match outcome {
            Ok(detail) => (Some(detail), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            step,
            op: source.op(),
            target: source.target().to_string(),
            success: error.is_none(),
            detail,
            error,
        }
    }
}

impl From<&StepReport> for BatchStepDisplay {
    fn from(report: &StepReport) -> Self {
        Self {
            step: report.step,
            op: report.op.to_string(),
            target: report.target.clone(),
            status: if report.success { "ok" } else { "failed" }.to_string(),
            detail: report
                .detail
                .clone()
                .or_else(|| report.error.clone())
                .unwrap_or_default(),
        }
    }
}

/// Every step outcome plus the cache state after the last step
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub steps: Vec<StepReport>,
    pub failed: usize,
    pub stats: CacheStats,
}

/// Run the batch command
pub async fn run(opts: &GlobalOptions, path: &Path) -> Result<()> {
    let manifest = Manifest::load(path)?;
    let ctx = CommandContext::for_file(opts, manifest.file_key.as_deref()).await?;

    log::debug!(
        "Running {} batch steps with concurrency {}",
        manifest.steps.len(),
        manifest.concurrency
    );

    let progress = if ctx.format == OutputFormat::Json {
        ProgressBar::hidden()
    } else {
        progress_bar(manifest.steps.len())
    };

    let report = run_steps(
        ctx.client.as_ref(),
        &manifest.steps,
        manifest.concurrency,
        &progress,
    )
    .await;
    progress.finish_and_clear();

    print_report(&report, ctx.format)?;
    ctx.shutdown().await;

    if report.failed > 0 {
        return Err(Error::BatchFailed {
            failed: report.failed,
            total: report.steps.len(),
        });
    }
    Ok(())
}

fn progress_bar(len: usize) -> ProgressBar {
    let progress = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} steps")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style);
    progress
}

/// Execute `steps` in order, running each run of fetch steps concurrently.
///
/// Failed steps are recorded and do not stop the batch.
pub async fn run_steps<C: FigmaApi>(
    client: &CachedFigmaClient<C>,
    steps: &[Step],
    concurrency: usize,
    progress: &ProgressBar,
) -> BatchReport {
    let mut reports = Vec::with_capacity(steps.len());
    let mut start = 0;

    while start < steps.len() {
        if steps[start].is_barrier() {
            let outcome = execute(client, &steps[start]).await;
            reports.push(StepReport::new(start + 1, &steps[start], outcome));
            progress.inc(1);
            start += 1;
            continue;
        }

        let end = steps[start..]
            .iter()
            .position(Step::is_barrier)
            .map_or(steps.len(), |offset| start + offset);

        let group: Vec<StepReport> = stream::iter(start..end)
            .map(|i| async move {
                let outcome = execute(client, &steps[i]).await;
                progress.inc(1);
                StepReport::new(i + 1, &steps[i], outcome)
            })
            .buffered(concurrency.max(1))
            .collect()
            .await;

        reports.extend(group);
        start = end;
    }

    let failed = reports.iter().filter(|r| !r.success).count();
    BatchReport {
        steps: reports,
        failed,
        stats: client.cache_stats(),
    }
}

async fn execute<C: FigmaApi>(client: &CachedFigmaClient<C>, step: &Step) -> Result<String> {
    match step {
        Step::Metadata { node } => {
            let metadata = client.get_node_metadata(&parse_node_id(node)?).await?;
            Ok(format!(
                "{} ({}, {} nodes)",
                metadata.name,
                metadata.node_type,
                metadata.node_count()
            ))
        }
        Step::Screenshot {
            node,
            scale,
            format,
            download,
        } => {
            let options = ImageOptions {
                scale: *scale,
                format: *format,
                embed: *download,
            };
            let image = client
                .get_node_screenshot(&parse_node_id(node)?, &options)
                .await?;
            Ok(match image.data {
                Some(data) => format!("{} (embedded, {} base64 chars)", image.url, data.len()),
                None => image.url,
            })
        }
        Step::Code { node } => {
            let code = client.generate_code(&parse_node_id(node)?).await?;
            Ok(format!(
                "component {} ({} lines)",
                code.component_name,
                code.code.lines().count()
            ))
        }
        Step::File => {
            let file = client.get_file().await?;
            Ok(format!("{} ({} pages)", file.name, file.pages.len()))
        }
        Step::Variables => {
            let variables = client.get_design_variables().await?;
            Ok(format!("{} variables", variables.variables.len()))
        }
        Step::Invalidate { node } => {
            // Anything that is not a node id (a file key, say) is matched as-is
            let id = parse_node_id(node).unwrap_or_else(|_| node.clone());
            let removed = client.invalidate_cache(Some(&id))?;
            Ok(format!("removed {} entries", removed))
        }
        Step::InvalidateAll => {
            let removed = client.invalidate_cache(None)?;
            Ok(format!("removed {} entries", removed))
        }
        Step::Stats => {
            let stats = client.cache_stats();
            Ok(format!(
                "total {}, valid {}, expired {}",
                stats.total_entries, stats.valid_entries, stats.expired_entries
            ))
        }
    }
}

fn print_report(report: &BatchReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let mut output = JsonOutput::ok(report);
            if report.failed > 0 {
                output.success = false;
                output.error = Some(format!(
                    "{} of {} batch steps failed",
                    report.failed,
                    report.steps.len()
                ));
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            let rows: Vec<BatchStepDisplay> =
                report.steps.iter().map(BatchStepDisplay::from).collect();
            println!("{}", table::format_table(&rows));
            println!("{}", table::format_table(&[StatsDisplay::from(&report.stats)]));
        }
        OutputFormat::Pretty => {
            for step in &report.steps {
                let mark = if step.success {
                    "✓".green()
                } else {
                    "✗".red()
                };
                let message = match (&step.detail, &step.error) {
                    (Some(detail), _) => detail.normal(),
                    (None, Some(error)) => error.red(),
                    (None, None) => "".normal(),
                };
                println!(
                    "{} {:>3} {:<14} {:<10} {}",
                    mark,
                    step.step,
                    step.op,
                    step.target,
                    message
                );
            }

            let stats = &report.stats;
            println!();
            println!(
                "{} {} entries ({} valid, {} expired)",
                "Cache:".bold(),
                stats.total_entries,
                stats.valid_entries,
                stats.expired_entries
            );
            if report.failed > 0 {
                println!(
                    "{}",
                    format!("{} step(s) failed", report.failed).red().bold()
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::cache::{CacheTtl, MemoryCache, TtlPolicy};
    use crate::client::mock::{MockFigmaClient, node};
    use crate::error::ApiError;

    async fn create_test_client() -> CachedFigmaClient<MockFigmaClient> {
        let mock = MockFigmaClient::new()
            .with_node(node("1:2", "Hero"))
            .await
            .with_node(node("3:4", "Footer"))
            .await;
        let cache = Arc::new(MemoryCache::new(CacheTtl::DEFAULT));
        CachedFigmaClient::new(mock, "FILEKEY", Some(cache), TtlPolicy::default())
    }

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::parse(
            r#"
concurrency: 2
steps:
  - op: metadata
    node: "1:2"
  - op: screenshot
    node: "1-2"
    scale: 2
    format: svg
  - op: file
  - op: invalidate_all
  - op: stats
"#,
        )
        .unwrap();

        assert_eq!(manifest.concurrency, 2);
        assert!(manifest.file_key.is_none());
        assert_eq!(manifest.steps.len(), 5);
        assert_eq!(
            manifest.steps[1],
            Step::Screenshot {
                node: "1-2".to_string(),
                scale: 2.0,
                format: ImageFormat::Svg,
                download: false,
            }
        );
        assert_eq!(manifest.steps[3], Step::InvalidateAll);
    }

    #[test]
    fn test_parse_manifest_defaults_and_errors() {
        let manifest = Manifest::parse("steps:\n  - op: variables\n").unwrap();
        assert_eq!(manifest.concurrency, DEFAULT_CONCURRENCY);

        assert!(Manifest::parse("concurrency: 0\nsteps: []\n").is_err());
        assert!(Manifest::parse("steps:\n  - op: explode\n").is_err());
        assert!(Manifest::parse("steps:\n  - op: metadata\n").is_err());
    }

    #[test]
    fn test_step_labels() {
        let code = Step::Code {
            node: "1:2".to_string(),
        };
        assert_eq!(code.op(), "code");
        assert_eq!(code.target(), "1:2");
        assert!(!code.is_barrier());

        assert_eq!(Step::InvalidateAll.op(), "invalidate_all");
        assert_eq!(Step::Stats.target(), "-");
        assert!(Step::Stats.is_barrier());
    }

    #[tokio::test]
    async fn test_repeated_steps_share_cache() {
        let client = create_test_client().await;
        let steps = vec![
            Step::Metadata {
                node: "1:2".to_string(),
            },
            Step::Stats,
            Step::Metadata {
                node: "1-2".to_string(),
            },
            Step::Code {
                node: "1:2".to_string(),
            },
        ];

        let report = run_steps(&client, &steps, 4, &ProgressBar::hidden()).await;

        assert_eq!(report.failed, 0);
        assert_eq!(report.steps.len(), 4);
        assert_eq!(report.steps[1].detail.as_deref(), Some("total 1, valid 1, expired 0"));
        assert_eq!(report.steps[3].op, "code");
        assert_eq!(client_calls(&client).await, 1);
    }

    #[tokio::test]
    async fn test_failed_step_does_not_abort() {
        let client = create_test_client().await;
        let steps = vec![
            Step::Metadata {
                node: "not a node".to_string(),
            },
            Step::Metadata {
                node: "9:9".to_string(),
            },
            Step::Metadata {
                node: "3:4".to_string(),
            },
        ];

        let report = run_steps(&client, &steps, 1, &ProgressBar::hidden()).await;

        assert_eq!(report.failed, 2);
        assert!(report.steps[0].error.as_deref().unwrap().contains("Invalid node id"));
        assert!(report.steps[1].error.as_deref().unwrap().contains("9:9"));
        assert!(report.steps[2].success);
        assert_eq!(report.stats.total_entries, 1);
    }

    #[tokio::test]
    async fn test_invalidate_barrier_forces_refetch() {
        let client = create_test_client().await;
        let steps = vec![
            Step::Metadata {
                node: "1:2".to_string(),
            },
            Step::Metadata {
                node: "3:4".to_string(),
            },
            Step::Invalidate {
                node: "1-2".to_string(),
            },
            Step::Metadata {
                node: "1:2".to_string(),
            },
            Step::InvalidateAll,
        ];

        let report = run_steps(&client, &steps, 2, &ProgressBar::hidden()).await;

        assert_eq!(report.steps[2].detail.as_deref(), Some("removed 1 entries"));
        assert_eq!(report.steps[4].detail.as_deref(), Some("removed 2 entries"));
        assert_eq!(report.stats.total_entries, 0);
        assert_eq!(client_calls(&client).await, 3);
    }

    #[tokio::test]
    async fn test_empty_invalidate_fails_without_flushing() {
        let client = create_test_client().await;
        let steps = vec![
            Step::Metadata {
                node: "1:2".to_string(),
            },
            Step::File,
            Step::Invalidate {
                node: String::new(),
            },
        ];

        let report = run_steps(&client, &steps, 2, &ProgressBar::hidden()).await;

        assert_eq!(report.failed, 1);
        assert!(!report.steps[2].success);
        assert!(report.steps[2].error.as_deref().unwrap().contains("empty identifier"));
        assert_eq!(report.stats.total_entries, 2);
    }

    #[tokio::test]
    async fn test_upstream_error_reported_per_step() {
        let client = create_test_client().await;
        let steps = vec![Step::File, Step::File];

        client_fail_next(&client, ApiError::ServerError("boom".to_string())).await;
        let report = run_steps(&client, &steps, 1, &ProgressBar::hidden()).await;

        assert!(!report.steps[0].success);
        assert!(report.steps[1].success);
        assert_eq!(report.failed, 1);

        let row = BatchStepDisplay::from(&report.steps[0]);
        assert_eq!(row.status, "failed");
        assert!(row.detail.contains("boom"));
    }

    async fn client_calls(client: &CachedFigmaClient<MockFigmaClient>) -> usize {
        client.inner().call_counts().await.get_node
    }

    async fn client_fail_next(client: &CachedFigmaClient<MockFigmaClient>, error: ApiError) {
        client.inner().fail_next(error).await;
    }
}
