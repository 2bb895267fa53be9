//! Core build pipeline, extracted from the CLI.
//!
//! The entry point is I/O-agnostic: catalog loading, request loading and artifact
//! writing all go through the port traits.

use crate::catalog::{CatalogOracle, LoadedCatalog};
use crate::ports::{CatalogSource, IntentSource, WritePort};
use crate::settings::{BuildSettings, RunMode};
use anyhow::Context;
use camino::Utf8Path;
use chrono::{DateTime, Utc};
use rigforge_domain::Synthesizer;
use rigforge_render::render_build_md;
use rigforge_types::report::{
    BuildReport, CatalogRef, ReportArtifacts, ReportCounts, ReportFinding, ReportRunInfo,
    ReportSeverity, ReportStatus, ReportToolInfo, ReportVerdict,
};
use rigforge_types::result::{AdjustmentKind, SynthesisResult};
use tracing::{debug, info};

/// Error type for pipeline results.  Exit code 2 = policy block, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("policy block")]
    PolicyBlock,
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

/// Identity of the program producing the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInfo {
    pub name: String,
    pub version: Option<String>,
    pub commit: Option<String>,
}

/// Stable tokens for the verdict reasons.
pub mod reasons {
    pub const INCOMPATIBLE: &str = "incompatible";
    pub const OVER_BUDGET: &str = "over_budget";
    pub const INCOMPLETE: &str = "incomplete";
}

/// Outcome of `run_build`.
pub struct BuildOutcome {
    pub result: SynthesisResult,
    pub report: BuildReport,
    pub markdown: String,
    pub policy_block: bool,
}

/// Run the build pipeline. Returns the result, report and markdown rendering.
///
/// The caller is responsible for writing artifacts to disk (via `WritePort`)
/// or the convenience `write_build_artifacts` helper.
pub fn run_build(
    settings: &BuildSettings,
    catalog_port: &dyn CatalogSource,
    intent_port: &dyn IntentSource,
    tool: ToolInfo,
) -> Result<BuildOutcome, ToolError> {
    let started = Utc::now();

    let catalog = catalog_port.load_catalog().context("load catalog")?;
    let intent = intent_port.load_intent().context("load build request")?;

    let mut profile = intent.into_profile();
    if let Some(id) = settings.profile_id.as_deref().filter(|id| !id.trim().is_empty()) {
        profile.id = id.to_string();
    }
    debug!(
        profile_id = %profile.id,
        budget = profile.budget,
        catalog = %catalog.path,
        items = catalog.items.len(),
        "starting build"
    );

    let catalog_ref = CatalogRef {
        path: catalog.path.clone(),
        sha256: catalog.sha256.clone(),
        items: catalog.items.len() as u64,
    };
    let LoadedCatalog { items, .. } = catalog;
    let oracle = CatalogOracle::new(items);

    let synthesizer = Synthesizer::with_config(oracle, settings.synthesis);
    let result = synthesizer
        .synthesize(&profile)
        .map_err(anyhow::Error::from)
        .context("synthesize build")?;

    let markdown = render_build_md(&result);
    let report = report_from_build(&result, tool, catalog_ref, started, Utc::now());

    let blockers = verdict_reasons(&result);
    let policy_block = settings.mode == RunMode::Strict && !blockers.is_empty();
    info!(
        build_id = %result.build_id,
        status = ?report.verdict.status,
        policy_block,
        "build finished"
    );

    Ok(BuildOutcome {
        result,
        report,
        markdown,
        policy_block,
    })
}

/// Write all build artifacts to the output directory.
pub fn write_build_artifacts(
    outcome: &BuildOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let build_json = serde_json::to_string_pretty(&outcome.result).context("serialize build")?;
    writer.write_file(&out_dir.join("build.json"), build_json.as_bytes())?;

    writer.write_file(&out_dir.join("build.md"), outcome.markdown.as_bytes())?;

    let report_json = serde_json::to_string_pretty(&outcome.report).context("serialize report")?;
    writer.write_file(&out_dir.join("report.json"), report_json.as_bytes())?;

    Ok(())
}

/// Conditions that make a finished build unacceptable, as reason tokens.
pub fn verdict_reasons(result: &SynthesisResult) -> Vec<&'static str> {
    let mut out = Vec::new();
    if !result.compatibility.is_valid {
        out.push(reasons::INCOMPATIBLE);
    }
    if !result.costs.within_budget {
        out.push(reasons::OVER_BUDGET);
    }
    if !required_skips(result).is_empty() {
        out.push(reasons::INCOMPLETE);
    }
    out
}

fn required_skips(result: &SynthesisResult) -> Vec<rigforge_types::Category> {
    result
        .skipped_components
        .iter()
        .copied()
        .filter(|c| {
            result
                .allocation
                .iter()
                .any(|e| e.category == *c && e.required)
        })
        .collect()
}

// ── report helpers ───────────────────────────────────────────────────────

pub(crate) fn report_from_build(
    result: &SynthesisResult,
    tool: ToolInfo,
    catalog: CatalogRef,
    started: DateTime<Utc>,
    ended: DateTime<Utc>,
) -> BuildReport {
    let mut findings = Vec::new();

    for issue in &result.compatibility.errors {
        findings.push(ReportFinding {
            severity: ReportSeverity::Error,
            code: issue.code.clone(),
            message: issue.message.clone(),
        });
    }
    for issue in &result.compatibility.warnings {
        findings.push(ReportFinding {
            severity: ReportSeverity::Warn,
            code: issue.code.clone(),
            message: issue.message.clone(),
        });
    }
    if !result.costs.within_budget {
        findings.push(ReportFinding {
            severity: ReportSeverity::Warn,
            code: reasons::OVER_BUDGET.to_string(),
            message: format!(
                "Total {:.2} exceeds {:.2} (budget {:.2} x {}) after {} repair passes",
                result.costs.total,
                result.costs.budget * result.repair.max_excess,
                result.costs.budget,
                result.repair.max_excess,
                result.repair.iterations
            ),
        });
    }
    for category in &result.skipped_components {
        let required = required_skips(result).contains(category);
        findings.push(ReportFinding {
            severity: if required {
                ReportSeverity::Warn
            } else {
                ReportSeverity::Info
            },
            code: "category_skipped".to_string(),
            message: if required {
                format!("No compatible {} could be selected", category)
            } else {
                format!("{} not selected", category)
            },
        });
    }
    for adj in &result.adjustments {
        let (code, verb) = match adj.kind {
            AdjustmentKind::AnchorSwap => ("anchor_swap", "swapped to unlock a blocked category"),
            AdjustmentKind::Downgrade => ("downgrade", "downgraded to fit the budget"),
        };
        findings.push(ReportFinding {
            severity: ReportSeverity::Info,
            code: code.to_string(),
            message: format!("{} {}: {} -> {}", adj.category, verb, adj.from_id, adj.to_id),
        });
    }

    let count = |s: ReportSeverity| findings.iter().filter(|f| f.severity == s).count() as u64;
    let counts = ReportCounts {
        info: count(ReportSeverity::Info),
        warn: count(ReportSeverity::Warn),
        error: count(ReportSeverity::Error),
    };

    let status = if counts.error > 0 {
        ReportStatus::Fail
    } else if counts.warn > 0 {
        ReportStatus::Warn
    } else {
        ReportStatus::Pass
    };

    let duration_ms = (ended - started).num_milliseconds().max(0) as u64;
    let selected = result.configuration.len();

    BuildReport {
        schema: rigforge_types::schema::RIGFORGE_REPORT_V1.to_string(),
        tool: ReportToolInfo {
            name: tool.name,
            version: tool.version.unwrap_or_else(|| "unknown".to_string()),
            commit: tool.commit,
        },
        run: ReportRunInfo {
            started_at: started.to_rfc3339(),
            ended_at: Some(ended.to_rfc3339()),
            duration_ms: Some(duration_ms),
        },
        verdict: ReportVerdict {
            status,
            counts,
            reasons: verdict_reasons(result)
                .into_iter()
                .map(str::to_string)
                .collect(),
        },
        findings,
        catalog: Some(catalog),
        artifacts: Some(ReportArtifacts {
            build: Some("build.json".to_string()),
            markdown: Some("build.md".to_string()),
        }),
        data: Some(serde_json::json!({
            "rigforge": {
                "build_id": result.build_id,
                "profile_id": result.profile_id,
                "policy": result.policy,
                "tier": result.tier,
                "budget": result.costs.budget,
                "total": result.costs.total,
                "within_budget": result.costs.within_budget,
                "selected": selected,
                "skipped": result.skipped_components.len(),
                "adjustments": result.adjustments.len(),
            }
        })),
    }
}
