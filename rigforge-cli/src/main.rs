mod config;
mod explain;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use config::{CliOverrides, ConfigMerger, MergedConfig};
use rigforge_core::adapters::{FixedIntent, FsCatalogSource, FsWritePort, JsonIntentFile};
use rigforge_core::pipeline::{BuildOutcome, ToolError, ToolInfo, run_build, write_build_artifacts};
use rigforge_core::ports::IntentSource;
use rigforge_core::settings::BuildSettings;
use rigforge_domain::allocate;
use rigforge_types::report::ReportStatus;
use rigforge_types::{BudgetTier, Category, Intent, UseCase};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "rigforge",
    version,
    about = "Budget-bounded, compatibility-checked PC build synthesis."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Synthesize a build from a catalog and write build artifacts.
    Build(BuildArgs),
    /// Show how a budget would be split across categories (no catalog needed).
    Allocate(AllocateArgs),
    /// Explain an allocation policy and its per-tier budget shares.
    Explain(ExplainArgs),
    /// List all allocation policies.
    ListPolicies(ListPoliciesArgs),
}

/// Request given directly on the command line.
#[derive(Debug, Parser)]
struct RequestArgs {
    /// Total budget.
    #[arg(long)]
    budget: Option<f64>,

    /// Use case (repeatable): gaming, development, design, video_editing, streaming, office.
    #[arg(long = "use-case", value_parser = parse_use_case)]
    use_cases: Vec<UseCase>,

    /// Category to resolve right after the anchors (repeatable, in order).
    #[arg(long = "priority", value_parser = parse_category)]
    priorities: Vec<Category>,

    /// Ask for high-end processors even below the high-budget threshold.
    #[arg(long, default_value_t = false)]
    high_performance: bool,
}

/// Threshold and config-file options shared by `build` and `allocate`.
#[derive(Debug, Parser)]
struct TuningArgs {
    /// Config file (default: ./rigforge.toml if present).
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Budgets strictly below this use the low-budget rules.
    #[arg(long)]
    low_budget_below: Option<f64>,

    /// Budgets strictly above this use the high-budget rules.
    #[arg(long)]
    high_budget_above: Option<f64>,
}

#[derive(Debug, Parser)]
struct BuildArgs {
    /// Catalog JSON file, or a directory of *.json catalog files.
    #[arg(long, env = "RIGFORGE_CATALOG")]
    catalog: Utf8PathBuf,

    /// Intent JSON file (budget, use_cases, priorities, ...). Replaces the request flags.
    #[arg(long, conflicts_with_all = ["budget", "use_cases", "priorities", "high_performance"])]
    intent: Option<Utf8PathBuf>,

    #[command(flatten)]
    request: RequestArgs,

    /// Ranking profile id (default: suggested from use cases and budget).
    #[arg(long)]
    profile: Option<String>,

    /// Output directory for build artifacts (default: artifacts/rigforge).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Exit 2 when the build is over budget, incompatible or incomplete.
    #[arg(long, default_value_t = false)]
    strict: bool,

    #[command(flatten)]
    tuning: TuningArgs,
}

#[derive(Debug, Parser)]
struct AllocateArgs {
    #[command(flatten)]
    request: RequestArgs,

    #[command(flatten)]
    tuning: TuningArgs,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct ExplainArgs {
    /// Policy or use case to explain (e.g., "gaming", "creative", "video-editing").
    policy: String,
}

#[derive(Debug, Parser)]
struct ListPoliciesArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_use_case(s: &str) -> Result<UseCase, String> {
    s.parse()
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse().map_err(|e: rigforge_types::ParseCategoryError| e.to_string())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match real_main() {
        Ok(()) => ExitCode::from(0),
        Err(ToolError::PolicyBlock) => {
            error!("policy block: build does not meet strict requirements");
            ExitCode::from(2)
        }
        Err(ToolError::Internal(e)) => {
            error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

fn real_main() -> Result<(), ToolError> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Build(args) => cmd_build(args),
        Command::Allocate(args) => Ok(cmd_allocate(args)?),
        Command::Explain(args) => Ok(cmd_explain(args)?),
        Command::ListPolicies(args) => Ok(cmd_list_policies(args)?),
    }
}

fn merged_config(tuning: &TuningArgs, out_dir: Option<Utf8PathBuf>, strict: bool) -> anyhow::Result<MergedConfig> {
    let cwd = Utf8PathBuf::from(".");
    let file_config = config::load_or_default(tuning.config.as_deref(), &cwd)
        .context("load rigforge.toml config")?;
    let merged = ConfigMerger::new(file_config).merge(&CliOverrides {
        low_budget_below: tuning.low_budget_below,
        high_budget_above: tuning.high_budget_above,
        out_dir,
        strict,
    })?;
    debug!(
        "merged config: thresholds={:?}, out_dir={}, mode={:?}",
        merged.synthesis, merged.out_dir, merged.mode
    );
    Ok(merged)
}

fn intent_from_flags(request: &RequestArgs) -> anyhow::Result<Intent> {
    let Some(budget) = request.budget else {
        anyhow::bail!("either --intent or --budget is required");
    };
    Ok(Intent {
        budget,
        use_cases: request.use_cases.clone(),
        priorities: request.priorities.clone(),
        suggested_profile_id: None,
        high_performance: request.high_performance,
    })
}

fn cmd_build(args: BuildArgs) -> Result<(), ToolError> {
    let merged = merged_config(&args.tuning, args.out_dir.clone(), args.strict)?;

    let intent_port: Box<dyn IntentSource> = match &args.intent {
        Some(path) => Box::new(JsonIntentFile::new(path.clone())),
        None => Box::new(FixedIntent(intent_from_flags(&args.request)?)),
    };

    let settings = BuildSettings {
        out_dir: merged.out_dir.clone(),
        profile_id: args.profile.clone(),
        synthesis: merged.synthesis,
        mode: merged.mode,
    };

    let outcome = run_build(
        &settings,
        &FsCatalogSource::new(args.catalog.clone()),
        intent_port.as_ref(),
        tool_info(),
    )?;

    write_build_artifacts(&outcome, &settings.out_dir, &FsWritePort)
        .with_context(|| format!("write artifacts to {}", settings.out_dir))?;
    info!("wrote build artifacts to {}", settings.out_dir);

    println!("{}", summary_line(&outcome));

    if outcome.policy_block {
        return Err(ToolError::PolicyBlock);
    }
    Ok(())
}

fn summary_line(outcome: &BuildOutcome) -> String {
    let result = &outcome.result;
    let selected = result.order.len() - result.skipped_components.len();
    let verdict = match outcome.report.verdict.status {
        ReportStatus::Pass => "pass",
        ReportStatus::Warn => "warn",
        ReportStatus::Fail => "fail",
    };
    format!(
        "{} {}: total ${:.2} of ${:.2}, {} selected, {} skipped, verdict {}",
        result.build_id,
        result.profile_id,
        result.costs.total,
        result.costs.budget,
        selected,
        result.skipped_components.len(),
        verdict
    )
}

fn cmd_allocate(args: AllocateArgs) -> anyhow::Result<()> {
    let merged = merged_config(&args.tuning, None, false)?;
    let profile = intent_from_flags(&args.request)?.into_profile();
    if !profile.budget.is_finite() || profile.budget <= 0.0 {
        anyhow::bail!("budget must be a positive number, got {}", profile.budget);
    }

    let allocation = allocate(&profile, &merged.synthesis);

    match args.format {
        OutputFormat::Text => {
            println!(
                "Policy: {}  Tier: {}  Budget: {:.2}  Profile: {}\n",
                allocation.policy, allocation.tier, profile.budget, profile.id
            );
            println!("  {:<14} {:>6} {:>10}", "CATEGORY", "SHARE", "AMOUNT");
            println!("  {:<14} {:>6} {:>10}", "--------", "-----", "------");
            for entry in &allocation.entries {
                println!(
                    "  {:<14} {:>6} {:>10.2}",
                    entry.category.as_str(),
                    explain::format_fraction(entry.fraction),
                    entry.fraction * profile.budget
                );
            }
            let order: Vec<&str> = allocation.order.iter().map(|c| c.as_str()).collect();
            println!();
            println!("Resolution order: {}", order.join(" -> "));
        }
        OutputFormat::Json => {
            let entries: Vec<_> = allocation
                .entries
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "category": e.category,
                        "fraction": e.fraction,
                        "amount": e.fraction * profile.budget,
                        "required": e.required,
                    })
                })
                .collect();
            let doc = serde_json::json!({
                "profile_id": profile.id,
                "budget": profile.budget,
                "policy": allocation.policy,
                "tier": allocation.tier,
                "entries": entries,
                "order": allocation.order,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}

fn cmd_explain(args: ExplainArgs) -> anyhow::Result<()> {
    use explain::{critical_categories, format_fraction, list_policy_keys, lookup_policy, table};

    let Some(policy) = lookup_policy(&args.policy) else {
        let available = list_policy_keys().join(", ");
        anyhow::bail!(
            "Unknown policy: '{}'\n\nAvailable policies: {}",
            args.policy,
            available
        );
    };

    let triggers: Vec<&str> = policy.triggers.iter().map(|u| u.as_str()).collect();
    let critical: Vec<&str> = critical_categories(policy)
        .iter()
        .map(|c| c.as_str())
        .collect();

    println!("================================================================================");
    println!("POLICY: {}", policy.title);
    println!("================================================================================");
    println!();
    println!("Key:       {}", policy.kind);
    println!("Selected by: {}", triggers.join(", "));
    println!("Critical:  {}", critical.join(", "));
    println!();

    println!("DESCRIPTION");
    println!("--------------------------------------------------------------------------------");
    println!("{}", policy.description);
    println!();

    let variants: &[bool] = if policy.gaming_variant { &[false, true] } else { &[false] };
    for &with_gaming in variants {
        if with_gaming {
            println!("BUDGET SHARES (with gaming)");
        } else {
            println!("BUDGET SHARES");
        }
        println!("--------------------------------------------------------------------------------");
        println!("  {:<14} {:>6} {:>8} {:>6}", "CATEGORY", "LOW", "NORMAL", "HIGH");
        let tables: Vec<_> = [BudgetTier::Low, BudgetTier::Normal, BudgetTier::High]
            .into_iter()
            .map(|tier| table(policy, tier, with_gaming))
            .collect();
        for entry in &tables[0] {
            let share = |i: usize| {
                tables[i]
                    .iter()
                    .find(|e| e.category == entry.category)
                    .map(|e| format_fraction(e.fraction))
                    .unwrap_or_else(|| "-".to_string())
            };
            println!(
                "  {:<14} {:>6} {:>8} {:>6}",
                entry.category.as_str(),
                share(0),
                share(1),
                share(2)
            );
        }
        println!();
    }

    Ok(())
}

fn cmd_list_policies(args: ListPoliciesArgs) -> anyhow::Result<()> {
    use explain::POLICY_REGISTRY;

    match args.format {
        OutputFormat::Text => {
            println!("Available policies:\n");
            println!("  {:<12} {:<28} SELECTED BY", "KEY", "TITLE");
            println!("  {:<12} {:<28} -----------", "---", "-----");
            for policy in POLICY_REGISTRY {
                let triggers: Vec<&str> = policy.triggers.iter().map(|u| u.as_str()).collect();
                println!(
                    "  {:<12} {:<28} {}",
                    policy.kind.as_str(),
                    policy.title,
                    triggers.join(", ")
                );
            }
            println!();
            println!("Use 'rigforge explain <policy>' for details.");
        }
        OutputFormat::Json => {
            let policies: Vec<_> = POLICY_REGISTRY
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "key": p.kind,
                        "title": p.title,
                        "use_cases": p.triggers,
                        "critical": explain::critical_categories(p),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&policies)?);
        }
    }
    Ok(())
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "rigforge".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        commit: None,
    }
}
