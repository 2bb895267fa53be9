//! Configuration file loading for rigforge.
//!
//! Discovers and loads `rigforge.toml` from the working directory.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use rigforge_core::settings::RunMode;
use rigforge_domain::SynthesisConfig;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "rigforge.toml";

/// Default output directory when neither the file nor the CLI names one.
pub const DEFAULT_OUT_DIR: &str = "artifacts/rigforge";

/// Top-level configuration from rigforge.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RigforgeConfig {
    /// Budget tier thresholds.
    pub thresholds: ThresholdsConfig,

    /// Artifact output settings.
    pub output: OutputConfig,

    /// Exit-code behaviour.
    pub run: RunConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdsConfig {
    /// Budgets strictly below this use the low-budget rules.
    pub low_budget_below: Option<f64>,

    /// Budgets strictly above this use the high-budget rules.
    pub high_budget_above: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Treat over-budget, incompatible or incomplete builds as a policy block.
    pub strict: bool,
}

/// Discover the rigforge.toml config file in `root`.
///
/// Returns `None` if no config file is found.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a rigforge.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<RigforgeConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<RigforgeConfig> {
    let config: RigforgeConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load the explicit config file if given, else discover one in `root`, else defaults.
pub fn load_or_default(explicit: Option<&Utf8Path>, root: &Utf8Path) -> anyhow::Result<RigforgeConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(RigforgeConfig::default()),
    }
}

/// Values given on the command line. `None` / `false` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub low_budget_below: Option<f64>,
    pub high_budget_above: Option<f64>,
    pub out_dir: Option<Utf8PathBuf>,
    pub strict: bool,
}

/// Merged configuration combining config file and CLI arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedConfig {
    pub synthesis: SynthesisConfig,
    pub out_dir: Utf8PathBuf,
    pub mode: RunMode,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: RigforgeConfig,
}

impl ConfigMerger {
    /// Create a new merger from a loaded config.
    pub fn new(config: RigforgeConfig) -> Self {
        Self { config }
    }

    /// Merge with CLI arguments.
    ///
    /// Thresholds and the output dir given on the CLI replace the file values.
    /// `--strict` turns strict mode on; it cannot turn a strict config off.
    pub fn merge(self, cli: &CliOverrides) -> anyhow::Result<MergedConfig> {
        let defaults = SynthesisConfig::default();
        let synthesis = SynthesisConfig {
            low_budget_below: cli
                .low_budget_below
                .or(self.config.thresholds.low_budget_below)
                .unwrap_or(defaults.low_budget_below),
            high_budget_above: cli
                .high_budget_above
                .or(self.config.thresholds.high_budget_above)
                .unwrap_or(defaults.high_budget_above),
        };
        validate_thresholds(&synthesis)?;

        let out_dir = cli
            .out_dir
            .clone()
            .or(self.config.output.dir)
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUT_DIR));

        let mode = if cli.strict || self.config.run.strict {
            RunMode::Strict
        } else {
            RunMode::Advisory
        };

        Ok(MergedConfig {
            synthesis,
            out_dir,
            mode,
        })
    }
}

fn validate_thresholds(config: &SynthesisConfig) -> anyhow::Result<()> {
    let SynthesisConfig {
        low_budget_below: low,
        high_budget_above: high,
    } = *config;
    if !low.is_finite() || !high.is_finite() || low <= 0.0 || high <= 0.0 {
        anyhow::bail!("budget thresholds must be positive numbers (low {low}, high {high})");
    }
    if low > high {
        anyhow::bail!("low_budget_below ({low}) must not exceed high_budget_above ({high})");
    }
    Ok(())
}
