use crate::allocation::{BudgetTier, CategoryBudgetEntry, PolicyKind};
use crate::category::Category;
use crate::item::CatalogItem;
use crate::profile::UseCase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything a caller gets back from one synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub schema: String,

    /// Deterministic id derived from the request and the chosen items.
    pub build_id: String,

    pub profile_id: String,

    #[serde(default)]
    pub use_cases: Vec<UseCase>,

    pub policy: PolicyKind,
    pub tier: BudgetTier,

    #[serde(default)]
    pub allocation: Vec<CategoryBudgetEntry>,

    /// Order in which categories were resolved.
    #[serde(default)]
    pub order: Vec<Category>,

    /// Keyed by slot name: `processor`, `memory`, `memory_2`, ...
    #[serde(default)]
    pub configuration: BTreeMap<String, ConfiguredItem>,

    pub costs: CostSummary,

    pub compatibility: CompatibilityReport,

    #[serde(default)]
    pub skipped_components: Vec<Category>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adjustments: Vec<Adjustment>,

    pub repair: RepairSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfiguredItem {
    pub item: CatalogItem,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub budget: f64,
    pub total: f64,
    pub remaining: f64,
    /// Total as a percentage of budget.
    pub compliance_percentage: f64,
    pub within_budget: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub is_valid: bool,

    #[serde(default)]
    pub errors: Vec<CompatibilityIssue>,

    #[serde(default)]
    pub warnings: Vec<CompatibilityIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityIssue {
    /// Stable machine-readable token, e.g. `socket_mismatch`.
    pub code: String,
    pub message: String,

    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Stable codes for compatibility issues.
pub mod issue_codes {
    pub const SOCKET_MISMATCH: &str = "socket_mismatch";
    pub const SOCKET_UNVERIFIED: &str = "socket_unverified";
    pub const RAM_TYPE_MISMATCH: &str = "ram_type_mismatch";
    pub const RAM_TYPE_UNVERIFIED: &str = "ram_type_unverified";
    pub const RAM_SLOTS_EXCEEDED: &str = "ram_slots_exceeded";
    pub const GPU_TOO_LONG: &str = "gpu_too_long";
    pub const PSU_INSUFFICIENT: &str = "psu_insufficient";
    pub const PSU_LOW_HEADROOM: &str = "psu_low_headroom";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// An already-selected anchor was replaced to unlock a blocked category.
    AnchorSwap,
    /// A selection was replaced by a cheaper one to bring the total under budget.
    Downgrade,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub kind: AdjustmentKind,
    pub category: Category,
    pub from_id: String,
    pub to_id: String,
    pub from_price: f64,
    pub to_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepairSummary {
    pub iterations: u32,
    /// Ceiling multiplier the loop tried to reach (`total <= budget * max_excess`).
    pub max_excess: f64,
    /// The loop stopped while still above the ceiling.
    pub residual_excess: bool,
}
