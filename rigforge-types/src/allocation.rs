use crate::category::Category;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Share of the total budget assigned to one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryBudgetEntry {
    pub category: Category,
    pub fraction: f64,
    /// The build is incomplete if this category ends up skipped.
    pub required: bool,
}

/// Spending band of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetTier {
    Low,
    Normal,
    High,
}

impl BudgetTier {
    pub fn as_str(self) -> &'static str {
        match self {
            BudgetTier::Low => "low",
            BudgetTier::Normal => "normal",
            BudgetTier::High => "high",
        }
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named allocation policy, chosen by the dominant use case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Gaming,
    Development,
    Creative,
    Office,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::Gaming,
        PolicyKind::Development,
        PolicyKind::Creative,
        PolicyKind::Office,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Gaming => "gaming",
            PolicyKind::Development => "development",
            PolicyKind::Creative => "creative",
            PolicyKind::Office => "office",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
