use rigforge_types::{
    BudgetTier, Category, CategoryBudgetEntry, PolicyKind, Profile, UseCase,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use Category::{Case, Graphics, Memory, Motherboard, PowerSupply, Processor, Storage};

/// Budget thresholds that split requests into tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Budgets strictly below this are [`BudgetTier::Low`].
    pub low_budget_below: f64,
    /// Budgets strictly above this are [`BudgetTier::High`].
    pub high_budget_above: f64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            low_budget_below: 1200.0,
            high_budget_above: 3000.0,
        }
    }
}

impl SynthesisConfig {
    pub fn tier(&self, budget: f64) -> BudgetTier {
        if budget < self.low_budget_below {
            BudgetTier::Low
        } else if budget > self.high_budget_above {
            BudgetTier::High
        } else {
            BudgetTier::Normal
        }
    }
}

/// Output of the budget allocator for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub policy: PolicyKind,
    pub tier: BudgetTier,
    /// One entry per category the policy resolves, in table order.
    pub entries: Vec<CategoryBudgetEntry>,
    /// Category resolution order.
    pub order: Vec<Category>,
}

impl Allocation {
    pub fn entry(&self, category: Category) -> Option<&CategoryBudgetEntry> {
        self.entries.iter().find(|e| e.category == category)
    }

    pub fn fraction(&self, category: Category) -> f64 {
        self.entry(category).map(|e| e.fraction).unwrap_or(0.0)
    }

    pub fn allocated(&self, category: Category, budget: f64) -> f64 {
        budget * self.fraction(category)
    }

    pub fn is_required(&self, category: Category) -> bool {
        self.entry(category).map(|e| e.required).unwrap_or(false)
    }

    pub fn required(&self) -> impl Iterator<Item = Category> + '_ {
        self.entries.iter().filter(|e| e.required).map(|e| e.category)
    }

    pub fn is_low(&self) -> bool {
        self.tier == BudgetTier::Low
    }

    pub fn is_high(&self) -> bool {
        self.tier == BudgetTier::High
    }
}

/// Dominant use case. Creative work wins over gaming so that a mixed
/// design+gaming request gets the creative table with its gaming variant.
pub fn policy_for(use_cases: &BTreeSet<UseCase>) -> PolicyKind {
    if use_cases.contains(&UseCase::Design) || use_cases.contains(&UseCase::VideoEditing) {
        PolicyKind::Creative
    } else if use_cases.contains(&UseCase::Gaming) {
        PolicyKind::Gaming
    } else if use_cases.contains(&UseCase::Development) {
        PolicyKind::Development
    } else {
        PolicyKind::Office
    }
}

pub fn allocate(profile: &Profile, config: &SynthesisConfig) -> Allocation {
    let policy = policy_for(&profile.use_cases);
    let tier = config.tier(profile.budget);
    let entries = policy_table(policy, tier, profile.has(UseCase::Gaming));
    let order = resolution_order(&entries, &profile.priorities);

    tracing::debug!(
        policy = %policy,
        tier = %tier,
        budget = profile.budget,
        order = ?order,
        "allocated budget"
    );

    Allocation {
        policy,
        tier,
        entries,
        order,
    }
}

/// Fraction table of a policy. Every category listed is required; categories a policy
/// leaves out (graphics for office and development) are never resolved.
pub fn policy_table(policy: PolicyKind, tier: BudgetTier, with_gaming: bool) -> Vec<CategoryBudgetEntry> {
    raw_table(policy, tier, with_gaming)
        .iter()
        .map(|&(category, fraction)| CategoryBudgetEntry {
            category,
            fraction,
            required: true,
        })
        .collect()
}

fn raw_table(policy: PolicyKind, tier: BudgetTier, with_gaming: bool) -> &'static [(Category, f64)] {
    match (policy, tier) {
        (PolicyKind::Gaming, BudgetTier::Low) => &[
            (Graphics, 0.38),
            (Processor, 0.25),
            (Motherboard, 0.10),
            (Memory, 0.12),
            (Storage, 0.10),
            (PowerSupply, 0.04),
            (Case, 0.01),
        ],
        (PolicyKind::Gaming, BudgetTier::Normal) => &[
            (Graphics, 0.42),
            (Processor, 0.28),
            (Motherboard, 0.10),
            (Memory, 0.10),
            (Storage, 0.06),
            (PowerSupply, 0.03),
            (Case, 0.01),
        ],
        (PolicyKind::Gaming, BudgetTier::High) => &[
            (Graphics, 0.45),
            (Processor, 0.28),
            (Motherboard, 0.09),
            (Memory, 0.09),
            (Storage, 0.05),
            (PowerSupply, 0.03),
            (Case, 0.01),
        ],

        (PolicyKind::Development, BudgetTier::Low) => &[
            (Processor, 0.35),
            (Memory, 0.25),
            (Storage, 0.15),
            (Motherboard, 0.12),
            (PowerSupply, 0.10),
            (Case, 0.03),
        ],
        (PolicyKind::Development, BudgetTier::Normal) => &[
            (Processor, 0.40),
            (Memory, 0.25),
            (Storage, 0.15),
            (Motherboard, 0.12),
            (PowerSupply, 0.06),
            (Case, 0.02),
        ],
        (PolicyKind::Development, BudgetTier::High) => &[
            (Processor, 0.40),
            (Memory, 0.27),
            (Storage, 0.15),
            (Motherboard, 0.10),
            (PowerSupply, 0.06),
            (Case, 0.02),
        ],

        (PolicyKind::Creative, BudgetTier::Low) if with_gaming => &[
            (Graphics, 0.35),
            (Processor, 0.25),
            (Memory, 0.20),
            (Motherboard, 0.10),
            (Storage, 0.08),
            (PowerSupply, 0.02),
            (Case, 0.0),
        ],
        (PolicyKind::Creative, BudgetTier::Low) => &[
            (Graphics, 0.30),
            (Processor, 0.27),
            (Memory, 0.23),
            (Motherboard, 0.10),
            (Storage, 0.08),
            (PowerSupply, 0.02),
            (Case, 0.0),
        ],
        (PolicyKind::Creative, BudgetTier::Normal) if with_gaming => &[
            (Graphics, 0.40),
            (Processor, 0.30),
            (Memory, 0.18),
            (Motherboard, 0.08),
            (Storage, 0.04),
            (PowerSupply, 0.0),
            (Case, 0.0),
        ],
        (PolicyKind::Creative, BudgetTier::Normal) => &[
            (Graphics, 0.35),
            (Processor, 0.32),
            (Memory, 0.21),
            (Motherboard, 0.08),
            (Storage, 0.04),
            (PowerSupply, 0.0),
            (Case, 0.0),
        ],
        // The fixed-cost parts get nothing; they are resolved through the
        // required-category fallback.
        (PolicyKind::Creative, BudgetTier::High) if with_gaming => &[
            (Graphics, 0.40),
            (Processor, 0.35),
            (Memory, 0.25),
            (Motherboard, 0.0),
            (Storage, 0.0),
            (PowerSupply, 0.0),
            (Case, 0.0),
        ],
        (PolicyKind::Creative, BudgetTier::High) => &[
            (Graphics, 0.37),
            (Processor, 0.38),
            (Memory, 0.25),
            (Motherboard, 0.0),
            (Storage, 0.0),
            (PowerSupply, 0.0),
            (Case, 0.0),
        ],

        (PolicyKind::Office, BudgetTier::Low) => &[
            (Processor, 0.35),
            (Memory, 0.20),
            (Motherboard, 0.12),
            (Storage, 0.15),
            (PowerSupply, 0.10),
            (Case, 0.08),
        ],
        (PolicyKind::Office, _) => &[
            (Processor, 0.40),
            (Memory, 0.22),
            (Motherboard, 0.18),
            (Storage, 0.12),
            (PowerSupply, 0.06),
            (Case, 0.02),
        ],
    }
}

/// Anchors first (motherboard, processor, memory), then declared priorities, then the
/// rest in table order. Only categories present in the table are ordered.
fn resolution_order(entries: &[CategoryBudgetEntry], priorities: &[Category]) -> Vec<Category> {
    let in_table = |c: &Category| entries.iter().any(|e| e.category == *c);
    let mut order: Vec<Category> = Vec::with_capacity(entries.len());

    let anchors = Category::ANCHORS.iter();
    let rest = entries.iter().map(|e| &e.category);
    for c in anchors.chain(priorities.iter()).chain(rest) {
        if in_table(c) && !order.contains(c) {
            order.push(*c);
        }
    }
    order
}
