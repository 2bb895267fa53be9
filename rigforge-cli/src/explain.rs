//! Policy explanations for the `rigforge explain` and `list-policies` commands.
//!
//! The fractions shown are the allocator's own tables, so the text cannot drift
//! from what a build actually uses.

use rigforge_domain::{is_performance_critical, policy_table};
use rigforge_types::{BudgetTier, Category, CategoryBudgetEntry, PolicyKind, Profile, UseCase};

/// Information about one allocation policy.
#[derive(Debug, Clone)]
pub struct PolicyExplanation {
    pub kind: PolicyKind,
    /// Human-readable title.
    pub title: &'static str,
    /// Use cases that select this policy.
    pub triggers: &'static [UseCase],
    pub description: &'static str,
    /// Whether the table changes when gaming is also requested.
    pub gaming_variant: bool,
}

/// Registry of all allocation policies, in precedence order.
pub static POLICY_REGISTRY: &[PolicyExplanation] = &[
    PolicyExplanation {
        kind: PolicyKind::Creative,
        title: "Creative Workstation",
        triggers: &[UseCase::Design, UseCase::VideoEditing],
        description: r#"Chosen whenever design or video editing is requested, even alongside gaming.

Graphics, processor and memory carry most of the budget. At high budgets memory aims
for 32 GB: a single large module if one is affordable, otherwise a matched pair of
16 GB modules when the board has two free slots. Storage is also treated as critical
and is picked from the top-rated candidates rather than the cheapest acceptable one.

When gaming is requested too, graphics takes a larger share at the expense of memory."#,
        gaming_variant: true,
    },
    PolicyExplanation {
        kind: PolicyKind::Gaming,
        title: "Gaming",
        triggers: &[UseCase::Gaming],
        description: r#"Graphics first, processor second.

Processor and graphics candidates are screened to mid-range or better before the
cheapest near-top-rated item is taken. At high budgets (or when high performance is
requested) the processor screen prefers high-end parts and the pricier of the
near-top candidates."#,
        gaming_variant: false,
    },
    PolicyExplanation {
        kind: PolicyKind::Development,
        title: "Development",
        triggers: &[UseCase::Development],
        description: r#"Processor and memory first, no discrete graphics.

The graphics category is not part of this policy and never appears in the build.
Processor and memory are picked from the top-rated candidates, and a mid-range or
better processor is never downgraded to fit the budget."#,
        gaming_variant: false,
    },
    PolicyExplanation {
        kind: PolicyKind::Office,
        title: "Office / General",
        triggers: &[UseCase::Office, UseCase::Streaming],
        description: r#"Fallback policy for office work, streaming and requests with no use case.

No discrete graphics. Only the processor is treated as performance-critical; every
other category takes the cheapest item that clears the rating floor (low budgets)
or sits close to the best rating (otherwise)."#,
        gaming_variant: false,
    },
];

/// Look up a policy by name, case-insensitively. Use-case names resolve to the policy
/// they select on their own.
pub fn lookup_policy(query: &str) -> Option<&'static PolicyExplanation> {
    let norm = query.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    if let Some(found) = POLICY_REGISTRY.iter().find(|p| p.kind.as_str() == norm) {
        return Some(found);
    }
    let use_case: UseCase = norm.parse().ok()?;
    POLICY_REGISTRY
        .iter()
        .find(|p| p.triggers.contains(&use_case))
}

/// List all policy keys.
pub fn list_policy_keys() -> Vec<&'static str> {
    POLICY_REGISTRY.iter().map(|p| p.kind.as_str()).collect()
}

/// The allocator's table for a policy and tier.
pub fn table(policy: &PolicyExplanation, tier: BudgetTier, with_gaming: bool) -> Vec<CategoryBudgetEntry> {
    policy_table(policy.kind, tier, with_gaming)
}

/// Categories the selector treats as performance-critical under this policy.
pub fn critical_categories(policy: &PolicyExplanation) -> Vec<Category> {
    let profile = Profile::new("explain", 1.0).with_use_cases(policy.triggers.iter().copied());
    Category::ALL
        .into_iter()
        .filter(|c| is_performance_critical(&profile, *c))
        .collect()
}

/// Format a budget share for display.
pub fn format_fraction(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}
