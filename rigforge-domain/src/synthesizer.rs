use crate::allocator::{Allocation, SynthesisConfig, allocate};
use crate::budget_repair::{BudgetRepairLoop, max_excess};
use crate::error::SynthesisError;
use crate::ports::CandidateOracle;
use crate::selector::ComponentSelector;
use crate::state::SelectionState;
use crate::tier::tier_conflict;
use crate::validator::validate;
use rigforge_types::result::{ConfiguredItem, CostSummary, SynthesisResult};
use rigforge_types::{Profile, schema};
use std::collections::BTreeMap;
use tracing::{info, warn};
use uuid::Uuid;

/// Drives one synthesis: allocate, resolve every category in order, repair the budget,
/// validate, assemble the result.
pub struct Synthesizer<O> {
    oracle: O,
    config: SynthesisConfig,
}

impl<O: CandidateOracle> Synthesizer<O> {
    pub fn new(oracle: O) -> Self {
        Self::with_config(oracle, SynthesisConfig::default())
    }

    pub fn with_config(oracle: O, config: SynthesisConfig) -> Self {
        Self { oracle, config }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    pub fn synthesize(&self, profile: &Profile) -> Result<SynthesisResult, SynthesisError> {
        if !profile.budget.is_finite() || profile.budget <= 0.0 {
            return Err(SynthesisError::InvalidProfile {
                reason: format!("budget must be a positive number, got {}", profile.budget),
            });
        }

        let allocation = allocate(profile, &self.config);
        let mut state = SelectionState::new();
        let mut adjustments = Vec::new();

        let selector = ComponentSelector::new(&self.oracle, profile, &allocation);
        for &category in &allocation.order {
            selector.resolve(&mut state, category, &mut adjustments)?;
        }

        let repair = BudgetRepairLoop::new(&self.oracle, profile, &allocation)
            .run(&mut state, &mut adjustments)?;

        for (_, item) in state.iter() {
            if let Some((declared, guessed)) = tier_conflict(item) {
                warn!(id = %item.id, ?declared, ?guessed, "declared tier disagrees with product name");
            }
        }

        let compatibility = validate(&state);
        let costs = costs(profile.budget, state.total(), &allocation);

        info!(
            profile = %profile.id,
            policy = %allocation.policy,
            tier = %allocation.tier,
            total = costs.total,
            budget = costs.budget,
            within_budget = costs.within_budget,
            valid = compatibility.is_valid,
            skipped = state.skipped().len(),
            "synthesis finished"
        );

        let configuration: BTreeMap<String, ConfiguredItem> = state
            .iter()
            .map(|(key, item)| {
                (
                    key.key_name(),
                    ConfiguredItem {
                        item: item.clone(),
                        quantity: 1,
                    },
                )
            })
            .collect();

        Ok(SynthesisResult {
            schema: schema::RIGFORGE_BUILD_V1.to_string(),
            build_id: build_id(profile, &state).to_string(),
            profile_id: profile.id.clone(),
            use_cases: profile.use_cases.iter().copied().collect(),
            policy: allocation.policy,
            tier: allocation.tier,
            allocation: allocation.entries.clone(),
            order: allocation.order.clone(),
            configuration,
            costs,
            compatibility,
            skipped_components: state.skipped().to_vec(),
            adjustments,
            repair,
        })
    }
}

fn costs(budget: f64, total: f64, allocation: &Allocation) -> CostSummary {
    CostSummary {
        budget,
        total,
        remaining: budget - total,
        compliance_percentage: total / budget * 100.0,
        within_budget: total <= budget * max_excess(allocation.tier),
    }
}

/// Deterministic id: v5 over the profile, budget and selected slots.
pub fn build_id(profile: &Profile, state: &SelectionState) -> Uuid {
    const NAMESPACE: Uuid = Uuid::from_bytes([
        0x9a, 0x1e, 0x5f, 0x20, 0x7c, 0x3b, 0x4e, 0x51, 0xb2, 0x0d, 0x61, 0x8f, 0x27, 0xc4, 0x93,
        0x0e,
    ]);

    let slots = state
        .iter()
        .map(|(key, item)| format!("{}={}", key, item.id))
        .collect::<Vec<_>>()
        .join(",");
    let stable_key = format!("{}|{}|{}", profile.id, profile.budget, slots);
    Uuid::new_v5(&NAMESPACE, stable_key.as_bytes())
}
