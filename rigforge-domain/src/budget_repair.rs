use crate::allocator::Allocation;
use crate::compat::filter_compatible;
use crate::error::SynthesisError;
use crate::ports::{ALL_CANDIDATES, CandidateOracle};
use crate::selector::is_performance_critical;
use crate::state::SelectionState;
use crate::tier::effective_tier;
use rigforge_types::result::{Adjustment, AdjustmentKind, RepairSummary};
use rigforge_types::{BudgetTier, Category, PerformanceTier, Profile};
use tracing::{debug, info};

/// Highest acceptable `total / budget` for a tier.
pub fn max_excess(tier: BudgetTier) -> f64 {
    match tier {
        BudgetTier::Low => 1.03,
        _ => 1.05,
    }
}

fn max_iterations(tier: BudgetTier) -> u32 {
    match tier {
        BudgetTier::Low => 8,
        _ => 5,
    }
}

/// Minimum price cut, relative to the current line price, for a swap that stays over
/// the category's allocation.
fn min_discount_factor(tier: BudgetTier) -> f64 {
    match tier {
        BudgetTier::Low => 0.80,
        _ => 0.85,
    }
}

/// Bounded post-selection downgrade loop.
pub struct BudgetRepairLoop<'a> {
    oracle: &'a dyn CandidateOracle,
    profile: &'a Profile,
    allocation: &'a Allocation,
}

impl<'a> BudgetRepairLoop<'a> {
    pub fn new(
        oracle: &'a dyn CandidateOracle,
        profile: &'a Profile,
        allocation: &'a Allocation,
    ) -> Self {
        Self {
            oracle,
            profile,
            allocation,
        }
    }

    pub fn run(
        &self,
        state: &mut SelectionState,
        adjustments: &mut Vec<Adjustment>,
    ) -> Result<RepairSummary, SynthesisError> {
        let tier = self.allocation.tier;
        let max_excess = max_excess(tier);
        let ceiling = self.profile.budget * max_excess;
        let cap = max_iterations(tier);

        let mut iterations = 0;
        while state.total() > ceiling && iterations < cap {
            iterations += 1;
            debug!(iteration = iterations, total = state.total(), ceiling, "budget repair pass");

            let mut swapped = false;
            for category in self.rank_by_overshoot(state) {
                if self.try_downgrade(state, category, adjustments)? {
                    swapped = true;
                    break;
                }
            }
            if !swapped {
                debug!(iteration = iterations, "no cheaper alternative, stopping");
                break;
            }
        }

        let residual_excess = state.total() > ceiling;
        if residual_excess {
            info!(total = state.total(), ceiling, iterations, "build still over budget after repair");
        }

        Ok(RepairSummary {
            iterations,
            max_excess,
            residual_excess,
        })
    }

    /// Selected categories by `(line price - allocated) / allocated`, largest first.
    /// Zero-allocation categories rank as 0.
    fn rank_by_overshoot(&self, state: &SelectionState) -> Vec<Category> {
        let budget = self.profile.budget;
        let mut ranked: Vec<(Category, f64)> = state
            .categories()
            .map(|category| {
                let allocated = self.allocation.allocated(category, budget);
                let ratio = if allocated > 0.0 {
                    (state.line_price(category) - allocated) / allocated
                } else {
                    0.0
                };
                (category, ratio)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.into_iter().map(|(c, _)| c).collect()
    }

    fn try_downgrade(
        &self,
        state: &mut SelectionState,
        category: Category,
        adjustments: &mut Vec<Adjustment>,
    ) -> Result<bool, SynthesisError> {
        let Some(current) = state.get(category).cloned() else {
            return Ok(false);
        };

        let critical = is_performance_critical(self.profile, category);
        if critical && effective_tier(&current).is_some_and(PerformanceTier::is_mid_or_above) {
            debug!(category = %category, id = %current.id, "keeping protected component");
            return Ok(false);
        }

        let inventory = self
            .oracle
            .recommend(&self.profile.id, category, ALL_CANDIDATES)
            .map_err(|source| SynthesisError::Oracle { category, source })?;
        let mut candidates = filter_compatible(&inventory, &state.without(category));
        if critical {
            candidates.retain(|c| effective_tier(c) != Some(PerformanceTier::Entry));
        }
        if self.allocation.is_low() {
            candidates.sort_by(|a, b| a.price.total_cmp(&b.price));
        }

        let line_price = state.line_price(category);
        let allocated = self.allocation.allocated(category, self.profile.budget);
        let discounted = line_price * min_discount_factor(self.allocation.tier);

        let Some(replacement) = candidates
            .into_iter()
            .find(|c| c.price < line_price && (c.price <= allocated || c.price < discounted))
        else {
            return Ok(false);
        };

        info!(
            category = %category,
            from = %current.id,
            to = %replacement.id,
            from_price = line_price,
            to_price = replacement.price,
            "downgraded to reduce total"
        );
        adjustments.push(Adjustment {
            kind: AdjustmentKind::Downgrade,
            category,
            from_id: current.id,
            to_id: replacement.id.clone(),
            from_price: line_price,
            to_price: replacement.price,
        });
        state.select(replacement);
        Ok(true)
    }
}
