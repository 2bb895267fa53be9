use crate::compat::{filter_compatible, is_compatible};
use crate::error::SynthesisError;
use crate::ports::{ALL_CANDIDATES, CandidateOracle};
use crate::state::SelectionState;
use rigforge_types::result::{Adjustment, AdjustmentKind};
use rigforge_types::{CatalogItem, Category};
use tracing::{debug, info};

/// One-step backtracking over the anchor categories.
///
/// When a required category has no compatible candidate because of an anchor that is
/// already selected, the coordinator tries the anchor's alternatives (best-rated first)
/// and commits the first one that is itself compatible with the rest of the build and
/// lets at least one target candidate through.
pub struct RepairCoordinator<'a> {
    oracle: &'a dyn CandidateOracle,
    profile_id: &'a str,
}

impl<'a> RepairCoordinator<'a> {
    pub fn new(oracle: &'a dyn CandidateOracle, profile_id: &'a str) -> Self {
        Self { oracle, profile_id }
    }

    /// Returns the target candidates unlocked by the committed swap, or an empty list
    /// (and an untouched `state`) when no swap helps.
    pub fn unlock(
        &self,
        state: &mut SelectionState,
        target: Category,
        target_inventory: &[CatalogItem],
        adjustments: &mut Vec<Adjustment>,
    ) -> Result<Vec<CatalogItem>, SynthesisError> {
        if target_inventory.is_empty() {
            return Ok(Vec::new());
        }

        for &anchor in anchors_of(target) {
            let Some(current) = state.get(anchor).cloned() else {
                continue;
            };

            let alternatives = self
                .oracle
                .recommend(self.profile_id, anchor, ALL_CANDIDATES)
                .map_err(|source| SynthesisError::Oracle {
                    category: anchor,
                    source,
                })?;

            let rest = state.without(anchor);
            for candidate in alternatives {
                if candidate.id == current.id || !is_compatible(&candidate, &rest) {
                    continue;
                }

                let mut trial = rest.clone();
                trial.select(candidate.clone());
                let unlocked = filter_compatible(target_inventory, &trial);
                if unlocked.is_empty() {
                    continue;
                }

                info!(
                    target = %target,
                    anchor = %anchor,
                    from = %current.id,
                    to = %candidate.id,
                    unlocked = unlocked.len(),
                    "swapped anchor to unlock category"
                );
                adjustments.push(Adjustment {
                    kind: AdjustmentKind::AnchorSwap,
                    category: anchor,
                    from_id: current.id.clone(),
                    to_id: candidate.id.clone(),
                    from_price: state.line_price(anchor),
                    to_price: candidate.price,
                });
                *state = trial;
                return Ok(unlocked);
            }
        }

        debug!(target = %target, "no anchor swap unlocks a candidate");
        Ok(Vec::new())
    }
}

/// Anchors whose choice can block `target`.
fn anchors_of(target: Category) -> &'static [Category] {
    match target {
        Category::Processor | Category::Memory => &[Category::Motherboard],
        Category::Motherboard => &[Category::Processor, Category::Memory],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use rigforge_types::PerformanceTier::Mid;

    #[test]
    fn swaps_motherboard_to_unlock_memory() {
        let oracle = FixtureOracle::new(vec![
            board("mb-ddr4", 150.0, 4.9, "AM5", "DDR4"),
            board("mb-ddr5", 180.0, 4.5, "AM5", "DDR5"),
            board("mb-wrong-socket", 120.0, 4.7, "LGA1700", "DDR5"),
        ]);
        let memory = vec![ram("ram-ddr5", 90.0, 4.6, "DDR5", 16)];

        let mut state = SelectionState::new();
        state.select(board("mb-ddr4", 150.0, 4.9, "AM5", "DDR4"));
        state.select(cpu("cpu", 250.0, 4.5, "AM5", Mid));

        let mut adjustments = Vec::new();
        let unlocked = RepairCoordinator::new(&oracle, "p")
            .unlock(&mut state, Category::Memory, &memory, &mut adjustments)
            .expect("unlock");

        assert_eq!(unlocked.len(), 1);
        // the LGA1700 board would unlock DDR5 too but clashes with the selected processor
        assert_eq!(state.get(Category::Motherboard).map(|m| m.id.as_str()), Some("mb-ddr5"));
        assert_eq!(adjustments.len(), 1);
        assert_eq!(adjustments[0].kind, AdjustmentKind::AnchorSwap);
        assert_eq!(adjustments[0].from_id, "mb-ddr4");
        assert_eq!(state.total(), 430.0);
    }

    #[test]
    fn leaves_state_untouched_when_nothing_helps() {
        let oracle = FixtureOracle::new(vec![board("mb-ddr4", 150.0, 4.9, "AM5", "DDR4")]);
        let memory = vec![ram("ram-ddr5", 90.0, 4.6, "DDR5", 16)];

        let mut state = SelectionState::new();
        state.select(board("mb-ddr4", 150.0, 4.9, "AM5", "DDR4"));
        let before = state.clone();

        let mut adjustments = Vec::new();
        let unlocked = RepairCoordinator::new(&oracle, "p")
            .unlock(&mut state, Category::Memory, &memory, &mut adjustments)
            .expect("unlock");

        assert!(unlocked.is_empty());
        assert!(adjustments.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn non_anchor_targets_are_not_repaired() {
        let mut state = SelectionState::new();
        let unlocked = RepairCoordinator::new(&BrokenOracle, "p")
            .unlock(&mut state, Category::Case, &[case("c", 50.0, 4.0)], &mut Vec::new())
            .expect("no oracle call");
        assert!(unlocked.is_empty());
    }
}
