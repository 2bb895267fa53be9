//! Per-category choice.
//!
//! The selector pulls the full ranked inventory of a category, filters it against the
//! current selection, asks the repair coordinator for help when a required category is
//! blocked, then picks one item (or one dual memory kit) with a tier-dependent heuristic.

use crate::allocator::Allocation;
use crate::compat::filter_compatible;
use crate::error::SynthesisError;
use crate::ports::{ALL_CANDIDATES, CandidateOracle};
use crate::repair::RepairCoordinator;
use crate::state::SelectionState;
use crate::tier::effective_tier;
use rigforge_types::result::Adjustment;
use rigforge_types::{BudgetTier, CatalogItem, Category, Profile, UseCase};
use tracing::debug;

/// Rating floor for non-critical categories at a low budget.
const LOW_BUDGET_RATING_FLOOR: f64 = 2.5;
/// Unknown-tier items at or above this rating count as mid range.
const MID_RANGE_RATING_FLOOR: f64 = 3.0;
/// Memory capacity aimed for by creative builds at a high budget.
const CREATIVE_MEMORY_TARGET_GB: u32 = 32;
/// Combined-price allowance for a dual kit, relative to the memory allocation.
const DUAL_KIT_PRICE_FACTOR: f64 = 1.20;
/// Slot count assumed for a motherboard that does not declare one.
const DEFAULT_RAM_SLOTS: u32 = 4;

/// True when the use case asks for maximum rating in this category.
pub fn is_performance_critical(profile: &Profile, category: Category) -> bool {
    use Category::*;

    if profile.has(UseCase::Gaming) && matches!(category, Processor | Graphics) {
        true
    } else if profile.has(UseCase::Development) && matches!(category, Processor | Memory) {
        true
    } else if profile.is_creative() {
        matches!(category, Processor | Graphics | Memory | Storage)
    } else {
        category == Processor
    }
}

/// What the selector decided for a category.
#[derive(Debug, Clone, PartialEq)]
enum Choice {
    Single(CatalogItem),
    Pair(CatalogItem),
    Skip,
}

pub struct ComponentSelector<'a> {
    oracle: &'a dyn CandidateOracle,
    profile: &'a Profile,
    allocation: &'a Allocation,
}

impl<'a> ComponentSelector<'a> {
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

    /// Resolve one category into `state`: select it, or record it as skipped.
    pub fn resolve(
        &self,
        state: &mut SelectionState,
        category: Category,
        adjustments: &mut Vec<Adjustment>,
    ) -> Result<(), SynthesisError> {
        let budget = self.profile.budget;
        let allocated = self.allocation.allocated(category, budget);
        let ceiling = max_price(self.allocation.tier, category, allocated, budget - state.total());
        let required = self.allocation.is_required(category);

        let inventory = self
            .oracle
            .recommend(&self.profile.id, category, ALL_CANDIDATES)
            .map_err(|source| SynthesisError::Oracle { category, source })?;
        let inventory_len = inventory.len();

        let mut compatible = filter_compatible(&inventory, state);
        if compatible.is_empty() && required {
            debug!(category = %category, inventory = inventory_len, "no compatible candidate, trying anchor swap");
            compatible = RepairCoordinator::new(self.oracle, &self.profile.id)
                .unlock(state, category, &inventory, adjustments)?;
        }

        if compatible.is_empty() {
            debug!(category = %category, inventory = inventory_len, "skipped: nothing compatible");
            state.skip(category);
            return Ok(());
        }

        let affordable = affordable(&compatible, allocated, ceiling, self.allocation.tier);
        let choice = if affordable.is_empty() {
            self.fallback(&compatible, required)
        } else {
            self.choose(category, affordable, state, allocated)
        };

        match choice {
            Choice::Single(item) => {
                debug!(
                    category = %category,
                    id = %item.id,
                    price = item.price,
                    rating = item.predicted_rating,
                    allocated,
                    ceiling,
                    "selected"
                );
                state.select(item);
            }
            Choice::Pair(item) => {
                debug!(
                    category = %category,
                    id = %item.id,
                    price = item.price * 2.0,
                    allocated,
                    "selected dual kit"
                );
                state.select_pair(item);
            }
            Choice::Skip => {
                debug!(category = %category, allocated, "skipped: nothing affordable");
                state.skip(category);
            }
        }
        Ok(())
    }

    /// Nothing fits the ceiling. A required category takes the cheapest compatible item
    /// if it stays within a looser budget-wide tolerance.
    fn fallback(&self, compatible: &[CatalogItem], required: bool) -> Choice {
        if !required {
            return Choice::Skip;
        }
        let limit = self.profile.budget
            * match self.allocation.tier {
                BudgetTier::Low => 1.05,
                _ => 1.15,
            };
        match cheapest(compatible.iter()) {
            Some(item) if item.price <= limit => Choice::Single(item.clone()),
            _ => Choice::Skip,
        }
    }

    fn choose(
        &self,
        category: Category,
        affordable: Vec<CatalogItem>,
        state: &SelectionState,
        allocated: f64,
    ) -> Choice {
        let high = self.allocation.is_high();

        let pick = if !is_performance_critical(self.profile, category) {
            self.pick_non_critical(&affordable)
        } else if matches!(category, Category::Processor | Category::Graphics)
            && (self.profile.has(UseCase::Gaming) || high)
        {
            self.pick_screened(category, &affordable)
        } else if category == Category::Memory && high && self.profile.is_creative() {
            return self.pick_memory_ladder(&affordable, state, allocated);
        } else {
            pick_top_rated(&affordable, high)
        };

        pick.or_else(|| best_rated(affordable.iter()).cloned())
            .map(Choice::Single)
            .unwrap_or(Choice::Skip)
    }

    fn pick_non_critical(&self, affordable: &[CatalogItem]) -> Option<CatalogItem> {
        let pick = if self.allocation.is_low() {
            let quality: Vec<&CatalogItem> = affordable
                .iter()
                .filter(|c| c.predicted_rating >= LOW_BUDGET_RATING_FLOOR)
                .collect();
            if quality.is_empty() {
                best_rated(affordable.iter())
            } else {
                cheapest(quality.into_iter())
            }
        } else {
            cheapest(within(affordable, 0.90).into_iter())
        };
        pick.cloned()
    }

    /// Processor and graphics for gaming or rich builds: screen out entry-level lines.
    fn pick_screened(&self, category: Category, affordable: &[CatalogItem]) -> Option<CatalogItem> {
        let high = self.allocation.is_high();
        let mid_range = mid_range(affordable);

        if category == Category::Processor && (high || self.profile.high_performance) {
            let high_end: Vec<CatalogItem> = affordable
                .iter()
                .filter(|c| effective_tier(c).is_some_and(|t| t.is_high_end()))
                .cloned()
                .collect();
            let pick = if !high_end.is_empty() {
                most_expensive(within(&high_end, 0.98).into_iter())
            } else if !mid_range.is_empty() {
                most_expensive(within(&mid_range, 0.95).into_iter())
            } else {
                most_expensive(within(affordable, 0.95).into_iter())
            };
            return pick.cloned();
        }

        let (pool, tolerance) = if mid_range.is_empty() {
            (affordable, 0.95)
        } else {
            (mid_range.as_slice(), if high { 0.98 } else { 0.95 })
        };
        let top = within(pool, tolerance);
        let pick = if high {
            best_rated(top.into_iter())
        } else {
            cheapest(top.into_iter())
        };
        pick.cloned()
    }

    /// Creative memory at a high budget: one big module, else a dual kit of half-size
    /// modules, else the largest modules available.
    fn pick_memory_ladder(
        &self,
        affordable: &[CatalogItem],
        state: &SelectionState,
        allocated: f64,
    ) -> Choice {
        let target = CREATIVE_MEMORY_TARGET_GB;

        let big: Vec<CatalogItem> = affordable
            .iter()
            .filter(|c| capacity_gb(c) >= target)
            .cloned()
            .collect();
        if let Some(item) = most_expensive(within(&big, 0.98).into_iter()) {
            return Choice::Single(item.clone());
        }

        if let Some(item) = dual_kit(affordable, state, allocated, target / 2) {
            return Choice::Pair(item);
        }

        let large: Vec<CatalogItem> = affordable
            .iter()
            .filter(|c| capacity_gb(c) >= target / 2)
            .cloned()
            .collect();
        let pool = if large.is_empty() {
            affordable
        } else {
            large.as_slice()
        };
        pick_top_rated(pool, true)
            .or_else(|| best_rated(pool.iter()).cloned())
            .map(Choice::Single)
            .unwrap_or(Choice::Skip)
    }
}

/// Ceiling for one category: a tier-dependent allowance over its allocation, capped by
/// what is left of the budget.
fn max_price(tier: BudgetTier, category: Category, allocated: f64, remaining: f64) -> f64 {
    let (over_allocation, over_remaining) = match tier {
        BudgetTier::Low => (1.05, 1.02),
        BudgetTier::Normal => (1.10, 1.05),
        BudgetTier::High => {
            let critical = matches!(
                category,
                Category::Processor | Category::Graphics | Category::Memory
            );
            (if critical { 1.20 } else { 1.15 }, 1.10)
        }
    };
    (allocated * over_allocation).min(remaining * over_remaining)
}

/// Within allocation if possible, else within the ceiling. Low budgets first try a 3%
/// allowance and then prefer the cheapest items under the ceiling.
fn affordable(
    compatible: &[CatalogItem],
    allocated: f64,
    ceiling: f64,
    tier: BudgetTier,
) -> Vec<CatalogItem> {
    let under = |limit: f64| -> Vec<CatalogItem> {
        compatible
            .iter()
            .filter(|c| c.price <= limit)
            .cloned()
            .collect()
    };

    let in_allocation = under(allocated);
    if !in_allocation.is_empty() {
        return in_allocation;
    }

    if tier == BudgetTier::Low {
        let strict = under(allocated * 1.03);
        if !strict.is_empty() {
            return strict;
        }
        let mut wide = under(ceiling);
        wide.sort_by(|a, b| a.price.total_cmp(&b.price));
        return wide;
    }

    under(ceiling)
}

fn dual_kit(
    affordable: &[CatalogItem],
    state: &SelectionState,
    allocated: f64,
    module_gb: u32,
) -> Option<CatalogItem> {
    let mb = state.get(Category::Motherboard)?;
    let slots = match mb.motherboard().and_then(|f| f.ram_slots) {
        Some(slots) if slots > 0 => slots as usize,
        _ => DEFAULT_RAM_SLOTS as usize,
    };
    let free = slots.saturating_sub(state.count(Category::Memory));
    if free < 2 {
        return None;
    }

    let kits: Vec<CatalogItem> = affordable
        .iter()
        .filter(|c| capacity_gb(c) == module_gb)
        .filter(|c| c.price * 2.0 <= allocated * DUAL_KIT_PRICE_FACTOR)
        .cloned()
        .collect();
    most_expensive(within(&kits, 0.98).into_iter()).cloned()
}

/// Critical-category default: near-top rating, then the pricier pick for rich builds and
/// the cheapest one otherwise.
fn pick_top_rated(pool: &[CatalogItem], high: bool) -> Option<CatalogItem> {
    let top = within(pool, if high { 0.98 } else { 0.95 });
    let pick = if high {
        best_rated(top.iter().copied()).and_then(|best| {
            let floor = rating_floor(best.predicted_rating, 0.99);
            most_expensive(top.iter().copied().filter(|c| c.predicted_rating >= floor))
        })
    } else {
        cheapest(top.into_iter())
    };
    pick.cloned()
}

fn mid_range(items: &[CatalogItem]) -> Vec<CatalogItem> {
    items
        .iter()
        .filter(|c| match effective_tier(c) {
            Some(t) => t.is_mid_or_above(),
            None => c.predicted_rating >= MID_RANGE_RATING_FLOOR,
        })
        .cloned()
        .collect()
}

/// Items rated within `1 - tolerance` of the best rating, in input order. Never empty
/// for a non-empty input.
fn within(items: &[CatalogItem], tolerance: f64) -> Vec<&CatalogItem> {
    let Some(best) = best_rated(items.iter()) else {
        return Vec::new();
    };
    let floor = rating_floor(best.predicted_rating, tolerance);
    items.iter().filter(|c| c.predicted_rating >= floor).collect()
}

/// Lower edge of a relative rating band. Stays at or below `best` for negative ratings.
fn rating_floor(best: f64, tolerance: f64) -> f64 {
    best - best.abs() * (1.0 - tolerance)
}

// The pickers keep the first item on ties so results follow the oracle's rank order.

fn best_rated<'i>(items: impl Iterator<Item = &'i CatalogItem>) -> Option<&'i CatalogItem> {
    items.fold(None, |best, c| match best {
        Some(b) if b.predicted_rating >= c.predicted_rating => Some(b),
        _ => Some(c),
    })
}

fn cheapest<'i>(items: impl Iterator<Item = &'i CatalogItem>) -> Option<&'i CatalogItem> {
    items.fold(None, |best, c| match best {
        Some(b) if b.price <= c.price => Some(b),
        _ => Some(c),
    })
}

fn most_expensive<'i>(items: impl Iterator<Item = &'i CatalogItem>) -> Option<&'i CatalogItem> {
    items.fold(None, |best, c| match best {
        Some(b) if b.price >= c.price => Some(b),
        _ => Some(c),
    })
}

/// Declared capacity, else the first whole number followed by `GB` in the product name.
fn capacity_gb(item: &CatalogItem) -> u32 {
    if let Some(cap) = item.memory().and_then(|m| m.capacity_gb) {
        return cap;
    }
    let name = item.name.to_ascii_uppercase().replace(' ', "");
    name.match_indices("GB")
        .find_map(|(at, _)| {
            let digits = name[..at]
                .chars()
                .rev()
                .take_while(char::is_ascii_digit)
                .count();
            name[at - digits..at].parse::<u32>().ok()
        })
        .unwrap_or(0)
}
