use rigforge_types::{CatalogItem, PerformanceTier};

const ENTRY_LINES: &[&str] = &["RYZEN 3", "CORE I3", "ATHLON", "PENTIUM", "CELERON"];
const MID_LINES: &[&str] = &["RYZEN 5", "CORE I5"];
const HIGH_LINES: &[&str] = &["RYZEN 7", "RYZEN 9", "CORE I7", "CORE I9"];

/// Performance tier of an item: the declared tier if present, otherwise a guess from
/// well-known processor product line names. `None` when neither says anything.
pub fn effective_tier(item: &CatalogItem) -> Option<PerformanceTier> {
    item.declared_tier().or_else(|| tier_from_name(&item.name))
}

fn tier_from_name(name: &str) -> Option<PerformanceTier> {
    let upper = name.to_ascii_uppercase();
    let has = |lines: &[&str]| lines.iter().any(|l| upper.contains(l));

    if has(HIGH_LINES) {
        Some(PerformanceTier::High)
    } else if has(MID_LINES) {
        Some(PerformanceTier::Mid)
    } else if has(ENTRY_LINES) {
        Some(PerformanceTier::Entry)
    } else {
        None
    }
}

/// Disagreement between a declared tier and the name heuristic, if any.
///
/// Only used for diagnostics: the declared tier always wins.
pub(crate) fn tier_conflict(item: &CatalogItem) -> Option<(PerformanceTier, PerformanceTier)> {
    let declared = item.declared_tier()?;
    let guessed = tier_from_name(&item.name)?;
    let same_band = declared.is_mid_or_above() == guessed.is_mid_or_above();
    (!same_band).then_some((declared, guessed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigforge_types::item::{Features, ProcessorFeatures};

    fn cpu(name: &str, tier: Option<PerformanceTier>) -> CatalogItem {
        CatalogItem {
            id: name.to_string(),
            name: name.to_string(),
            brand: None,
            price: 200.0,
            predicted_rating: 4.0,
            ratings: Default::default(),
            features: Features::Processor(ProcessorFeatures {
                performance_tier: tier,
                ..Default::default()
            }),
        }
    }

    #[test]
    fn declared_tier_wins() {
        let item = cpu("AMD Ryzen 3 4100", Some(PerformanceTier::Mid));
        assert_eq!(effective_tier(&item), Some(PerformanceTier::Mid));
        assert_eq!(
            tier_conflict(&item),
            Some((PerformanceTier::Mid, PerformanceTier::Entry))
        );
    }

    #[test]
    fn name_fallback_covers_known_lines() {
        assert_eq!(effective_tier(&cpu("Intel Core i9-14900K", None)), Some(PerformanceTier::High));
        assert_eq!(effective_tier(&cpu("AMD Ryzen 5 7600", None)), Some(PerformanceTier::Mid));
        assert_eq!(effective_tier(&cpu("Intel Celeron G6900", None)), Some(PerformanceTier::Entry));
        assert_eq!(effective_tier(&cpu("Mystery Chip", None)), None);
    }

    #[test]
    fn same_band_is_not_a_conflict() {
        let item = cpu("AMD Ryzen 7 7700X", Some(PerformanceTier::Enthusiast));
        assert_eq!(tier_conflict(&item), None);
    }
}
