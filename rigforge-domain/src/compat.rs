//! Pairwise compatibility rules between categories.
//!
//! Every rule is checked from both sides: a candidate is compared with whatever is
//! already selected on the other side of each rule it takes part in. Rules whose other
//! side is not selected yet are not evaluated.

use crate::state::SelectionState;
use rigforge_types::{CatalogItem, Category};

/// Assumed processor draw when no processor (or no TDP) is known.
pub(crate) const DEFAULT_PROCESSOR_TDP: f64 = 65.0;
/// Assumed draw of a selected graphics card that declares no TDP.
pub(crate) const DEFAULT_GRAPHICS_TDP: f64 = 150.0;
/// Fixed draw of everything else in the box.
pub(crate) const SYSTEM_OVERHEAD_WATTS: f64 = 50.0;
/// Minimum power-supply margin required during selection.
pub(crate) const PSU_SELECTION_MARGIN: f64 = 1.1;

/// True if `candidate` may join `state` without breaking any rule.
pub fn is_compatible(candidate: &CatalogItem, state: &SelectionState) -> bool {
    match candidate.category() {
        Category::Processor => {
            processor_fits_motherboard(candidate, state.get(Category::Motherboard))
                && psu_covers(state.get(Category::PowerSupply), draw_with(state, Some(candidate), None))
        }
        Category::Motherboard => motherboard_fits(candidate, state),
        Category::Memory => match state.get(Category::Motherboard) {
            Some(mb) => {
                memory_types_compatible(candidate, mb)
                    && slots_left(mb.motherboard().and_then(|f| f.ram_slots), state.count(Category::Memory))
            }
            None => true,
        },
        Category::Graphics => {
            let fits_case = match state.get(Category::Case) {
                Some(case) => gpu_fits_case(candidate, case),
                None => true,
            };
            fits_case && psu_covers(state.get(Category::PowerSupply), draw_with(state, None, Some(candidate)))
        }
        Category::Storage => {
            let uses_m2 = candidate.storage().map(|s| s.uses_m2_slot()).unwrap_or(false);
            match state.get(Category::Motherboard) {
                Some(mb) if uses_m2 => m2_count(state) < m2_slots(mb),
                _ => true,
            }
        }
        Category::PowerSupply => psu_covers(Some(candidate), power_draw_watts(state)),
        Category::Case => match state.get(Category::Graphics) {
            Some(gpu) => gpu_fits_case(gpu, candidate),
            None => true,
        },
    }
}

/// Keep the candidates compatible with `state`, preserving rank order.
pub(crate) fn filter_compatible(
    candidates: &[CatalogItem],
    state: &SelectionState,
) -> Vec<CatalogItem> {
    candidates
        .iter()
        .filter(|c| is_compatible(c, state))
        .cloned()
        .collect()
}

/// Estimated draw of the build in watts.
///
/// Processor TDP (65 W when unknown or not selected yet) plus graphics TDP (150 W when a
/// selected card declares none) plus a fixed 50 W overhead.
pub fn power_draw_watts(state: &SelectionState) -> f64 {
    draw_with(state, None, None)
}

/// Draw of a finished build. A processor that was never selected draws nothing here.
pub(crate) fn build_draw_watts(state: &SelectionState) -> f64 {
    let draw = power_draw_watts(state);
    if state.contains(Category::Processor) {
        draw
    } else {
        draw - DEFAULT_PROCESSOR_TDP
    }
}

fn draw_with(
    state: &SelectionState,
    processor: Option<&CatalogItem>,
    graphics: Option<&CatalogItem>,
) -> f64 {
    let processor = processor.or_else(|| state.get(Category::Processor));
    let graphics = graphics.or_else(|| state.get(Category::Graphics));

    let cpu = processor
        .and_then(|p| p.processor())
        .and_then(|f| f.tdp_watts)
        .map(f64::from)
        .unwrap_or(DEFAULT_PROCESSOR_TDP);
    let gpu = match graphics {
        Some(g) => g
            .graphics()
            .and_then(|f| f.tdp_watts)
            .map(f64::from)
            .unwrap_or(DEFAULT_GRAPHICS_TDP),
        None => 0.0,
    };

    cpu + gpu + SYSTEM_OVERHEAD_WATTS
}

fn psu_covers(psu: Option<&CatalogItem>, draw: f64) -> bool {
    match psu {
        Some(psu) => psu_wattage(psu) >= draw * PSU_SELECTION_MARGIN,
        None => true,
    }
}

pub(crate) fn psu_wattage(psu: &CatalogItem) -> f64 {
    psu.power_supply()
        .and_then(|f| f.wattage)
        .map(f64::from)
        .unwrap_or(0.0)
}

fn motherboard_fits(mb: &CatalogItem, state: &SelectionState) -> bool {
    if !processor_fits_motherboard_opt(state.get(Category::Processor), mb) {
        return false;
    }

    if let Some(memory) = state.get(Category::Memory) {
        if !memory_types_compatible(memory, mb) {
            return false;
        }
        let modules = state.count(Category::Memory);
        if let Some(slots) = mb.motherboard().and_then(|f| f.ram_slots)
            && slots > 0
            && modules > slots as usize
        {
            return false;
        }
    }

    m2_count(state) <= m2_slots(mb)
}

fn processor_fits_motherboard(cpu: &CatalogItem, mb: Option<&CatalogItem>) -> bool {
    match mb {
        Some(mb) => processor_fits_motherboard_opt(Some(cpu), mb),
        None => true,
    }
}

fn processor_fits_motherboard_opt(cpu: Option<&CatalogItem>, mb: &CatalogItem) -> bool {
    let Some(cpu) = cpu else {
        return true;
    };
    let cpu_socket = cpu.processor().and_then(|f| f.socket.as_deref());
    let mb_socket = mb.motherboard().and_then(|f| f.socket.as_deref());
    matches!(pair(cpu_socket, mb_socket), Pairing::Match)
}

/// Memory type rule. A motherboard that declares no type accepts typed memory for now;
/// the validator flags it later. Untyped memory is always rejected.
fn memory_types_compatible(memory: &CatalogItem, mb: &CatalogItem) -> bool {
    let ram = memory.memory().and_then(|f| f.ram_type.as_deref());
    let board = mb.motherboard().and_then(|f| f.ram_type.as_deref());
    match pair(ram, board) {
        Pairing::Match => true,
        Pairing::OnlyLeft => true,
        Pairing::Mismatch | Pairing::OnlyRight | Pairing::Undeclared => false,
    }
}

fn slots_left(slots: Option<u32>, used: usize) -> bool {
    match slots {
        Some(slots) if slots > 0 => used < slots as usize,
        _ => true,
    }
}

fn gpu_fits_case(gpu: &CatalogItem, case: &CatalogItem) -> bool {
    let length = gpu.graphics().and_then(|f| f.length_mm).unwrap_or(0);
    let max = case.case().and_then(|f| f.max_gpu_length_mm).unwrap_or(u32::MAX);
    length <= max
}

fn m2_slots(mb: &CatalogItem) -> usize {
    mb.motherboard().and_then(|f| f.m2_slots).unwrap_or(0) as usize
}

fn m2_count(state: &SelectionState) -> usize {
    state
        .iter()
        .filter(|(_, item)| item.storage().map(|s| s.uses_m2_slot()).unwrap_or(false))
        .count()
}

/// Outcome of comparing one declared string on each side of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pairing {
    Match,
    Mismatch,
    OnlyLeft,
    OnlyRight,
    Undeclared,
}

pub(crate) fn pair(left: Option<&str>, right: Option<&str>) -> Pairing {
    let left = left.map(normalize).filter(|s| !s.is_empty());
    let right = right.map(normalize).filter(|s| !s.is_empty());
    match (left, right) {
        (Some(l), Some(r)) if l == r => Pairing::Match,
        (Some(_), Some(_)) => Pairing::Mismatch,
        (Some(_), None) => Pairing::OnlyLeft,
        (None, Some(_)) => Pairing::OnlyRight,
        (None, None) => Pairing::Undeclared,
    }
}

/// Uppercase with all whitespace removed: `" lga 1700 "` -> `"LGA1700"`.
pub(crate) fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigforge_types::item::{
        CaseFeatures, Features, GraphicsFeatures, MemoryFeatures, MotherboardFeatures,
        PowerSupplyFeatures, ProcessorFeatures, StorageFeatures,
    };

    fn item(id: &str, features: Features) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: id.to_string(),
            brand: None,
            price: 100.0,
            predicted_rating: 4.0,
            ratings: Default::default(),
            features,
        }
    }

    fn cpu(socket: Option<&str>, tdp: u32) -> CatalogItem {
        item(
            "cpu",
            Features::Processor(ProcessorFeatures {
                socket: socket.map(str::to_string),
                tdp_watts: Some(tdp),
                ..Default::default()
            }),
        )
    }

    fn board(socket: Option<&str>, ram: Option<&str>, slots: u32, m2: u32) -> CatalogItem {
        item(
            "mb",
            Features::Motherboard(MotherboardFeatures {
                socket: socket.map(str::to_string),
                ram_type: ram.map(str::to_string),
                ram_slots: Some(slots),
                m2_slots: Some(m2),
                form_factor: None,
            }),
        )
    }

    fn ram(kind: Option<&str>) -> CatalogItem {
        item(
            "ram",
            Features::Memory(MemoryFeatures {
                ram_type: kind.map(str::to_string),
                capacity_gb: Some(16),
                frequency_mhz: None,
            }),
        )
    }

    fn gpu(length: u32, tdp: Option<u32>) -> CatalogItem {
        item(
            "gpu",
            Features::Graphics(GraphicsFeatures {
                length_mm: Some(length),
                tdp_watts: tdp,
                ..Default::default()
            }),
        )
    }

    fn case(max: Option<u32>) -> CatalogItem {
        item(
            "case",
            Features::Case(CaseFeatures {
                max_gpu_length_mm: max,
                form_factor: None,
            }),
        )
    }

    fn psu(watts: u32) -> CatalogItem {
        item(
            "psu",
            Features::PowerSupply(PowerSupplyFeatures {
                wattage: Some(watts),
                ..Default::default()
            }),
        )
    }

    fn nvme() -> CatalogItem {
        item(
            "nvme",
            Features::Storage(StorageFeatures {
                storage_type: Some("NVMe".to_string()),
                capacity_gb: Some(1000),
            }),
        )
    }

    fn state_with(items: &[CatalogItem]) -> SelectionState {
        let mut state = SelectionState::new();
        for i in items {
            state.select(i.clone());
        }
        state
    }

    #[test]
    fn sockets_compare_normalized() {
        let state = state_with(&[board(Some("lga 1700"), Some("DDR5"), 4, 2)]);
        assert!(is_compatible(&cpu(Some("LGA1700"), 65), &state));
        assert!(!is_compatible(&cpu(Some("AM5"), 65), &state));
    }

    #[test]
    fn one_sided_socket_is_rejected_both_ways() {
        let undeclared_board = state_with(&[board(None, Some("DDR5"), 4, 2)]);
        assert!(!is_compatible(&cpu(Some("AM5"), 65), &undeclared_board));

        let declared_board = state_with(&[board(Some("AM5"), Some("DDR5"), 4, 2)]);
        assert!(!is_compatible(&cpu(None, 65), &declared_board));

        let selected_cpu = state_with(&[cpu(None, 65)]);
        assert!(!is_compatible(&board(Some("AM5"), Some("DDR5"), 4, 2), &selected_cpu));
    }

    #[test]
    fn memory_type_rules() {
        let ddr4 = state_with(&[board(Some("AM4"), Some("DDR4"), 4, 1)]);
        assert!(is_compatible(&ram(Some("ddr4")), &ddr4));
        assert!(!is_compatible(&ram(Some("DDR5")), &ddr4));
        assert!(!is_compatible(&ram(None), &ddr4));

        let untyped = state_with(&[board(Some("AM4"), None, 4, 1)]);
        assert!(is_compatible(&ram(Some("DDR5")), &untyped));
        assert!(!is_compatible(&ram(None), &untyped));
    }

    #[test]
    fn memory_respects_slot_count() {
        let mut state = state_with(&[board(Some("AM5"), Some("DDR5"), 2, 1)]);
        state.select_pair(ram(Some("DDR5")));
        assert!(!is_compatible(&ram(Some("DDR5")), &state));
    }

    #[test]
    fn motherboard_candidate_checks_selected_memory() {
        let mut state = SelectionState::new();
        state.select_pair(ram(Some("DDR5")));

        assert!(is_compatible(&board(Some("AM5"), Some("DDR5"), 2, 0), &state));
        assert!(is_compatible(&board(Some("AM5"), None, 2, 0), &state));
        assert!(!is_compatible(&board(Some("AM5"), Some("DDR5"), 1, 0), &state));
        assert!(!is_compatible(&board(Some("AM5"), Some("DDR4"), 4, 0), &state));
    }

    #[test]
    fn gpu_length_against_case_both_ways() {
        let small_case = state_with(&[case(Some(300))]);
        assert!(is_compatible(&gpu(300, None), &small_case));
        assert!(!is_compatible(&gpu(320, None), &small_case));

        let long_gpu = state_with(&[gpu(320, None)]);
        assert!(!is_compatible(&case(Some(300)), &long_gpu));
        assert!(is_compatible(&case(None), &long_gpu));
    }

    #[test]
    fn nvme_limited_by_m2_slots() {
        let state = state_with(&[board(Some("AM5"), Some("DDR5"), 4, 0)]);
        assert!(!is_compatible(&nvme(), &state));

        let state = state_with(&[board(Some("AM5"), Some("DDR5"), 4, 1)]);
        assert!(is_compatible(&nvme(), &state));

        let with_drive = state_with(&[nvme()]);
        assert!(!is_compatible(&board(Some("AM5"), Some("DDR5"), 4, 0), &with_drive));
    }

    #[test]
    fn psu_needs_ten_percent_over_draw() {
        // 125 + 200 + 50 = 375 W, times 1.1 = 412.5 W
        let state = state_with(&[cpu(Some("AM5"), 125), gpu(250, Some(200))]);
        assert_eq!(power_draw_watts(&state), 375.0);
        assert!(!is_compatible(&psu(400), &state));
        assert!(is_compatible(&psu(450), &state));
    }

    #[test]
    fn draw_defaults_when_unknown() {
        assert_eq!(power_draw_watts(&SelectionState::new()), 115.0);
        let state = state_with(&[gpu(250, None)]);
        assert_eq!(power_draw_watts(&state), 265.0);
    }

    #[test]
    fn finished_build_without_processor_draws_no_cpu_power() {
        let state = state_with(&[gpu(250, Some(200))]);
        assert_eq!(power_draw_watts(&state), 315.0);
        assert_eq!(build_draw_watts(&state), 250.0);

        let state = state_with(&[cpu(Some("AM5"), 105), gpu(250, Some(200))]);
        assert_eq!(build_draw_watts(&state), power_draw_watts(&state));
    }

    #[test]
    fn selected_psu_limits_processor_and_gpu() {
        let state = state_with(&[psu(300)]);
        assert!(is_compatible(&cpu(Some("AM5"), 65), &state));
        assert!(!is_compatible(&gpu(250, Some(200)), &state));
        assert!(!is_compatible(&cpu(Some("AM5"), 250), &state));
    }
}
