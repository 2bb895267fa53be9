use crate::compat::{Pairing, build_draw_watts, pair, psu_wattage};
use crate::state::SelectionState;
use rigforge_types::result::{CompatibilityIssue, CompatibilityReport, issue_codes};
use rigforge_types::{CatalogItem, Category};

/// Recommended power-supply headroom over the estimated draw.
const PSU_RECOMMENDED_MARGIN: f64 = 1.3;

/// Independent re-check of a finished build. Never mutates the selection.
pub fn validate(state: &SelectionState) -> CompatibilityReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let cpu = state.get(Category::Processor);
    let mb = state.get(Category::Motherboard);
    let memory = state.get(Category::Memory);
    let gpu = state.get(Category::Graphics);
    let case = state.get(Category::Case);
    let psu = state.get(Category::PowerSupply);

    if let (Some(cpu), Some(mb)) = (cpu, mb) {
        check_socket(cpu, mb, &mut errors, &mut warnings);
    }

    if let (Some(memory), Some(mb)) = (memory, mb) {
        check_ram_type(memory, mb, &mut errors, &mut warnings);

        let modules = state.count(Category::Memory);
        if let Some(slots) = mb.motherboard().and_then(|f| f.ram_slots)
            && slots > 0
            && modules > slots as usize
        {
            errors.push(issue(
                issue_codes::RAM_SLOTS_EXCEEDED,
                format!("{modules} memory modules but motherboard has {slots} slots"),
                &[Category::Memory, Category::Motherboard],
            ));
        }
    }

    if let (Some(gpu), Some(case)) = (gpu, case) {
        let length = gpu.graphics().and_then(|f| f.length_mm);
        let max = case.case().and_then(|f| f.max_gpu_length_mm);
        if let (Some(length), Some(max)) = (length, max)
            && length > max
        {
            errors.push(issue(
                issue_codes::GPU_TOO_LONG,
                format!("graphics card is {length} mm, case fits {max} mm"),
                &[Category::Graphics, Category::Case],
            ));
        }
    }

    if let Some(psu) = psu {
        let watts = psu_wattage(psu);
        let draw = build_draw_watts(state);
        let recommended = draw * PSU_RECOMMENDED_MARGIN;
        if watts < draw {
            errors.push(issue(
                issue_codes::PSU_INSUFFICIENT,
                format!("power supply {watts:.0} W is below estimated draw {draw:.0} W"),
                &[Category::PowerSupply],
            ));
        } else if watts < recommended {
            warnings.push(issue(
                issue_codes::PSU_LOW_HEADROOM,
                format!("power supply {watts:.0} W, recommended {recommended:.0} W"),
                &[Category::PowerSupply],
            ));
        }
    }

    CompatibilityReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn check_socket(
    cpu: &CatalogItem,
    mb: &CatalogItem,
    errors: &mut Vec<CompatibilityIssue>,
    warnings: &mut Vec<CompatibilityIssue>,
) {
    let cpu_socket = cpu.processor().and_then(|f| f.socket.as_deref());
    let mb_socket = mb.motherboard().and_then(|f| f.socket.as_deref());
    let categories = &[Category::Processor, Category::Motherboard];

    match pair(cpu_socket, mb_socket) {
        Pairing::Match => {}
        Pairing::Mismatch => errors.push(issue(
            issue_codes::SOCKET_MISMATCH,
            format!(
                "processor socket {} does not match motherboard socket {}",
                cpu_socket.unwrap_or_default(),
                mb_socket.unwrap_or_default()
            ),
            categories,
        )),
        _ => warnings.push(issue(
            issue_codes::SOCKET_UNVERIFIED,
            "processor/motherboard socket not declared on both sides".to_string(),
            categories,
        )),
    }
}

fn check_ram_type(
    memory: &CatalogItem,
    mb: &CatalogItem,
    errors: &mut Vec<CompatibilityIssue>,
    warnings: &mut Vec<CompatibilityIssue>,
) {
    let ram = memory.memory().and_then(|f| f.ram_type.as_deref());
    let board = mb.motherboard().and_then(|f| f.ram_type.as_deref());
    let categories = &[Category::Memory, Category::Motherboard];

    match pair(ram, board) {
        Pairing::Match => {}
        Pairing::Mismatch => errors.push(issue(
            issue_codes::RAM_TYPE_MISMATCH,
            format!(
                "memory type {} does not match motherboard memory type {}",
                ram.unwrap_or_default(),
                board.unwrap_or_default()
            ),
            categories,
        )),
        _ => warnings.push(issue(
            issue_codes::RAM_TYPE_UNVERIFIED,
            "memory type not declared on both memory and motherboard".to_string(),
            categories,
        )),
    }
}

fn issue(code: &str, message: String, categories: &[Category]) -> CompatibilityIssue {
    CompatibilityIssue {
        code: code.to_string(),
        message,
        categories: categories.to_vec(),
    }
}
