//! Domain logic: turn a profile and a ranked candidate pool into one compatible,
//! budget-bounded build.
//!
//! This crate owns *what* gets selected and why. It does not own where candidates come
//! from; that's the [`CandidateOracle`] port, implemented by `rigforge-core`.

mod allocator;
mod budget_repair;
mod compat;
mod error;
mod ports;
mod repair;
mod selector;
mod state;
mod synthesizer;
#[cfg(test)]
mod testing;
mod tier;
mod validator;

pub use allocator::{Allocation, SynthesisConfig, allocate, policy_for, policy_table};
pub use budget_repair::{BudgetRepairLoop, max_excess};
pub use compat::{is_compatible, power_draw_watts};
pub use error::SynthesisError;
pub use ports::{ALL_CANDIDATES, CandidateOracle};
pub use repair::RepairCoordinator;
pub use selector::{ComponentSelector, is_performance_critical};
pub use state::SelectionState;
pub use synthesizer::{Synthesizer, build_id};
pub use tier::effective_tier;
pub use validator::validate;
