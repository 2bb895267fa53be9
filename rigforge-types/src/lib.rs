//! Shared DTOs (schemas-as-code) for the rigforge workspace.
//!
//! # Design constraints
//! - These types are read from catalog files and written to disk as build artifacts.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod allocation;
pub mod category;
pub mod item;
pub mod profile;
pub mod report;
pub mod result;

pub use allocation::{BudgetTier, CategoryBudgetEntry, PolicyKind};
pub use category::{Category, ParseCategoryError, SlotKey};
pub use item::{CatalogItem, Features, PerformanceTier};
pub use profile::{Intent, Profile, UseCase};

/// Schema identifiers.
pub mod schema {
    pub const RIGFORGE_BUILD_V1: &str = "rigforge.build.v1";
    pub const RIGFORGE_REPORT_V1: &str = "rigforge.report.v1";
}
