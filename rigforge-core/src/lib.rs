//! Embeddable core library for rigforge.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking
//! into a storefront backend or other host process.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`CatalogSource`](ports::CatalogSource): load the component catalog
//! - [`IntentSource`](ports::IntentSource): load the structured build request
//! - [`WritePort`](ports::WritePort): write files and create directories
//!
//! The [`adapters`] module provides default filesystem-backed implementations.
//!
//! # Entry points
//!
//! - [`run_build`](pipeline::run_build): synthesize a build + report

pub mod adapters;
pub mod catalog;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use catalog::{CatalogOracle, LoadedCatalog};

// Re-export so embedders don't need rigforge-domain directly.
pub use rigforge_domain::{SynthesisConfig, SynthesisError};
