//! Port traits abstracting all I/O away from the pipeline.

use crate::catalog::LoadedCatalog;
use camino::Utf8Path;
use rigforge_types::Intent;

/// Source of the component catalog.
pub trait CatalogSource {
    fn load_catalog(&self) -> anyhow::Result<LoadedCatalog>;
}

/// Source of the structured build request.
pub trait IntentSource {
    fn load_intent(&self) -> anyhow::Result<Intent>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
