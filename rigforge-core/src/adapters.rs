//! Default filesystem-backed port implementations.

use crate::catalog::{LoadedCatalog, parse_catalog};
use crate::ports::{CatalogSource, IntentSource, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::glob;
use rigforge_types::{CatalogItem, Intent};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Loads the catalog from a JSON file, or from every `*.json` in a directory.
///
/// Directory entries are read in sorted path order and the hash covers their bytes in
/// that order, so the same directory always yields the same catalog and digest.
#[derive(Debug, Clone)]
pub struct FsCatalogSource {
    pub path: Utf8PathBuf,
}

impl FsCatalogSource {
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }

    fn files(&self) -> anyhow::Result<Vec<Utf8PathBuf>> {
        if !self.path.is_dir() {
            return Ok(vec![self.path.clone()]);
        }

        let pattern = self.path.join("*.json");
        debug!(pattern = %pattern, "scanning catalog directory");

        let mut files = Vec::new();
        for entry in glob(pattern.as_str()).context("glob catalog/*.json")? {
            let path = entry.map_err(|e| anyhow::anyhow!("glob error: {e}"))?;
            let path = Utf8PathBuf::from_path_buf(path)
                .map_err(|p| anyhow::anyhow!("non-utf8 catalog path: {}", p.display()))?;
            files.push(path);
        }
        files.sort();
        Ok(files)
    }
}

impl CatalogSource for FsCatalogSource {
    fn load_catalog(&self) -> anyhow::Result<LoadedCatalog> {
        let mut hasher = Sha256::new();
        let mut items = Vec::new();

        for file in self.files()? {
            let text = fs::read_to_string(&file)?;
            hasher.update(text.as_bytes());
            let parsed = parse_catalog(&text).with_context(|| format!("load catalog {}", file))?;
            debug!(path = %file, items = parsed.len(), "loaded catalog file");
            items.extend(parsed);
        }

        Ok(LoadedCatalog {
            path: self.path.to_string(),
            sha256: Some(hex::encode(hasher.finalize())),
            items,
        })
    }
}

/// In-memory catalog for embedding and testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogSource {
    items: Vec<CatalogItem>,
}

impl InMemoryCatalogSource {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }
}

impl CatalogSource for InMemoryCatalogSource {
    fn load_catalog(&self) -> anyhow::Result<LoadedCatalog> {
        Ok(LoadedCatalog {
            path: "<memory>".to_string(),
            sha256: None,
            items: self.items.clone(),
        })
    }
}

/// Reads the request from an intent JSON file.
#[derive(Debug, Clone)]
pub struct JsonIntentFile {
    pub path: Utf8PathBuf,
}

impl JsonIntentFile {
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }
}

impl IntentSource for JsonIntentFile {
    fn load_intent(&self) -> anyhow::Result<Intent> {
        let text = fs::read_to_string(&self.path)?;
        serde_json::from_str(&text).with_context(|| format!("parse intent {}", self.path))
    }
}

/// A request assembled by the caller, e.g. from command-line flags.
#[derive(Debug, Clone)]
pub struct FixedIntent(pub Intent);

impl IntentSource for FixedIntent {
    fn load_intent(&self) -> anyhow::Result<Intent> {
        Ok(self.0.clone())
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}
