//! Catalog parsing and the catalog-backed candidate oracle.

use anyhow::Context;
use rigforge_domain::CandidateOracle;
use rigforge_types::{CatalogItem, Category};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// A catalog as loaded by a [`CatalogSource`](crate::ports::CatalogSource).
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    /// Where the catalog came from (file, directory or `<memory>`).
    pub path: String,
    /// Hex SHA-256 of the raw bytes read, when there were any.
    pub sha256: Option<String>,
    pub items: Vec<CatalogItem>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Items(Vec<CatalogItem>),
    Wrapped { items: Vec<CatalogItem> },
}

/// Parse one catalog document: a JSON array of items or `{ "items": [...] }`.
pub fn parse_catalog(text: &str) -> anyhow::Result<Vec<CatalogItem>> {
    let doc: CatalogDocument = serde_json::from_str(text).context("parse catalog json")?;
    Ok(match doc {
        CatalogDocument::Items(items) => items,
        CatalogDocument::Wrapped { items } => items,
    })
}

/// Drop entries the engine cannot price. Duplicate ids keep the first occurrence.
pub fn sanitize(items: Vec<CatalogItem>) -> Vec<CatalogItem> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if !item.price.is_finite() || item.price < 0.0 {
            warn!(id = %item.id, price = item.price, "dropping catalog item with invalid price");
            continue;
        }
        if !seen.insert(item.id.clone()) {
            warn!(id = %item.id, "dropping duplicate catalog id");
            continue;
        }
        out.push(item);
    }
    out
}

/// Ranks an in-memory catalog per profile.
///
/// The rating for a profile is `ratings[profile_id]` when present, else the item's
/// `predicted_rating`. Results are sorted by rating (descending) with ties broken by id,
/// and each returned item carries that rating in `predicted_rating`.
#[derive(Debug, Clone, Default)]
pub struct CatalogOracle {
    items: Vec<CatalogItem>,
}

impl CatalogOracle {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self {
            items: sanitize(items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn rating_for(item: &CatalogItem, profile_id: &str) -> f64 {
        let rating = item
            .ratings
            .get(profile_id)
            .copied()
            .unwrap_or(item.predicted_rating);
        if rating.is_finite() { rating } else { 0.0 }
    }
}

impl CandidateOracle for CatalogOracle {
    fn recommend(
        &self,
        profile_id: &str,
        category: Category,
        limit: usize,
    ) -> anyhow::Result<Vec<CatalogItem>> {
        let mut ranked: Vec<CatalogItem> = self
            .items
            .iter()
            .filter(|item| item.category() == category)
            .map(|item| {
                let mut item = item.clone();
                item.predicted_rating = Self::rating_for(&item, profile_id);
                item
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.predicted_rating
                .total_cmp(&a.predicted_rating)
                .then_with(|| a.id.cmp(&b.id))
        });
        ranked.truncate(limit);

        debug!(profile_id, category = %category, returned = ranked.len(), "ranked candidates");
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CATALOG: &str = r#"[
        { "id": "ssd-b", "name": "SSD B", "price": 90, "predicted_rating": 4.0,
          "features": { "storage": { "storage_type": "NVME", "capacity_gb": 1000 } } },
        { "id": "ssd-a", "name": "SSD A", "price": 80, "predicted_rating": 4.0,
          "features": { "storage": { "storage_type": "SATA", "capacity_gb": 1000 } } },
        { "id": "ssd-c", "name": "SSD C", "price": 70, "predicted_rating": 3.0,
          "ratings": { "office_budget": 4.9 },
          "features": { "storage": { "storage_type": "HDD" } } },
        { "id": "case-a", "name": "Case A", "price": 60,
          "features": { "case": { "max_gpu_length_mm": 330 } } }
    ]"#;

    fn oracle() -> CatalogOracle {
        CatalogOracle::new(parse_catalog(CATALOG).expect("parse"))
    }

    fn ids(items: &[CatalogItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn parses_wrapped_document() {
        let wrapped = format!(r#"{{ "items": {CATALOG} }}"#);
        assert_eq!(parse_catalog(&wrapped).expect("parse").len(), 4);
    }

    #[test]
    fn rejects_malformed_document() {
        let err = parse_catalog(r#"{ "parts": [] }"#).expect_err("should fail");
        assert!(format!("{err:#}").contains("parse catalog json"));
    }

    #[test]
    fn ranks_by_rating_then_id() {
        let ranked = oracle()
            .recommend("gamer_mid", Category::Storage, usize::MAX)
            .expect("recommend");
        assert_eq!(ids(&ranked), vec!["ssd-a", "ssd-b", "ssd-c"]);
    }

    #[test]
    fn profile_ratings_override_base_rating() {
        let ranked = oracle()
            .recommend("office_budget", Category::Storage, usize::MAX)
            .expect("recommend");
        assert_eq!(ids(&ranked), vec!["ssd-c", "ssd-a", "ssd-b"]);
        assert_eq!(ranked[0].predicted_rating, 4.9);
    }

    #[test]
    fn limit_truncates_after_sorting() {
        let ranked = oracle()
            .recommend("gamer_mid", Category::Storage, 1)
            .expect("recommend");
        assert_eq!(ids(&ranked), vec!["ssd-a"]);
    }

    #[test]
    fn missing_rating_defaults_to_zero() {
        let ranked = oracle()
            .recommend("gamer_mid", Category::Case, usize::MAX)
            .expect("recommend");
        assert_eq!(ranked[0].predicted_rating, 0.0);
    }

    #[test]
    fn sanitize_drops_duplicates_and_bad_prices() {
        let mut items = parse_catalog(CATALOG).expect("parse");
        let mut dup = items[0].clone();
        dup.price = 1.0;
        items.push(dup);
        let mut bad = items[1].clone();
        bad.id = "ssd-nan".into();
        bad.price = f64::NAN;
        items.push(bad);

        let clean = sanitize(items);
        assert_eq!(ids(&clean), vec!["ssd-b", "ssd-a", "ssd-c", "case-a"]);
        assert_eq!(clean[0].price, 90.0);
    }
}
