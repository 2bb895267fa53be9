//! Item builders and an in-memory oracle for unit tests.

use crate::ports::CandidateOracle;
use rigforge_types::item::{
    CaseFeatures, Features, GraphicsFeatures, MemoryFeatures, MotherboardFeatures,
    PowerSupplyFeatures, ProcessorFeatures, StorageFeatures,
};
use rigforge_types::{CatalogItem, Category, PerformanceTier};

pub fn item(id: &str, price: f64, rating: f64, features: Features) -> CatalogItem {
    CatalogItem {
        id: id.to_string(),
        name: id.to_string(),
        brand: None,
        price,
        predicted_rating: rating,
        ratings: Default::default(),
        features,
    }
}

pub fn cpu(id: &str, price: f64, rating: f64, socket: &str, tier: PerformanceTier) -> CatalogItem {
    item(
        id,
        price,
        rating,
        Features::Processor(ProcessorFeatures {
            socket: Some(socket.to_string()),
            tdp_watts: Some(65),
            performance_tier: Some(tier),
            ..Default::default()
        }),
    )
}

pub fn board(id: &str, price: f64, rating: f64, socket: &str, ram: &str) -> CatalogItem {
    item(
        id,
        price,
        rating,
        Features::Motherboard(MotherboardFeatures {
            socket: Some(socket.to_string()),
            ram_type: Some(ram.to_string()),
            ram_slots: Some(4),
            m2_slots: Some(2),
            form_factor: Some("ATX".to_string()),
        }),
    )
}

pub fn ram(id: &str, price: f64, rating: f64, kind: &str, capacity: u32) -> CatalogItem {
    item(
        id,
        price,
        rating,
        Features::Memory(MemoryFeatures {
            ram_type: Some(kind.to_string()),
            capacity_gb: Some(capacity),
            frequency_mhz: Some(6000),
        }),
    )
}

pub fn gpu(id: &str, price: f64, rating: f64, tier: PerformanceTier) -> CatalogItem {
    item(
        id,
        price,
        rating,
        Features::Graphics(GraphicsFeatures {
            vram_gb: Some(12),
            length_mm: Some(300),
            tdp_watts: Some(200),
            performance_tier: Some(tier),
        }),
    )
}

pub fn ssd(id: &str, price: f64, rating: f64) -> CatalogItem {
    item(
        id,
        price,
        rating,
        Features::Storage(StorageFeatures {
            storage_type: Some("NVME".to_string()),
            capacity_gb: Some(1000),
        }),
    )
}

pub fn psu(id: &str, price: f64, rating: f64, watts: u32) -> CatalogItem {
    item(
        id,
        price,
        rating,
        Features::PowerSupply(PowerSupplyFeatures {
            wattage: Some(watts),
            efficiency_rating: Some("80+ Gold".to_string()),
            modular: Some(true),
        }),
    )
}

pub fn case(id: &str, price: f64, rating: f64) -> CatalogItem {
    item(
        id,
        price,
        rating,
        Features::Case(CaseFeatures {
            max_gpu_length_mm: Some(360),
            form_factor: Some("ATX".to_string()),
        }),
    )
}

/// Ranks a fixed item list by `predicted_rating`, ties by id.
#[derive(Debug, Clone, Default)]
pub struct FixtureOracle {
    pub items: Vec<CatalogItem>,
}

impl FixtureOracle {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }
}

impl CandidateOracle for FixtureOracle {
    fn recommend(
        &self,
        _profile_id: &str,
        category: Category,
        limit: usize,
    ) -> anyhow::Result<Vec<CatalogItem>> {
        let mut out: Vec<CatalogItem> = self
            .items
            .iter()
            .filter(|i| i.category() == category)
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            b.predicted_rating
                .total_cmp(&a.predicted_rating)
                .then_with(|| a.id.cmp(&b.id))
        });
        out.truncate(limit);
        Ok(out)
    }
}

/// Oracle that always fails.
pub struct BrokenOracle;

impl CandidateOracle for BrokenOracle {
    fn recommend(
        &self,
        _profile_id: &str,
        category: Category,
        _limit: usize,
    ) -> anyhow::Result<Vec<CatalogItem>> {
        anyhow::bail!("inventory for {category} unavailable")
    }
}
