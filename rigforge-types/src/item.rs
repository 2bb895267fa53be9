use crate::category::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One purchasable component as read from the catalog.
///
/// The category is not stored separately: it is the tag of [`Features`], so the
/// two can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    pub price: f64,

    /// Quality score supplied by the ranking oracle for the active profile.
    #[serde(default)]
    pub predicted_rating: f64,

    /// Per-profile ratings, consulted by catalog-backed oracles.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ratings: BTreeMap<String, f64>,

    pub features: Features,
}

impl CatalogItem {
    pub fn category(&self) -> Category {
        self.features.category()
    }

    /// Explicit performance tier, for the categories that declare one.
    pub fn declared_tier(&self) -> Option<PerformanceTier> {
        match &self.features {
            Features::Processor(f) => f.performance_tier,
            Features::Graphics(f) => f.performance_tier,
            _ => None,
        }
    }

    pub fn processor(&self) -> Option<&ProcessorFeatures> {
        match &self.features {
            Features::Processor(f) => Some(f),
            _ => None,
        }
    }

    pub fn motherboard(&self) -> Option<&MotherboardFeatures> {
        match &self.features {
            Features::Motherboard(f) => Some(f),
            _ => None,
        }
    }

    pub fn memory(&self) -> Option<&MemoryFeatures> {
        match &self.features {
            Features::Memory(f) => Some(f),
            _ => None,
        }
    }

    pub fn graphics(&self) -> Option<&GraphicsFeatures> {
        match &self.features {
            Features::Graphics(f) => Some(f),
            _ => None,
        }
    }

    pub fn storage(&self) -> Option<&StorageFeatures> {
        match &self.features {
            Features::Storage(f) => Some(f),
            _ => None,
        }
    }

    pub fn power_supply(&self) -> Option<&PowerSupplyFeatures> {
        match &self.features {
            Features::PowerSupply(f) => Some(f),
            _ => None,
        }
    }

    pub fn case(&self) -> Option<&CaseFeatures> {
        match &self.features {
            Features::Case(f) => Some(f),
            _ => None,
        }
    }
}

/// Category-specific feature record. Serialized externally tagged:
/// `{"processor": {"socket": "AM5", ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Features {
    Processor(ProcessorFeatures),
    Motherboard(MotherboardFeatures),
    Memory(MemoryFeatures),
    Graphics(GraphicsFeatures),
    Storage(StorageFeatures),
    PowerSupply(PowerSupplyFeatures),
    Case(CaseFeatures),
}

impl Features {
    pub fn category(&self) -> Category {
        match self {
            Features::Processor(_) => Category::Processor,
            Features::Motherboard(_) => Category::Motherboard,
            Features::Memory(_) => Category::Memory,
            Features::Graphics(_) => Category::Graphics,
            Features::Storage(_) => Category::Storage,
            Features::PowerSupply(_) => Category::PowerSupply,
            Features::Case(_) => Category::Case,
        }
    }
}

/// Declared product line tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    Entry,
    Mid,
    High,
    Enthusiast,
}

impl PerformanceTier {
    pub fn is_entry(self) -> bool {
        matches!(self, PerformanceTier::Entry)
    }

    pub fn is_mid_or_above(self) -> bool {
        self >= PerformanceTier::Mid
    }

    pub fn is_high_end(self) -> bool {
        self >= PerformanceTier::High
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorFeatures {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cores: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_clock_ghz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tdp_watts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_tier: Option<PerformanceTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrated_graphics: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotherboardFeatures {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket: Option<String>,
    /// Supported memory generation, e.g. `DDR5`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram_slots: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m2_slots: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_factor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryFeatures {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_gb: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_mhz: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsFeatures {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vram_gb: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_mm: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tdp_watts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_tier: Option<PerformanceTier>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageFeatures {
    /// Interface / form, e.g. `NVME`, `M.2`, `SATA`, `HDD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_gb: Option<u32>,
}

impl StorageFeatures {
    /// True for drives that occupy an M.2 slot on the motherboard.
    pub fn uses_m2_slot(&self) -> bool {
        self.storage_type
            .as_deref()
            .map(|t| {
                let t = t.trim().to_ascii_uppercase();
                t == "NVME" || t == "M.2" || t == "M2"
            })
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerSupplyFeatures {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wattage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency_rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modular: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseFeatures {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_gpu_length_mm: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_factor: Option<String>,
}
