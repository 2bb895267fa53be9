use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A component slot of a build.
///
/// The declaration order is the canonical order used for sorted output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Processor,
    Motherboard,
    Memory,
    Graphics,
    Storage,
    PowerSupply,
    Case,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Processor,
        Category::Motherboard,
        Category::Memory,
        Category::Graphics,
        Category::Storage,
        Category::PowerSupply,
        Category::Case,
    ];

    /// Categories whose choice constrains the others, in resolution order.
    pub const ANCHORS: [Category; 3] = [
        Category::Motherboard,
        Category::Processor,
        Category::Memory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Processor => "processor",
            Category::Motherboard => "motherboard",
            Category::Memory => "memory",
            Category::Graphics => "graphics",
            Category::Storage => "storage",
            Category::PowerSupply => "power_supply",
            Category::Case => "case",
        }
    }

    pub fn is_anchor(self) -> bool {
        Self::ANCHORS.contains(&self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError(pub String);

impl fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category '{}'", self.0)
    }
}

impl std::error::Error for ParseCategoryError {}

impl FromStr for Category {
    type Err = ParseCategoryError;

    /// Accepts the canonical names plus the short aliases used in catalogs
    /// and user priorities (`cpu`, `gpu`, `ram`, `psu`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let cat = match norm.as_str() {
            "processor" | "cpu" => Category::Processor,
            "motherboard" | "mainboard" | "mb" => Category::Motherboard,
            "memory" | "ram" => Category::Memory,
            "graphics" | "gpu" | "graphics_card" => Category::Graphics,
            "storage" | "ssd" | "disk" => Category::Storage,
            "power_supply" | "psu" => Category::PowerSupply,
            "case" | "chassis" => Category::Case,
            _ => return Err(ParseCategoryError(s.to_string())),
        };
        Ok(cat)
    }
}

/// Key of one entry in a selection.
///
/// `ordinal` 0 is the primary item of the category. Ordinal 1 only exists for
/// memory and holds the second module of a dual kit (`memory_2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey {
    pub category: Category,
    pub ordinal: u8,
}

impl SlotKey {
    pub fn primary(category: Category) -> Self {
        Self {
            category,
            ordinal: 0,
        }
    }

    pub fn second(category: Category) -> Self {
        Self {
            category,
            ordinal: 1,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.ordinal == 0
    }

    /// Wire name: `memory`, `memory_2`, ...
    pub fn key_name(&self) -> String {
        if self.ordinal == 0 {
            self.category.as_str().to_string()
        } else {
            format!("{}_{}", self.category.as_str(), self.ordinal + 1)
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key_name())
    }
}
