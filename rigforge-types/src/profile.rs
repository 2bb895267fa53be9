use crate::category::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// What the machine is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseCase {
    Gaming,
    Development,
    Design,
    VideoEditing,
    Streaming,
    Office,
}

impl UseCase {
    pub fn as_str(self) -> &'static str {
        match self {
            UseCase::Gaming => "gaming",
            UseCase::Development => "development",
            UseCase::Design => "design",
            UseCase::VideoEditing => "video_editing",
            UseCase::Streaming => "streaming",
            UseCase::Office => "office",
        }
    }
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UseCase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match norm.as_str() {
            "gaming" | "games" => Ok(UseCase::Gaming),
            "development" | "dev" | "programming" => Ok(UseCase::Development),
            "design" => Ok(UseCase::Design),
            "video_editing" | "video" | "editing" => Ok(UseCase::VideoEditing),
            "streaming" => Ok(UseCase::Streaming),
            "office" | "student" => Ok(UseCase::Office),
            _ => Err(format!("unknown use case '{}'", s)),
        }
    }
}

/// One synthesis request. Read-only once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,

    #[serde(default)]
    pub use_cases: BTreeSet<UseCase>,

    pub budget: f64,

    /// Categories the user cares about most, highest first.
    #[serde(default)]
    pub priorities: Vec<Category>,

    /// The user asked for top-end performance (4K, AAA titles, ...).
    #[serde(default)]
    pub high_performance: bool,
}

impl Profile {
    pub fn new(id: impl Into<String>, budget: f64) -> Self {
        Self {
            id: id.into(),
            use_cases: BTreeSet::new(),
            budget,
            priorities: Vec::new(),
            high_performance: false,
        }
    }

    pub fn with_use_cases(mut self, use_cases: impl IntoIterator<Item = UseCase>) -> Self {
        self.use_cases.extend(use_cases);
        self
    }

    pub fn with_priorities(mut self, priorities: impl IntoIterator<Item = Category>) -> Self {
        self.priorities.extend(priorities);
        self
    }

    pub fn has(&self, use_case: UseCase) -> bool {
        self.use_cases.contains(&use_case)
    }

    /// Design or video editing.
    pub fn is_creative(&self) -> bool {
        self.has(UseCase::Design) || self.has(UseCase::VideoEditing)
    }

    /// Ranking-profile id for a use-case set and budget, used when the caller
    /// does not name one.
    pub fn suggested_id(use_cases: &BTreeSet<UseCase>, budget: f64) -> &'static str {
        let gamer = |budget: f64| {
            if budget < 1500.0 {
                "gamer_budget"
            } else if budget < 2500.0 {
                "gamer_mid"
            } else {
                "gamer_high"
            }
        };

        if use_cases.contains(&UseCase::Gaming) {
            return gamer(budget);
        }
        if use_cases.contains(&UseCase::Development) {
            return if budget < 1500.0 {
                "developer_budget"
            } else {
                "developer_mid"
            };
        }
        if use_cases.contains(&UseCase::Design) || use_cases.contains(&UseCase::VideoEditing) {
            return if budget < 2500.0 {
                "designer_mid"
            } else {
                "designer_high"
            };
        }
        if use_cases.contains(&UseCase::Office) {
            return "office_budget";
        }
        if budget < 1200.0 {
            return "student_budget";
        }
        gamer(budget)
    }
}

/// Structured output of the external intent collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub budget: f64,

    #[serde(default)]
    pub use_cases: Vec<UseCase>,

    #[serde(default)]
    pub priorities: Vec<Category>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_profile_id: Option<String>,

    #[serde(default)]
    pub high_performance: bool,
}

impl Intent {
    pub fn into_profile(self) -> Profile {
        let use_cases: BTreeSet<UseCase> = self.use_cases.into_iter().collect();
        let id = self
            .suggested_profile_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Profile::suggested_id(&use_cases, self.budget).to_string());

        let mut priorities = Vec::new();
        for p in self.priorities {
            if !priorities.contains(&p) {
                priorities.push(p);
            }
        }

        Profile {
            id,
            use_cases,
            budget: self.budget,
            priorities,
            high_performance: self.high_performance,
        }
    }
}
