use serde::{Deserialize, Serialize};

use super::item::DEFAULT_CATEGORY;

/// Categories offered out of the box
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Produce",
    "Butcher",
    "Bakery",
    "Beverages",
    "Cleaning",
    "Hygiene",
    "Frozen",
    "General",
];

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub categories: CategoryConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// User-defined categories, in the order they were added
    #[serde(default)]
    pub custom: Vec<String>,
    /// Category used by `add` when none is given
    #[serde(default = "default_category")]
    pub default: String,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        CategoryConfig {
            custom: Vec::new(),
            default: default_category(),
        }
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Hide purchased items in `show` unless `--all` is passed
    #[serde(default)]
    pub hide_purchased: bool,
}

impl Config {
    /// Whether `name` is already a default or custom category
    pub fn has_category(&self, name: &str) -> bool {
        DEFAULT_CATEGORIES.contains(&name) || self.categories.custom.iter().any(|c| c == name)
    }
}
