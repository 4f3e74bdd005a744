use serde::{Deserialize, Deserializer, Serialize};

/// Category assigned to items that don't name one
pub const DEFAULT_CATEGORY: &str = "General";

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_quantity() -> u32 {
    1
}

/// Stored quantities below 1 (or past `u32::MAX`) are clamped into range
fn deserialize_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(1, i64::from(u32::MAX)) as u32)
}

/// A single entry on a shopping list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique within the owning list
    pub id: i64,
    #[serde(alias = "nome")]
    pub name: String,
    /// Always at least 1
    #[serde(
        default = "default_quantity",
        deserialize_with = "deserialize_quantity",
        alias = "quantidade"
    )]
    pub quantity: u32,
    #[serde(default, alias = "comprado")]
    pub purchased: bool,
    /// Records written before categories existed have no category field
    #[serde(default = "default_category", alias = "categoria")]
    pub category: String,
}

impl Item {
    pub fn new(id: i64, name: String, quantity: u32, category: String) -> Self {
        Item {
            id,
            name,
            quantity: quantity.max(1),
            purchased: false,
            category: normalize_category(&category),
        }
    }

    /// Category used for filtering and grouping; blank counts as the default
    pub fn category_or_default(&self) -> &str {
        if self.category.trim().is_empty() {
            DEFAULT_CATEGORY
        } else {
            &self.category
        }
    }

    /// Apply the fields present in `patch`, leaving the rest untouched
    pub fn apply(&mut self, patch: &ItemPatch) {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity.max(1);
        }
        if let Some(ref category) = patch.category {
            self.category = normalize_category(category);
        }
    }
}

fn normalize_category(category: &str) -> String {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        default_category()
    } else {
        trimmed.to_string()
    }
}

/// Fields for a new item. `quantity` and `category` have defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub quantity: u32,
    pub category: String,
}

impl NewItem {
    pub fn named(name: impl Into<String>) -> Self {
        NewItem {
            name: name.into(),
            quantity: 1,
            category: default_category(),
        }
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// Partial update for an existing item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub quantity: Option<u32>,
    pub category: Option<String>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.quantity.is_none() && self.category.is_none()
    }
}
