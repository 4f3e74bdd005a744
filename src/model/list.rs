use serde::{Deserialize, Serialize};

use super::item::Item;

/// Name given to a list whose name is blank
pub const DEFAULT_LIST_NAME: &str = "Shopping List";

/// Name given to a newly created list when none is supplied
pub const NEW_LIST_NAME: &str = "New list";

/// A named, ordered collection of items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl ShoppingList {
    pub fn new(id: i64, name: String, items: Vec<Item>) -> Self {
        ShoppingList { id, name, items }
    }

    pub fn find_item(&self, id: i64) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn find_item_mut(&mut self, id: i64) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Largest item id in the list, used to seed id generation
    pub fn max_item_id(&self) -> Option<i64> {
        self.items.iter().map(|i| i.id).max()
    }
}

/// Trim a user-supplied list name, substituting `fallback` when blank
pub fn normalize_list_name(name: &str, fallback: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
