use std::cmp::Ordering;

use indexmap::IndexMap;
use regex::Regex;

use crate::model::config::{Config, DEFAULT_CATEGORIES};
use crate::model::item::Item;

/// Which items of a list to show
#[derive(Debug, Clone, Default)]
pub struct Filter {
    /// Only items in this category; `None` shows every category
    pub category: Option<String>,
    /// Hide purchased items
    pub pending_only: bool,
    search: Option<Regex>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = category.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn pending_only(mut self, pending_only: bool) -> Self {
        self.pending_only = pending_only;
        self
    }

    /// Case-insensitive substring match on the item name. Blank terms match everything.
    pub fn search(mut self, term: Option<&str>) -> Self {
        self.search = term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .and_then(|t| Regex::new(&format!("(?i){}", regex::escape(t))).ok());
        self
    }

    pub fn matches(&self, item: &Item) -> bool {
        if let Some(ref category) = self.category
            && item.category_or_default() != category.as_str()
        {
            return false;
        }
        if self.pending_only && item.purchased {
            return false;
        }
        if let Some(ref re) = self.search
            && !re.is_match(&item.name)
        {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, items: &'a [Item]) -> Vec<&'a Item> {
        items.iter().filter(|i| self.matches(i)).collect()
    }
}

/// Case-insensitive ordering with a byte-order tie break
pub fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Sort by category, then by name
pub fn sort_items(items: &mut [&Item]) {
    items.sort_by(|a, b| {
        compare_text(a.category_or_default(), b.category_or_default())
            .then_with(|| compare_text(&a.name, &b.name))
    });
}

/// Items sharing one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup<'a> {
    pub category: String,
    pub items: Vec<&'a Item>,
}

/// Group items by category. Groups are ordered by category name and
/// items within a group by name.
pub fn group_by_category<'a>(items: &[&'a Item]) -> Vec<CategoryGroup<'a>> {
    let mut map: IndexMap<&str, Vec<&'a Item>> = IndexMap::new();
    for item in items {
        map.entry(item.category_or_default()).or_default().push(*item);
    }

    let mut groups: Vec<CategoryGroup<'a>> = map
        .into_iter()
        .map(|(category, mut items)| {
            items.sort_by(|a, b| compare_text(&a.name, &b.name));
            CategoryGroup {
                category: category.to_string(),
                items,
            }
        })
        .collect();
    groups.sort_by(|a, b| compare_text(&a.category, &b.category));
    groups
}

/// Item counts for a list or a filtered view of one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub total: usize,
    pub purchased: usize,
    pub pending: usize,
}

pub fn totals<'a>(items: impl IntoIterator<Item = &'a Item>) -> Totals {
    let mut t = Totals::default();
    for item in items {
        t.total += 1;
        if item.purchased {
            t.purchased += 1;
        } else {
            t.pending += 1;
        }
    }
    t
}

/// Default categories plus the configured custom ones, de-duplicated and sorted
pub fn categories(config: &Config) -> Vec<String> {
    let mut all: Vec<String> = DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect();
    for custom in &config.categories.custom {
        if !all.contains(custom) {
            all.push(custom.clone());
        }
    }
    all.sort_by(|a, b| compare_text(a, b));
    all
}
