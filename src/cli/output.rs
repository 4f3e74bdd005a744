use serde::Serialize;

use crate::model::item::Item;
use crate::model::list::ShoppingList;
use crate::ops::view::{CategoryGroup, Totals, totals};
use crate::util::unicode::{display_width, fit_to_width};

/// Widest name column before names get truncated
const MAX_NAME_WIDTH: usize = 32;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ItemJson {
    pub id: i64,
    pub name: String,
    pub quantity: u32,
    pub category: String,
    pub purchased: bool,
}

#[derive(Serialize)]
pub struct TotalsJson {
    pub total: usize,
    pub purchased: usize,
    pub pending: usize,
}

#[derive(Serialize)]
pub struct ListInfoJson {
    pub id: i64,
    pub name: String,
    pub current: bool,
    pub totals: TotalsJson,
}

#[derive(Serialize)]
pub struct GroupJson {
    pub category: String,
    pub items: Vec<ItemJson>,
}

#[derive(Serialize)]
pub struct ShowJson {
    pub id: Option<i64>,
    pub name: String,
    /// Counts for the whole list, ignoring filters
    pub totals: TotalsJson,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<GroupJson>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ItemJson>>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn item_to_json(item: &Item) -> ItemJson {
    ItemJson {
        id: item.id,
        name: item.name.clone(),
        quantity: item.quantity,
        category: item.category_or_default().to_string(),
        purchased: item.purchased,
    }
}

pub fn totals_to_json(t: Totals) -> TotalsJson {
    TotalsJson {
        total: t.total,
        purchased: t.purchased,
        pending: t.pending,
    }
}

pub fn list_to_json(list: &ShoppingList, current: Option<i64>) -> ListInfoJson {
    ListInfoJson {
        id: list.id,
        name: list.name.clone(),
        current: current == Some(list.id),
        totals: totals_to_json(totals(&list.items)),
    }
}

pub fn group_to_json(group: &CategoryGroup<'_>) -> GroupJson {
    GroupJson {
        category: group.category.clone(),
        items: group.items.iter().map(|i| item_to_json(i)).collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Width of the name column for a set of items
pub fn name_width<'a>(items: impl IntoIterator<Item = &'a Item>) -> usize {
    items
        .into_iter()
        .map(|i| display_width(&i.name))
        .max()
        .unwrap_or(0)
        .min(MAX_NAME_WIDTH)
}

/// `[x] Milk      2  1712345678901`
pub fn format_item_line(item: &Item, width: usize) -> String {
    let check = if item.purchased { 'x' } else { ' ' };
    format!(
        "[{}] {}  {:>3}  {}",
        check,
        fit_to_width(&item.name, width),
        item.quantity,
        item.id
    )
}

/// Item line with its category, for ungrouped output
pub fn format_flat_item_line(item: &Item, width: usize, category_width: usize) -> String {
    let check = if item.purchased { 'x' } else { ' ' };
    format!(
        "[{}] {}  {}  {:>3}  {}",
        check,
        fit_to_width(item.category_or_default(), category_width),
        fit_to_width(&item.name, width),
        item.quantity,
        item.id
    )
}

pub fn format_totals(t: Totals) -> String {
    if t.total == 0 {
        "empty".to_string()
    } else {
        format!("{}/{} purchased", t.purchased, t.total)
    }
}

/// Title line followed by one block per category group
pub fn format_groups(title: &str, list_totals: Totals, groups: &[CategoryGroup<'_>]) -> Vec<String> {
    let mut lines = vec![format!("{}  ({})", title, format_totals(list_totals))];
    if groups.is_empty() {
        lines.push(String::new());
        lines.push("  (no items)".to_string());
        return lines;
    }
    let width = name_width(groups.iter().flat_map(|g| g.items.iter().copied()));
    for group in groups {
        lines.push(String::new());
        lines.push(group.category.clone());
        for item in &group.items {
            lines.push(format!("  {}", format_item_line(item, width)));
        }
    }
    lines
}

/// One line per list, current list marked with `*`
pub fn format_lists(lists: &[ShoppingList], current: Option<i64>) -> Vec<String> {
    let width = lists
        .iter()
        .map(|l| display_width(&l.name))
        .max()
        .unwrap_or(0)
        .min(MAX_NAME_WIDTH);
    lists
        .iter()
        .map(|list| {
            let marker = if current == Some(list.id) { '*' } else { ' ' };
            format!(
                "{} {}  {}  {}",
                marker,
                list.id,
                fit_to_width(&list.name, width),
                format_totals(totals(&list.items))
            )
        })
        .collect()
}
