use crate::model::item::Item;
use crate::model::list::ShoppingList;
use crate::ops::view::group_by_category;

/// Render a list as a markdown checklist grouped by category, ready to
/// paste into a message.
pub fn share_text(list: &ShoppingList) -> String {
    let mut out = format!("# {}\n", list.name);

    let items: Vec<&Item> = list.items.iter().collect();
    if items.is_empty() {
        out.push_str("\nNothing on the list.\n");
        return out;
    }

    for group in group_by_category(&items) {
        out.push_str(&format!("\n## {}\n", group.category));
        for item in group.items {
            out.push_str(&share_line(item));
            out.push('\n');
        }
    }
    out
}

/// `- [x] Milk x2` style checklist line
pub fn share_line(item: &Item) -> String {
    let check = if item.purchased { 'x' } else { ' ' };
    if item.quantity > 1 {
        format!("- [{}] {} x{}", check, item.name, item.quantity)
    } else {
        format!("- [{}] {}", check, item.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn item(id: i64, name: &str, quantity: u32, category: &str, purchased: bool) -> Item {
        let mut item = Item::new(id, name.into(), quantity, category.into());
        item.purchased = purchased;
        item
    }

    #[test]
    fn grouped_checklist() {
        let list = ShoppingList::new(
            1,
            "Weekly".into(),
            vec![
                item(1, "Milk", 2, "Dairy", false),
                item(2, "apples", 6, "Produce", true),
                item(3, "Cheese", 1, "Dairy", true),
                item(4, "Soap", 1, "General", false),
            ],
        );
        assert_snapshot!(share_text(&list), @r"
# Weekly

## Dairy
- [x] Cheese
- [ ] Milk x2

## General
- [ ] Soap

## Produce
- [x] apples x6
");
    }

    #[test]
    fn empty_list() {
        let list = ShoppingList::new(1, "Party".into(), Vec::new());
        assert_eq!(share_text(&list), "# Party\n\nNothing on the list.\n");
    }

    #[test]
    fn single_quantity_has_no_suffix() {
        assert_eq!(share_line(&item(1, "Bread", 1, "Bakery", false)), "- [ ] Bread");
    }
}
