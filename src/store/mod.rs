//! The list store: the single owner of every shopping list and the only
//! writer to the persistence backend.
//!
//! A store starts [`Lifecycle::Uninitialized`]. [`ListStore::init`] opens
//! the backend, loads the saved lists (migrating the pre-multi-list layout
//! on first run) and moves it to [`Lifecycle::Ready`]. Until then every
//! mutation is skipped and reads see an empty store.
//!
//! Every mutation flushes the full list sequence and the selected list id.
//! Mutations never fail: when a precondition is unmet they do nothing and
//! report why through [`Outcome`], which callers are free to ignore.

pub mod ids;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::io::kv::{KeyValueStore, KvError};
use crate::model::item::{Item, ItemPatch, NewItem};
use crate::model::list::{
    DEFAULT_LIST_NAME, NEW_LIST_NAME, ShoppingList, normalize_list_name,
};

use ids::IdGenerator;

/// Flat item sequence written by single-list versions
pub const LEGACY_ITEMS_KEY: &str = "shopping_list";
/// List name written by single-list versions
pub const LEGACY_NAME_KEY: &str = "shopping_list_name";
/// Item sequence written by the first release, read when
/// [`LEGACY_ITEMS_KEY`] is absent
pub const FIRST_RELEASE_ITEMS_KEY: &str = "lista_compras";
/// All lists, in display order
pub const LISTS_KEY: &str = "shopping_lists";
/// Id of the selected list
pub const CURRENT_LIST_KEY: &str = "current_list_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Ready,
}

/// Why a mutation did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotReady,
    NoCurrentList,
    NotFound,
    AlreadySelected,
    LastList,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotReady => write!(f, "store is not initialized"),
            SkipReason::NoCurrentList => write!(f, "no list is selected"),
            SkipReason::NotFound => write!(f, "not found"),
            SkipReason::AlreadySelected => write!(f, "already selected"),
            SkipReason::LastList => write!(f, "the last list cannot be deleted"),
        }
    }
}

/// Result of a mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T = ()> {
    Applied(T),
    Skipped(SkipReason),
}

impl<T> Outcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(value) => Some(value),
            Outcome::Skipped(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Outcome::Applied(_) => None,
            Outcome::Skipped(reason) => Some(*reason),
        }
    }
}

pub struct ListStore<S: KeyValueStore> {
    backend: S,
    lifecycle: Lifecycle,
    lists: Vec<ShoppingList>,
    selected: Option<i64>,
    ids: IdGenerator,
    write_error: Option<KvError>,
}

impl<S: KeyValueStore> ListStore<S> {
    /// Wrap a backend without touching it. Call [`init`](Self::init) next.
    pub fn new(backend: S) -> Self {
        ListStore {
            backend,
            lifecycle: Lifecycle::Uninitialized,
            lists: Vec::new(),
            selected: None,
            ids: IdGenerator::new(),
            write_error: None,
        }
    }

    /// Create and initialize in one step
    pub fn open(backend: S) -> Self {
        let mut store = Self::new(backend);
        store.init();
        store
    }

    /// Load persisted state. Calling it on a ready store does nothing.
    pub fn init(&mut self) {
        if self.lifecycle == Lifecycle::Ready {
            return;
        }
        if let Err(e) = self.backend.create() {
            warn!("could not open backend: {}", e);
        }
        self.lifecycle = Lifecycle::Ready;

        let saved: Option<Vec<ShoppingList>> = self.read(LISTS_KEY);
        if let Some(lists) = saved.filter(|l| !l.is_empty()) {
            self.adopt(lists);
            return;
        }
        self.migrate_legacy();
    }

    fn adopt(&mut self, lists: Vec<ShoppingList>) {
        for list in &lists {
            self.ids.observe(list.id);
            if let Some(max) = list.max_item_id() {
                self.ids.observe(max);
            }
        }
        let saved_current: Option<i64> = self.read(CURRENT_LIST_KEY);
        self.selected = match saved_current {
            Some(id) if lists.iter().any(|l| l.id == id) => Some(id),
            _ => lists.first().map(|l| l.id),
        };
        debug!(lists = lists.len(), selected = ?self.selected, "loaded lists");
        self.lists = lists;
    }

    fn migrate_legacy(&mut self) {
        let items: Vec<Item> = self
            .read(LEGACY_ITEMS_KEY)
            .or_else(|| self.read(FIRST_RELEASE_ITEMS_KEY))
            .unwrap_or_default();
        let name: Option<String> = self.read(LEGACY_NAME_KEY);
        for item in &items {
            self.ids.observe(item.id);
        }

        let name = normalize_list_name(name.as_deref().unwrap_or(""), DEFAULT_LIST_NAME);
        let list = ShoppingList::new(self.ids.next_id(), name, items);
        info!(
            list = %list.name,
            items = list.items.len(),
            "migrating single-list data"
        );
        self.selected = Some(list.id);
        self.lists = vec![list];
        self.save();
    }

    /// Read and decode a record; unreadable or malformed records count as absent.
    /// A record that doesn't decode is handed to the backend to keep before
    /// anything can overwrite it.
    fn read<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let value = match self.backend.get(key) {
            Ok(Some(Value::Null)) | Ok(None) => return None,
            Ok(Some(value)) => value,
            Err(e) => {
                warn!(key, "treating unreadable record as absent: {}", e);
                return None;
            }
        };
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(key, "treating malformed record as absent: {}", e);
                if let Err(e) = self.backend.preserve(key) {
                    warn!(key, "could not keep malformed record: {}", e);
                }
                None
            }
        }
    }

    fn save(&mut self) {
        if self.lifecycle != Lifecycle::Ready {
            return;
        }
        let records = [
            (LISTS_KEY, serde_json::to_value(&self.lists)),
            (CURRENT_LIST_KEY, serde_json::to_value(self.selected)),
        ];
        for (key, encoded) in records {
            let result = encoded
                .map_err(|e| KvError::EncodeError {
                    key: key.to_string(),
                    source: e,
                })
                .and_then(|value| self.backend.set(key, &value));
            if let Err(e) = result {
                warn!(key, "write failed: {}", e);
                self.write_error = Some(e);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle and backend access
    // -----------------------------------------------------------------------

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }

    /// The most recent failed write since the last call, if any
    pub fn take_write_error(&mut self) -> Option<KvError> {
        self.write_error.take()
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    // -----------------------------------------------------------------------
    // Lists
    // -----------------------------------------------------------------------

    pub fn lists(&self) -> &[ShoppingList] {
        &self.lists
    }

    pub fn current_list_id(&self) -> Option<i64> {
        self.selected
    }

    pub fn current_list(&self) -> Option<&ShoppingList> {
        let id = self.selected?;
        self.lists.iter().find(|l| l.id == id)
    }

    fn current_list_mut(&mut self) -> Option<&mut ShoppingList> {
        let id = self.selected?;
        self.lists.iter_mut().find(|l| l.id == id)
    }

    pub fn current_list_name(&self) -> &str {
        self.current_list()
            .map(|l| l.name.as_str())
            .unwrap_or(DEFAULT_LIST_NAME)
    }

    pub fn rename_current_list(&mut self, name: &str) -> Outcome {
        if !self.is_ready() {
            return Outcome::Skipped(SkipReason::NotReady);
        }
        let Some(list) = self.current_list_mut() else {
            return Outcome::Skipped(SkipReason::NoCurrentList);
        };
        list.name = normalize_list_name(name, DEFAULT_LIST_NAME);
        debug!(list = list.id, name = %list.name, "renamed list");
        self.save();
        Outcome::Applied(())
    }

    pub fn select_list(&mut self, id: i64) -> Outcome {
        if !self.is_ready() {
            return Outcome::Skipped(SkipReason::NotReady);
        }
        if self.selected == Some(id) {
            return Outcome::Skipped(SkipReason::AlreadySelected);
        }
        if !self.lists.iter().any(|l| l.id == id) {
            return Outcome::Skipped(SkipReason::NotFound);
        }
        self.selected = Some(id);
        debug!(list = id, "selected list");
        self.save();
        Outcome::Applied(())
    }

    /// Append a new empty list and select it
    pub fn create_list(&mut self, name: &str) -> Outcome<ShoppingList> {
        if !self.is_ready() {
            return Outcome::Skipped(SkipReason::NotReady);
        }
        let list = ShoppingList::new(
            self.ids.next_id(),
            normalize_list_name(name, NEW_LIST_NAME),
            Vec::new(),
        );
        debug!(list = list.id, name = %list.name, "created list");
        self.lists.push(list.clone());
        self.selected = Some(list.id);
        self.save();
        Outcome::Applied(list)
    }

    /// Remove a list. The last remaining list is never removed.
    pub fn delete_list(&mut self, id: i64) -> Outcome {
        if !self.is_ready() {
            return Outcome::Skipped(SkipReason::NotReady);
        }
        if self.lists.len() <= 1 {
            return Outcome::Skipped(SkipReason::LastList);
        }
        let Some(pos) = self.lists.iter().position(|l| l.id == id) else {
            return Outcome::Skipped(SkipReason::NotFound);
        };
        let removed = self.lists.remove(pos);
        if self.selected == Some(removed.id) {
            self.selected = self.lists.first().map(|l| l.id);
        }
        debug!(list = id, selected = ?self.selected, "deleted list");
        self.save();
        Outcome::Applied(())
    }

    // -----------------------------------------------------------------------
    // Items of the current list
    // -----------------------------------------------------------------------

    pub fn items(&self) -> &[Item] {
        self.current_list().map(|l| l.items.as_slice()).unwrap_or(&[])
    }

    /// Append an item to the current list, returning its id
    pub fn add_item(&mut self, new: NewItem) -> Outcome<i64> {
        if !self.is_ready() {
            return Outcome::Skipped(SkipReason::NotReady);
        }
        if self.current_list().is_none() {
            return Outcome::Skipped(SkipReason::NoCurrentList);
        }
        let id = self.ids.next_id();
        let item = Item::new(id, new.name, new.quantity, new.category);
        if let Some(list) = self.current_list_mut() {
            debug!(list = list.id, item = id, "added item");
            list.items.push(item);
        }
        self.save();
        Outcome::Applied(id)
    }

    pub fn remove_item(&mut self, id: i64) -> Outcome {
        self.with_current(|list| {
            let before = list.items.len();
            list.items.retain(|i| i.id != id);
            list.items.len() != before
        })
    }

    pub fn toggle_purchased(&mut self, id: i64) -> Outcome {
        self.with_current(|list| match list.find_item_mut(id) {
            Some(item) => {
                item.purchased = !item.purchased;
                true
            }
            None => false,
        })
    }

    pub fn clear_items(&mut self) -> Outcome {
        self.with_current(|list| {
            list.items.clear();
            true
        })
    }

    pub fn update_item(&mut self, id: i64, patch: &ItemPatch) -> Outcome {
        self.with_current(|list| match list.find_item_mut(id) {
            Some(item) => {
                item.apply(patch);
                true
            }
            None => false,
        })
    }

    /// Run `f` on the current list and save if it reports a change.
    fn with_current<F>(&mut self, f: F) -> Outcome
    where
        F: FnOnce(&mut ShoppingList) -> bool,
    {
        if !self.is_ready() {
            return Outcome::Skipped(SkipReason::NotReady);
        }
        let Some(list) = self.current_list_mut() else {
            return Outcome::Skipped(SkipReason::NoCurrentList);
        };
        if !f(list) {
            return Outcome::Skipped(SkipReason::NotFound);
        }
        self.save();
        Outcome::Applied(())
    }
}
