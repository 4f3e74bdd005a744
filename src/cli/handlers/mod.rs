use std::error::Error;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::file_store::FileStore;
use crate::io::lock::DataLock;
use crate::io::paths;
use crate::model::item::{ItemPatch, NewItem};
use crate::ops::share::share_text;
use crate::ops::view::{self, Filter};
use crate::store::{ListStore, Outcome, SkipReason};
use crate::util::unicode::display_width;

type CmdResult = Result<(), Box<dyn Error>>;

/// Per-invocation state shared by every handler
pub struct Session {
    pub data_dir: PathBuf,
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let session = Session {
        data_dir: paths::data_dir(cli.data_dir.as_deref().map(Path::new)),
        json: cli.json,
    };
    debug!(data_dir = %session.data_dir.display(), "dispatching");

    match cli.command.unwrap_or_else(|| Commands::Show(ShowArgs::default())) {
        // Read commands
        Commands::Show(args) => cmd_show(&session, args),
        Commands::Lists => cmd_lists(&session),
        Commands::Share => cmd_share(&session),
        Commands::Categories(args) => match args.action {
            None => cmd_categories(&session),
            Some(CategoryAction::Add(add)) => cmd_category_add(&session, add),
        },

        // List commands
        Commands::New(args) => cmd_new(&session, args),
        Commands::Use(args) => cmd_use(&session, args),
        Commands::Rename(args) => cmd_rename(&session, args),
        Commands::Drop(args) => cmd_drop(&session, args),

        // Item commands
        Commands::Add(args) => cmd_add(&session, args),
        Commands::Rm(args) => cmd_rm(&session, args),
        Commands::Check(args) => cmd_check(&session, args),
        Commands::Edit(args) => cmd_edit(&session, args),
        Commands::Clear => cmd_clear(&session),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Lock the data directory and load the store. The lock must outlive the store.
fn open_store(session: &Session) -> Result<(DataLock, ListStore<FileStore>), Box<dyn Error>> {
    let lock = DataLock::acquire_default(&session.data_dir)?;
    let mut store = ListStore::open(FileStore::new(&session.data_dir));
    // First run writes the migrated lists; surface a failure there right away
    if let Some(e) = store.take_write_error() {
        return Err(e.into());
    }
    Ok((lock, store))
}

/// Report a failed flush from the last mutation
fn flush_result(store: &mut ListStore<FileStore>) -> CmdResult {
    match store.take_write_error() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Turn a skipped mutation into an error message naming `what`
fn require<T>(outcome: Outcome<T>, what: &str) -> Result<T, Box<dyn Error>> {
    match outcome {
        Outcome::Applied(value) => Ok(value),
        Outcome::Skipped(SkipReason::NotFound) => Err(format!("{} not found", what).into()),
        Outcome::Skipped(reason) => Err(reason.to_string().into()),
    }
}

/// Find a list by ID, then by exact name, then by case-insensitive name.
fn resolve_list(store: &ListStore<FileStore>, query: &str) -> Result<i64, Box<dyn Error>> {
    let lists = store.lists();
    if let Ok(id) = query.parse::<i64>()
        && lists.iter().any(|l| l.id == id)
    {
        return Ok(id);
    }
    if let Some(list) = lists.iter().find(|l| l.name == query) {
        return Ok(list.id);
    }
    let folded: Vec<i64> = lists
        .iter()
        .filter(|l| l.name.to_lowercase() == query.to_lowercase())
        .map(|l| l.id)
        .collect();
    match folded.len() {
        0 => Err(format!("list not found: {}", query).into()),
        1 => Ok(folded[0]),
        n => Err(format!(
            "ambiguous: {} lists named \"{}\". Use the list ID instead.",
            n, query
        )
        .into()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_show(session: &Session, args: ShowArgs) -> CmdResult {
    let (_lock, store) = open_store(session)?;
    let (config, _) = config_io::read_config(&session.data_dir)?;

    let pending_only = args.pending || (config.display.hide_purchased && !args.all);
    let filter = Filter::new()
        .category(args.category)
        .pending_only(pending_only)
        .search(args.search.as_deref());

    let all_items = store.items();
    let list_totals = view::totals(all_items);
    let mut visible = filter.apply(all_items);

    if args.flat {
        view::sort_items(&mut visible);
        if session.json {
            return print_json(&ShowJson {
                id: store.current_list_id(),
                name: store.current_list_name().to_string(),
                totals: totals_to_json(list_totals),
                groups: None,
                items: Some(visible.iter().map(|i| item_to_json(i)).collect()),
            });
        }
        println!(
            "{}  ({})",
            store.current_list_name(),
            format_totals(list_totals)
        );
        let width = name_width(visible.iter().copied());
        let category_width = visible
            .iter()
            .map(|i| display_width(i.category_or_default()))
            .max()
            .unwrap_or(0);
        for item in &visible {
            println!("{}", format_flat_item_line(item, width, category_width));
        }
        return Ok(());
    }

    let groups = view::group_by_category(&visible);
    if session.json {
        return print_json(&ShowJson {
            id: store.current_list_id(),
            name: store.current_list_name().to_string(),
            totals: totals_to_json(list_totals),
            groups: Some(groups.iter().map(group_to_json).collect()),
            items: None,
        });
    }
    for line in format_groups(store.current_list_name(), list_totals, &groups) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_lists(session: &Session) -> CmdResult {
    let (_lock, store) = open_store(session)?;
    let current = store.current_list_id();
    if session.json {
        let infos: Vec<ListInfoJson> = store
            .lists()
            .iter()
            .map(|l| list_to_json(l, current))
            .collect();
        return print_json(&infos);
    }
    for line in format_lists(store.lists(), current) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_share(session: &Session) -> CmdResult {
    let (_lock, store) = open_store(session)?;
    let list = store.current_list().ok_or("no list is selected")?;
    if session.json {
        return print_json(&serde_json::json!({ "text": share_text(list) }));
    }
    print!("{}", share_text(list));
    Ok(())
}

fn cmd_categories(session: &Session) -> CmdResult {
    let _lock = DataLock::acquire_default(&session.data_dir)?;
    let (config, _) = config_io::read_config(&session.data_dir)?;
    let categories = view::categories(&config);
    if session.json {
        return print_json(&categories);
    }
    for category in categories {
        let marker = if category == config.categories.default {
            " (default)"
        } else {
            ""
        };
        println!("{}{}", category, marker);
    }
    Ok(())
}

fn cmd_category_add(session: &Session, args: CategoryAddArgs) -> CmdResult {
    let name = args.name.trim();
    if name.is_empty() {
        return Err("category name is empty".into());
    }
    let _lock = DataLock::acquire_default(&session.data_dir)?;
    let (config, mut doc) = config_io::read_config(&session.data_dir)?;
    if config.has_category(name) {
        println!("category already exists: {}", name);
        return Ok(());
    }
    config_io::add_custom_category(&mut doc, name);
    config_io::write_config(&session.data_dir, &doc)?;
    println!("{}", name);
    Ok(())
}

// ---------------------------------------------------------------------------
// List commands
// ---------------------------------------------------------------------------

fn cmd_new(session: &Session, args: NewArgs) -> CmdResult {
    let (_lock, mut store) = open_store(session)?;
    let list = require(store.create_list(&args.name), "list")?;
    flush_result(&mut store)?;
    if session.json {
        return print_json(&list_to_json(&list, Some(list.id)));
    }
    println!("{}  {}", list.id, list.name);
    Ok(())
}

fn cmd_use(session: &Session, args: UseArgs) -> CmdResult {
    let (_lock, mut store) = open_store(session)?;
    let id = resolve_list(&store, &args.list)?;
    match store.select_list(id) {
        Outcome::Applied(()) | Outcome::Skipped(SkipReason::AlreadySelected) => {}
        other => {
            require(other, "list")?;
        }
    }
    flush_result(&mut store)?;
    println!("{}", store.current_list_name());
    Ok(())
}

fn cmd_rename(session: &Session, args: RenameArgs) -> CmdResult {
    let (_lock, mut store) = open_store(session)?;
    require(store.rename_current_list(&args.name), "list")?;
    flush_result(&mut store)?;
    println!("{}", store.current_list_name());
    Ok(())
}

fn cmd_drop(session: &Session, args: DropArgs) -> CmdResult {
    let (_lock, mut store) = open_store(session)?;
    let id = resolve_list(&store, &args.list)?;
    require(store.delete_list(id), "list")?;
    flush_result(&mut store)?;
    println!("deleted {}; now on {}", id, store.current_list_name());
    Ok(())
}

// ---------------------------------------------------------------------------
// Item commands
// ---------------------------------------------------------------------------

fn cmd_add(session: &Session, args: AddArgs) -> CmdResult {
    let name = args.name.trim();
    if name.is_empty() {
        return Err("item name is empty".into());
    }
    let (_lock, mut store) = open_store(session)?;
    let (config, _) = config_io::read_config(&session.data_dir)?;
    let category = args
        .category
        .unwrap_or_else(|| config.categories.default.clone());
    let new = NewItem::named(name)
        .quantity(args.quantity)
        .category(category);
    let id = require(store.add_item(new), "list")?;
    flush_result(&mut store)?;
    println!("{}", id);
    Ok(())
}

fn cmd_rm(session: &Session, args: ItemIdArg) -> CmdResult {
    let (_lock, mut store) = open_store(session)?;
    require(store.remove_item(args.id), &format!("item {}", args.id))?;
    flush_result(&mut store)
}

fn cmd_check(session: &Session, args: ItemIdArg) -> CmdResult {
    let (_lock, mut store) = open_store(session)?;
    require(store.toggle_purchased(args.id), &format!("item {}", args.id))?;
    flush_result(&mut store)?;
    if let Some(item) = store.current_list().and_then(|l| l.find_item(args.id)) {
        if session.json {
            return print_json(&item_to_json(item));
        }
        println!("{}", format_item_line(item, display_width(&item.name)));
    }
    Ok(())
}

fn cmd_edit(session: &Session, args: EditArgs) -> CmdResult {
    let patch = ItemPatch {
        name: args
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        quantity: args.quantity,
        category: args.category,
    };
    if patch.is_empty() {
        return Err("nothing to change: pass --name, --qty, or --category".into());
    }
    let (_lock, mut store) = open_store(session)?;
    require(store.update_item(args.id, &patch), &format!("item {}", args.id))?;
    flush_result(&mut store)?;
    if let Some(item) = store.current_list().and_then(|l| l.find_item(args.id)) {
        if session.json {
            return print_json(&item_to_json(item));
        }
        println!("{}", format_item_line(item, display_width(&item.name)));
    }
    Ok(())
}

fn cmd_clear(session: &Session) -> CmdResult {
    let (_lock, mut store) = open_store(session)?;
    let count = store.items().len();
    require(store.clear_items(), "list")?;
    flush_result(&mut store)?;
    println!("removed {} item(s) from {}", count, store.current_list_name());
    Ok(())
}
