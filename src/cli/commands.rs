use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bk", about = concat!("basket v", env!("CARGO_PKG_VERSION"), " - shopping lists in your terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,

    /// Log store activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the current list grouped by category (default)
    Show(ShowArgs),
    /// List all shopping lists
    Lists,
    /// Create a new list and switch to it
    New(NewArgs),
    /// Switch to another list
    Use(UseArgs),
    /// Rename the current list
    Rename(RenameArgs),
    /// Delete a list (the last one is kept)
    Drop(DropArgs),
    /// Add an item to the current list
    Add(AddArgs),
    /// Remove an item
    Rm(ItemIdArg),
    /// Toggle an item between purchased and not purchased
    Check(ItemIdArg),
    /// Change an item's name, quantity, or category
    Edit(EditArgs),
    /// Remove every item from the current list
    Clear,
    /// Print the current list as a shareable checklist
    Share,
    /// List categories, or add a custom one
    Categories(CategoriesCmd),
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args, Default)]
pub struct ShowArgs {
    /// Only items in this category
    #[arg(long, short = 'c')]
    pub category: Option<String>,
    /// Hide purchased items
    #[arg(long, conflicts_with = "all")]
    pub pending: bool,
    /// Show purchased items even if the config hides them
    #[arg(long)]
    pub all: bool,
    /// Only items whose name contains this text
    #[arg(long, short = 's')]
    pub search: Option<String>,
    /// One line per item, sorted by category then name, without group headers
    #[arg(long)]
    pub flat: bool,
}

// ---------------------------------------------------------------------------
// List command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct NewArgs {
    /// Name of the new list
    #[arg(default_value = "")]
    pub name: String,
}

#[derive(Args)]
pub struct UseArgs {
    /// List ID or exact list name
    pub list: String,
}

#[derive(Args)]
pub struct RenameArgs {
    /// New name (blank resets to "Shopping List")
    pub name: String,
}

#[derive(Args)]
pub struct DropArgs {
    /// List ID or exact list name
    pub list: String,
}

// ---------------------------------------------------------------------------
// Item command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Item name
    pub name: String,
    /// How many to buy
    #[arg(long = "qty", short = 'q', default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub quantity: u32,
    /// Category (default from config, usually "General")
    #[arg(long, short = 'c')]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct ItemIdArg {
    /// Item ID
    pub id: i64,
}

#[derive(Args)]
pub struct EditArgs {
    /// Item ID
    pub id: i64,
    /// New name
    #[arg(long)]
    pub name: Option<String>,
    /// New quantity
    #[arg(long = "qty", short = 'q', value_parser = clap::value_parser!(u32).range(1..))]
    pub quantity: Option<u32>,
    /// New category
    #[arg(long, short = 'c')]
    pub category: Option<String>,
}

// ---------------------------------------------------------------------------
// Category args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct CategoriesCmd {
    #[command(subcommand)]
    pub action: Option<CategoryAction>,
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// Add a custom category
    Add(CategoryAddArgs),
}

#[derive(Args)]
pub struct CategoryAddArgs {
    /// Category name
    pub name: String,
}
