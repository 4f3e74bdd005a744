pub mod item;
pub mod list;
pub mod config;

pub use item::*;
pub use list::*;
pub use config::*;
