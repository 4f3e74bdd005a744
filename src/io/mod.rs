pub mod config_io;
pub mod file_store;
pub mod kv;
pub mod lock;
pub mod paths;
