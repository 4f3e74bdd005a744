//! Shopping lists kept in a local key-value store.
//!
//! [`store::ListStore`] owns every list and is the only writer to the
//! backend; [`ops`] holds the read-only views (filtering, grouping, share
//! text) that front ends build on top of it.

pub mod cli;
pub mod io;
pub mod model;
pub mod ops;
pub mod store;
pub mod util;
