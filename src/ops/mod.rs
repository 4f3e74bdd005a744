pub mod share;
pub mod view;
