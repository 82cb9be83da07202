pub mod store;
pub mod tracker;
