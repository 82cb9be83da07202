//! Chat relay backends.

pub mod memory;
