pub mod executor;
pub mod token;
