pub mod cache;
pub mod chain;
pub mod lift;
