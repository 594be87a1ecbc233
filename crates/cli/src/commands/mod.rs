//! CLI command implementations.

pub mod migrate;
pub mod parse;
pub mod show;
pub mod sign;
