//! CLI command implementations.

pub mod demos;
pub mod lower;
pub mod version;
