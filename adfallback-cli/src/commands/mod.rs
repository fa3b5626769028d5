//! CLI command implementations.

pub mod common;
pub mod simulate;
pub mod sizes;
pub mod validate;
