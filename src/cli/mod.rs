//! Command-line host

pub mod commands;

pub use commands::*;
