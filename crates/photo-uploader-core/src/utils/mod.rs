//! Formatting helpers shared by the library and the CLI.

pub mod format;

pub use format::*;
