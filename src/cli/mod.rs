//! Command-line interface module.

mod args;
pub mod query;
pub mod run;

pub use args::{Cli, Commands};
