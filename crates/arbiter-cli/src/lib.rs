//! Arbiter CLI library.
//!
//! Command-line interface and composition root for the claim arbitration
//! pipeline: all services are constructed here, once, and passed by
//! reference into the pipeline. No module-level singletons.

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
