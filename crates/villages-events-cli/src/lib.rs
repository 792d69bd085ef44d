//! villages-events command-line front end: flags, config file, logging and
//! exit codes around the `villages_events` pipeline.

pub mod app;
pub mod cli;
pub mod config;

pub use app::execute;
pub use cli::Cli;
pub use config::{load_file, resolve, resolve_config_path, Settings};
