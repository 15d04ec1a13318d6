//! Command-line front end for desktop notifications.
//!
//! Parses arguments, loads `.env`/environment configuration and drives
//! [`desktop_notify::Notifier`] for the `send`, `pipe` and `capabilities`
//! subcommands.

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Command};
pub use config::AppConfig;

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber, filtered by `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
