//! `notifyctl` binary.

use anyhow::{Context, bail};
use clap::Parser;
use desktop_notify::Notifier;

use notifyctl::{AppConfig, Cli, commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    notifyctl::init_tracing();

    let cli = Cli::parse();
    let mut config = AppConfig::load();
    if let Some(address) = &cli.bus_address {
        config.bus_address = Some(address.clone());
    }
    tracing::debug!(?config, "Configuration loaded");

    let notifier = Notifier::connect(config.notifier_options())
        .await
        .context("Failed to connect to D-Bus")?;
    if !notifier.is_available() {
        bail!("Notification daemon is not available");
    }

    commands::run(&notifier, cli.command).await
}
