//! Subcommand implementations.

pub mod capabilities;
pub mod pipe;
pub mod send;

#[cfg(test)]
pub(crate) mod testing;

use anyhow::bail;
use desktop_notify::{NotificationEvent, Notifier};
use tokio::io::BufReader;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::cli::Command;

/// Run `command` and print its result to stdout.
pub async fn run(notifier: &Notifier, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Send(args) => {
            let outcome = send::run(notifier, args).await?;
            println!("{}", outcome.id);
            if let Some(action) = &outcome.action {
                println!("action: {action}");
            }
            if let Some(reason) = outcome.reason {
                println!("closed: {reason}");
            }
        }
        Command::Pipe(args) => {
            let stdin = BufReader::new(tokio::io::stdin());
            let outcome = pipe::run(notifier, args, stdin).await?;
            tracing::info!(lines = outcome.lines, "Input exhausted");
            if let Some(id) = outcome.id {
                println!("{id}");
            }
        }
        Command::Capabilities { json } => {
            println!("{}", capabilities::run(notifier, json).await?);
        }
    }
    Ok(())
}

/// Wait for the daemon to assign an identifier.
pub(crate) async fn wait_until_shown(
    events: &mut broadcast::Receiver<NotificationEvent>,
) -> anyhow::Result<u32> {
    loop {
        match events.recv().await {
            Ok(NotificationEvent::Shown { id }) => return Ok(id),
            Ok(NotificationEvent::Error { message }) => bail!("Notification failed: {message}"),
            Ok(_) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => bail!("Notification dropped before it was shown"),
        }
    }
}
