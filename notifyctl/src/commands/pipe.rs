//! `notifyctl pipe`: feed input lines into one growing notification.

use anyhow::bail;
use desktop_notify::{Notification, NotificationEvent, Notifier};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::cli::{PipeArgs, resolve_icon};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeOutcome {
    /// Non-empty lines consumed.
    pub lines: usize,
    pub id: Option<u32>,
    pub body: String,
}

pub async fn run<R>(notifier: &Notifier, args: PipeArgs, input: R) -> anyhow::Result<PipeOutcome>
where
    R: AsyncBufRead + Unpin,
{
    let icon = args.icon.as_deref().map(resolve_icon).unwrap_or_default();
    let timeout = notifier.options().default_timeout;
    let mut notification = Notification::with_icon_name(notifier, args.title, icon, timeout);
    let mut events = notification.subscribe();

    let mut count = 0;
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if !notification.update(line) {
            bail!("Notification daemon is not available");
        }
        count += 1;
        check_failures(&mut events)?;
    }

    // Coalesced lines go out with the follow-up request
    while notification.is_pending() {
        match events.recv().await {
            Ok(NotificationEvent::Error { message }) => bail!("Notification failed: {message}"),
            Ok(_) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => break,
        }
    }

    let outcome = PipeOutcome {
        lines: count,
        id: notification.id(),
        body: notification.body(),
    };
    notification.detach();
    Ok(outcome)
}

fn check_failures(events: &mut broadcast::Receiver<NotificationEvent>) -> anyhow::Result<()> {
    loop {
        match events.try_recv() {
            Ok(NotificationEvent::Error { message }) => bail!("Notification failed: {message}"),
            Ok(_) | Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(()),
        }
    }
}
