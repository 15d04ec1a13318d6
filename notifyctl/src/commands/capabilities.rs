//! `notifyctl capabilities`.

use anyhow::Context;
use desktop_notify::{Capabilities, Notifier};

pub async fn run(notifier: &Notifier, json: bool) -> anyhow::Result<String> {
    let caps = notifier
        .capabilities()
        .await
        .context("Failed to query daemon capabilities")?;
    tracing::debug!(count = caps.len(), "Capabilities received");
    render(&caps, json)
}

/// One token per line, or a JSON array.
pub fn render(caps: &Capabilities, json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(caps)?);
    }
    Ok(caps.iter().collect::<Vec<_>>().join("\n"))
}
