//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use desktop_notify::{HintValue, NotificationIcon};

#[derive(Debug, Parser)]
#[command(name = "notifyctl")]
#[command(version)]
#[command(about = "Send and track desktop notifications over D-Bus")]
pub struct Cli {
    /// D-Bus address to use instead of the session bus
    #[arg(long, global = true)]
    pub bus_address: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show a single notification
    Send(SendArgs),
    /// Show stdin line by line as a growing bulleted notification
    Pipe(PipeArgs),
    /// Print the daemon's capabilities
    Capabilities {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Args)]
pub struct SendArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub body: Option<String>,

    /// Icon name or one of the presets information, warning, critical
    #[arg(long)]
    pub icon: Option<String>,

    /// Image file attached as raw pixel data
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Milliseconds; -1 lets the daemon decide, 0 never expires
    #[arg(long, allow_hyphen_values = true)]
    pub timeout: Option<i32>,

    /// Action as ID=LABEL, repeatable
    #[arg(long = "action", value_parser = parse_key_value)]
    pub actions: Vec<(String, String)>,

    /// Hint as KEY=VALUE, repeatable
    #[arg(long = "hint", value_parser = parse_key_value)]
    pub hints: Vec<(String, String)>,

    #[arg(long)]
    pub app_name: Option<String>,

    /// Wait until the notification is closed and print why
    #[arg(long)]
    pub wait: bool,
}

#[derive(Debug, Clone, Args)]
pub struct PipeArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub icon: Option<String>,
}

/// Parse `KEY=VALUE`; the value may itself contain `=`.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Map a preset name to its icon, passing other names through.
pub fn resolve_icon(name: &str) -> String {
    match NotificationIcon::from_preset(name) {
        Some(icon) => icon.icon_name().unwrap_or_default().to_string(),
        None => name.to_string(),
    }
}

/// Type a hint value from its command-line text.
///
/// `urgency` is a byte on the wire; otherwise booleans and integers are
/// recognised and anything else is sent as a string.
pub fn parse_hint_value(key: &str, value: &str) -> HintValue {
    if key == "urgency" {
        if let Ok(level) = value.parse::<u8>() {
            return HintValue::Byte(level);
        }
    }
    match value {
        "true" => HintValue::Bool(true),
        "false" => HintValue::Bool(false),
        _ => match value.parse::<i32>() {
            Ok(n) => HintValue::Int32(n),
            Err(_) => HintValue::String(value.to_string()),
        },
    }
}
