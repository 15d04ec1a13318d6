//! Notification type definitions.

use std::time::Duration;

use notify_image::PixelBuffer;
use serde::Serialize;

/// Why a notification was closed.
///
/// Codes 1–3 come from the daemon's `NotificationClosed` signal; anything
/// else maps to `Undefined`. `ActionInvoked` is produced locally when an
/// action signal closes the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    Undefined,
    Expired,
    Dismissed,
    ClosedByRequest,
    ActionInvoked,
}

impl CloseReason {
    /// Decode a `NotificationClosed` reason code.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Expired,
            2 => Self::Dismissed,
            3 => Self::ClosedByRequest,
            _ => Self::Undefined,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Expired => "expired",
            Self::Dismissed => "dismissed",
            Self::ClosedByRequest => "closed_by_request",
            Self::ActionInvoked => "action_invoked",
        }
    }
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle events published to a notification's subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// The daemon accepted the request and assigned `id`.
    Shown { id: u32 },
    /// The daemon could not be reached or rejected the request.
    Error { message: String },
    Closed { reason: CloseReason },
    ActionInvoked { action: String },
}

/// Pre-defined icons, mapped to freedesktop icon names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationIcon {
    NoIcon,
    Information,
    Warning,
    Critical,
}

impl NotificationIcon {
    /// Icon name sent to the daemon, `None` for [`NotificationIcon::NoIcon`].
    pub fn icon_name(&self) -> Option<&'static str> {
        match self {
            Self::NoIcon => None,
            Self::Information => Some("dialog-information"),
            Self::Warning => Some("dialog-warning"),
            Self::Critical => Some("dialog-critical"),
        }
    }

    /// Parse a preset name (`information`, `warning`, `critical`, `none`).
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "none" => Some(Self::NoIcon),
            "information" | "info" => Some(Self::Information),
            "warning" | "warn" => Some(Self::Warning),
            "critical" | "error" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// How long the daemon keeps a notification on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Let the daemon decide.
    #[default]
    Default,
    /// Keep the notification until it is dismissed.
    Never,
    Milliseconds(u32),
}

impl Timeout {
    /// Wire value: `-1` for the daemon default, `0` for never.
    pub fn as_wire(&self) -> i32 {
        match self {
            Self::Default => -1,
            Self::Never => 0,
            Self::Milliseconds(ms) => i32::try_from(*ms).unwrap_or(i32::MAX),
        }
    }

    /// Inverse of [`Timeout::as_wire`]; negative values mean the daemon default.
    pub fn from_wire(ms: i32) -> Self {
        match ms {
            0 => Self::Never,
            ms if ms < 0 => Self::Default,
            ms => Self::Milliseconds(ms as u32),
        }
    }
}

impl From<Duration> for Timeout {
    fn from(d: Duration) -> Self {
        match u32::try_from(d.as_millis()) {
            Ok(0) => Self::Never,
            Ok(ms) => Self::Milliseconds(ms),
            Err(_) => Self::Milliseconds(u32::MAX),
        }
    }
}

/// A typed hint value.
#[derive(Debug, Clone, PartialEq)]
pub enum HintValue {
    Bool(bool),
    Byte(u8),
    Int32(i32),
    UInt32(u32),
    String(String),
    Image(PixelBuffer),
}

impl From<bool> for HintValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u8> for HintValue {
    fn from(v: u8) -> Self {
        Self::Byte(v)
    }
}

impl From<i32> for HintValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<u32> for HintValue {
    fn from(v: u32) -> Self {
        Self::UInt32(v)
    }
}

impl From<String> for HintValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for HintValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<PixelBuffer> for HintValue {
    fn from(v: PixelBuffer) -> Self {
        Self::Image(v)
    }
}
