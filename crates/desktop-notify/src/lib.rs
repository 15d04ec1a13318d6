//! Desktop notifications over the freedesktop notification protocol.
//!
//! Tracks each notification's lifecycle against the identifier the daemon
//! assigns asynchronously, coalesces updates issued while a request is in
//! flight, and routes the daemon's `NotificationClosed` / `ActionInvoked`
//! signals back to the owning [`Notification`].

pub mod capabilities;
pub mod notification;
pub mod notifier;
pub mod options;
pub mod registry;
pub mod transport;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use capabilities::Capabilities;
pub use notification::{
    CloseReason, HintValue, LifecycleState, Notification, NotificationEvent, NotificationIcon,
    Timeout,
};
pub use notifier::Notifier;
pub use options::NotifierOptions;
pub use transport::{DaemonSignal, NotifyRequest, Transport};

/// Well-known bus name of the notification daemon.
pub const NOTIFICATIONS_BUS: &str = "org.freedesktop.Notifications";

/// Object path of the notification daemon.
pub const NOTIFICATIONS_PATH: &str = "/org/freedesktop/Notifications";

/// Hint key carrying raw image data.
pub const IMAGE_DATA_HINT: &str = "image-data";

/// Pre-1.2 spelling of [`IMAGE_DATA_HINT`], still read for compatibility.
pub const LEGACY_IMAGE_DATA_HINT: &str = "image_data";

/// Errors that can occur while talking to the notification daemon.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notification daemon is not available")]
    TransportUnavailable,

    #[error("D-Bus error: {0}")]
    Dbus(#[from] zbus::Error),

    #[error("Daemon reply error: {0}")]
    Reply(String),

    #[error("No tokio runtime available to deliver replies")]
    NoRuntime,
}

/// Result type alias for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;
