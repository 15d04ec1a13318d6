//! The seam between the lifecycle logic and the IPC channel to the daemon.
//!
//! [`Transport`] covers the three outbound calls; inbound daemon signals are
//! delivered separately as [`DaemonSignal`]s over an `mpsc` channel that
//! [`crate::Notifier::listen`] consumes.

pub mod dbus;

use std::collections::BTreeMap;

use futures::future::BoxFuture;

use crate::Result;
use crate::notification::HintValue;

pub use dbus::DbusTransport;

/// Everything a `Notify` call carries.
#[derive(Debug, Clone, PartialEq)]
pub struct NotifyRequest {
    pub app_name: String,
    /// Identifier to replace, `0` for a new notification.
    pub replaces_id: u32,
    pub icon: String,
    pub summary: String,
    pub body: String,
    /// Ordered (action id, label) pairs.
    pub actions: Vec<(String, String)>,
    pub hints: BTreeMap<String, HintValue>,
    /// Milliseconds; `-1` lets the daemon decide, `0` never expires.
    pub expire_timeout: i32,
}

impl NotifyRequest {
    /// Actions flattened into the `[id, label, id, label, ...]` wire form.
    pub fn flattened_actions(&self) -> Vec<&str> {
        self.actions
            .iter()
            .flat_map(|(id, label)| [id.as_str(), label.as_str()])
            .collect()
    }
}

/// A signal emitted by the daemon, keyed by notification identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonSignal {
    NotificationClosed { id: u32, reason: u32 },
    ActionInvoked { id: u32, action: String },
}

/// Outbound calls to the notification daemon.
///
/// Calls return `'static` futures so the caller can hand them to a spawned
/// task and return immediately; the reply is observed when the future
/// resolves.
pub trait Transport: Send + Sync {
    /// Whether the daemon is reachable right now.
    fn is_available(&self) -> bool;

    /// `Notify`, resolving to the identifier the daemon assigned.
    fn notify(&self, request: NotifyRequest) -> BoxFuture<'static, Result<u32>>;

    /// `CloseNotification`. Closing an unknown identifier is harmless.
    fn close_notification(&self, id: u32) -> BoxFuture<'static, Result<()>>;

    /// `GetCapabilities`.
    fn get_capabilities(&self) -> BoxFuture<'static, Result<Vec<String>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flattened_actions_preserve_order() {
        let request = NotifyRequest {
            app_name: "app".into(),
            replaces_id: 0,
            icon: String::new(),
            summary: "title".into(),
            body: String::new(),
            actions: vec![
                ("retry".into(), "Retry".into()),
                ("default".into(), "Open".into()),
            ],
            hints: BTreeMap::new(),
            expire_timeout: -1,
        };
        assert_eq!(
            request.flattened_actions(),
            vec!["retry", "Retry", "default", "Open"]
        );
    }
}
