//! Process-scoped notification service.
//!
//! Bundles the transport, the identifier registry, the defaults and the
//! tokio runtime on which replies and signals are delivered. Cheap to clone;
//! every [`Notification`] carries a clone.

use std::future::Future;
use std::sync::{Arc, Weak};

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::capabilities::Capabilities;
use crate::notification::{CloseReason, Notification, NotificationEvent, Shared};
use crate::options::NotifierOptions;
use crate::registry::Registry;
use crate::transport::{DaemonSignal, DbusTransport, Transport};
use crate::{NotifyError, Result};

#[derive(Clone)]
pub struct Notifier {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    registry: Registry<Shared>,
    options: NotifierOptions,
    runtime: Handle,
}

impl Notifier {
    /// Build a notifier over `transport`.
    ///
    /// Must be called from within a tokio runtime; replies are delivered on it.
    pub fn new(transport: Arc<dyn Transport>, options: NotifierOptions) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| NotifyError::NoRuntime)?;
        Ok(Self {
            inner: Arc::new(Inner {
                transport,
                registry: Registry::new(),
                options,
                runtime,
            }),
        })
    }

    /// Connect to the daemon over D-Bus and start routing its signals.
    pub async fn connect(options: NotifierOptions) -> Result<Self> {
        let (transport, signals) = DbusTransport::connect(options.bus_address.as_deref()).await?;
        let notifier = Self::new(Arc::new(transport), options)?;
        notifier.listen(signals);
        Ok(notifier)
    }

    /// Route daemon signals from `signals` to the owning notifications.
    ///
    /// The listener only holds a weak reference and stops once the last
    /// clone of the notifier is gone or the channel closes.
    pub fn listen(&self, mut signals: mpsc::Receiver<DaemonSignal>) -> JoinHandle<()> {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        self.inner.runtime.spawn(async move {
            while let Some(signal) = signals.recv().await {
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                Notifier { inner }.handle_signal(signal);
            }
            tracing::debug!("Daemon signal listener stopped");
        })
    }

    pub fn handle_signal(&self, signal: DaemonSignal) {
        match signal {
            DaemonSignal::NotificationClosed { id, reason } => {
                self.handle_notification_closed(id, reason)
            }
            DaemonSignal::ActionInvoked { id, action } => {
                self.handle_action_invoked(id, &action)
            }
        }
    }

    /// `NotificationClosed(id, reason)`. Unknown identifiers are ignored.
    pub fn handle_notification_closed(&self, id: u32, reason_code: u32) {
        let reason = CloseReason::from_code(reason_code);
        let owner = {
            let mut registry = self.inner.registry.lock();
            let Some(owner) = registry.take(id) else {
                tracing::trace!(id, reason_code, "Ignoring close of unknown notification");
                return;
            };
            owner.mark_closed(id, reason);
            owner
        };
        owner.emit(NotificationEvent::Closed { reason });
    }

    /// `ActionInvoked(id, action)`. The notification is treated as closed and
    /// the daemon is asked to remove it.
    pub fn handle_action_invoked(&self, id: u32, action: &str) {
        let owner = {
            let mut registry = self.inner.registry.lock();
            let Some(owner) = registry.take(id) else {
                tracing::trace!(id, action, "Ignoring action on unknown notification");
                return;
            };
            owner.mark_closed(id, CloseReason::ActionInvoked);
            owner
        };
        tracing::info!(id, action, "Notification action invoked");
        owner.emit(NotificationEvent::ActionInvoked {
            action: action.to_string(),
        });
        owner.emit(NotificationEvent::Closed {
            reason: CloseReason::ActionInvoked,
        });
        self.close_in_background(id);
    }

    pub fn is_available(&self) -> bool {
        self.inner.transport.is_available()
    }

    pub fn options(&self) -> &NotifierOptions {
        &self.inner.options
    }

    /// Whether a live notification currently owns `id`.
    pub fn is_registered(&self, id: u32) -> bool {
        self.inner.registry.contains(id)
    }

    /// Create a notification with the notifier's defaults.
    pub fn notification(&self, title: impl Into<String>) -> Notification {
        Notification::new(self, title)
    }

    /// Ask the daemon for its capabilities and hand them to `callback`.
    ///
    /// Returns `false` without dispatching when the daemon is unavailable.
    /// A failed query yields an empty set.
    pub fn query_capabilities<F>(&self, callback: F) -> bool
    where
        F: FnOnce(Capabilities) + Send + 'static,
    {
        if !self.is_available() {
            tracing::warn!("Capability query skipped, daemon unavailable");
            return false;
        }
        let reply = self.inner.transport.get_capabilities();
        self.spawn(async move {
            let caps = match reply.await {
                Ok(tokens) => Capabilities::from(tokens),
                Err(e) => {
                    tracing::warn!(error = %e, "GetCapabilities failed");
                    Capabilities::default()
                }
            };
            callback(caps);
        });
        true
    }

    /// Awaitable capability query.
    pub async fn capabilities(&self) -> Result<Capabilities> {
        if !self.is_available() {
            return Err(NotifyError::TransportUnavailable);
        }
        let tokens = self.inner.transport.get_capabilities().await?;
        Ok(Capabilities::from(tokens))
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.inner.transport.as_ref()
    }

    pub(crate) fn registry(&self) -> &Registry<Shared> {
        &self.inner.registry
    }

    pub(crate) fn spawn<F>(&self, future: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.inner.runtime.spawn(future)
    }

    /// Fire-and-forget `CloseNotification`; failures are only logged.
    pub(crate) fn close_in_background(&self, id: u32) {
        let close = self.inner.transport.close_notification(id);
        self.spawn(async move {
            if let Err(e) = close.await {
                tracing::debug!(id, error = %e, "CloseNotification failed");
            }
        });
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("options", &self.inner.options)
            .field("registered", &self.inner.registry.len())
            .finish()
    }
}
