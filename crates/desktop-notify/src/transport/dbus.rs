//! zbus transport for `org.freedesktop.Notifications`.
//!
//! Owns the session-bus proxy, forwards `NotificationClosed` and
//! `ActionInvoked` signals into an `mpsc` channel, and tracks whether the
//! daemon's bus name is owned (or activatable) so availability can be
//! answered synchronously.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;
use futures::future::BoxFuture;
use notify_image::PixelBuffer;
use tokio::sync::mpsc;
use zbus::Connection;
use zbus::fdo::{DBusProxy, NameOwnerChangedStream};
use zbus::names::BusName;
use zbus::zvariant::{OwnedValue, Value};

use super::{DaemonSignal, NotifyRequest, Transport};
use crate::notification::HintValue;
use crate::{NOTIFICATIONS_BUS, Result};

const SIGNAL_CHANNEL_CAPACITY: usize = 64;

#[zbus::proxy(
    interface = "org.freedesktop.Notifications",
    default_service = "org.freedesktop.Notifications",
    default_path = "/org/freedesktop/Notifications",
    gen_blocking = false
)]
trait Notifications {
    fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: &[&str],
        hints: &HashMap<&str, &Value<'_>>,
        expire_timeout: i32,
    ) -> zbus::Result<u32>;

    fn close_notification(&self, id: u32) -> zbus::Result<()>;

    fn get_capabilities(&self) -> zbus::Result<Vec<String>>;

    #[zbus(signal)]
    fn notification_closed(&self, id: u32, reason: u32) -> zbus::Result<()>;

    #[zbus(signal)]
    fn action_invoked(&self, id: u32, action_key: &str) -> zbus::Result<()>;
}

/// Wire form of the `image-data` hint: `(iiibiiay)`.
#[derive(Debug, Clone, Value, OwnedValue)]
pub struct ImageData {
    pub width: i32,
    pub height: i32,
    pub rowstride: i32,
    pub has_alpha: bool,
    pub bits_per_sample: i32,
    pub channels: i32,
    pub data: Vec<u8>,
}

impl From<&PixelBuffer> for ImageData {
    fn from(buf: &PixelBuffer) -> Self {
        Self {
            width: buf.width(),
            height: buf.height(),
            rowstride: buf.rowstride(),
            has_alpha: buf.has_alpha(),
            bits_per_sample: buf.bits_per_sample(),
            channels: buf.channels(),
            data: buf.data().to_vec(),
        }
    }
}

impl From<ImageData> for PixelBuffer {
    fn from(img: ImageData) -> Self {
        PixelBuffer::from_raw(
            img.width,
            img.height,
            img.rowstride,
            img.has_alpha,
            img.bits_per_sample,
            img.channels,
            img.data,
        )
    }
}

/// Convert a hint into the variant sent on the wire.
pub fn hint_to_value(hint: &HintValue) -> Value<'static> {
    match hint {
        HintValue::Bool(v) => Value::from(*v),
        HintValue::Byte(v) => Value::from(*v),
        HintValue::Int32(v) => Value::from(*v),
        HintValue::UInt32(v) => Value::from(*v),
        HintValue::String(v) => Value::from(v.clone()),
        HintValue::Image(buf) => Value::from(ImageData::from(buf)),
    }
}

/// Transport talking to the notification daemon over D-Bus.
pub struct DbusTransport {
    proxy: NotificationsProxy<'static>,
    available: Arc<AtomicBool>,
}

impl DbusTransport {
    /// Connect to the session bus, or to `bus_address` when given.
    ///
    /// Returns the transport and the receiver on which daemon signals arrive.
    pub async fn connect(
        bus_address: Option<&str>,
    ) -> Result<(Self, mpsc::Receiver<DaemonSignal>)> {
        let connection = match bus_address {
            Some(address) => {
                tracing::info!(address, "Connecting to D-Bus");
                zbus::connection::Builder::address(address)?.build().await?
            }
            None => {
                tracing::info!("Connecting to D-Bus session bus");
                Connection::session().await?
            }
        };
        Self::with_connection(connection).await
    }

    /// Build the transport on an existing connection.
    pub async fn with_connection(
        connection: Connection,
    ) -> Result<(Self, mpsc::Receiver<DaemonSignal>)> {
        let proxy = NotificationsProxy::new(&connection).await?;
        let dbus = DBusProxy::new(&connection).await?;

        let activatable = is_activatable(&dbus).await;
        let has_owner = has_owner(&dbus).await;
        let available = Arc::new(AtomicBool::new(has_owner || activatable));
        tracing::info!(has_owner, activatable, "Notification daemon probed");

        let closed = proxy.receive_notification_closed().await?;
        let invoked = proxy.receive_action_invoked().await?;
        let owner_changes = dbus.receive_name_owner_changed().await?;

        let (signal_tx, signal_rx) = mpsc::channel(SIGNAL_CHANNEL_CAPACITY);
        tokio::spawn(forward_signals(
            closed,
            invoked,
            owner_changes,
            Arc::clone(&available),
            activatable,
            signal_tx,
        ));

        Ok((Self { proxy, available }, signal_rx))
    }
}

impl Transport for DbusTransport {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    fn notify(&self, request: NotifyRequest) -> BoxFuture<'static, Result<u32>> {
        let proxy = self.proxy.clone();
        Box::pin(async move {
            let actions = request.flattened_actions();
            let values: Vec<(&str, Value<'static>)> = request
                .hints
                .iter()
                .map(|(key, hint)| (key.as_str(), hint_to_value(hint)))
                .collect();
            let hints: HashMap<&str, &Value<'_>> =
                values.iter().map(|(key, value)| (*key, value)).collect();

            let id = proxy
                .notify(
                    &request.app_name,
                    request.replaces_id,
                    &request.icon,
                    &request.summary,
                    &request.body,
                    &actions,
                    &hints,
                    request.expire_timeout,
                )
                .await?;
            Ok(id)
        })
    }

    fn close_notification(&self, id: u32) -> BoxFuture<'static, Result<()>> {
        let proxy = self.proxy.clone();
        Box::pin(async move {
            proxy.close_notification(id).await?;
            Ok(())
        })
    }

    fn get_capabilities(&self) -> BoxFuture<'static, Result<Vec<String>>> {
        let proxy = self.proxy.clone();
        Box::pin(async move { Ok(proxy.get_capabilities().await?) })
    }
}

async fn has_owner(dbus: &DBusProxy<'_>) -> bool {
    let Ok(name) = BusName::try_from(NOTIFICATIONS_BUS) else {
        return false;
    };
    match dbus.name_has_owner(name).await {
        Ok(owned) => owned,
        Err(e) => {
            tracing::warn!(error = %e, "NameHasOwner failed");
            false
        }
    }
}

async fn is_activatable(dbus: &DBusProxy<'_>) -> bool {
    match dbus.list_activatable_names().await {
        Ok(names) => names.iter().any(|name| name.as_str() == NOTIFICATIONS_BUS),
        Err(e) => {
            tracing::warn!(error = %e, "ListActivatableNames failed");
            false
        }
    }
}

/// Pump daemon signals into `signal_tx` until every stream ends or the
/// receiver is dropped.
async fn forward_signals(
    mut closed: NotificationClosedStream,
    mut invoked: ActionInvokedStream,
    mut owner_changes: NameOwnerChangedStream,
    available: Arc<AtomicBool>,
    activatable: bool,
    signal_tx: mpsc::Sender<DaemonSignal>,
) {
    loop {
        let signal = tokio::select! {
            Some(msg) = closed.next() => match msg.args() {
                Ok(args) => DaemonSignal::NotificationClosed {
                    id: *args.id(),
                    reason: *args.reason(),
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Malformed NotificationClosed signal");
                    continue;
                }
            },
            Some(msg) = invoked.next() => match msg.args() {
                Ok(args) => DaemonSignal::ActionInvoked {
                    id: *args.id(),
                    action: args.action_key().to_string(),
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Malformed ActionInvoked signal");
                    continue;
                }
            },
            Some(msg) = owner_changes.next() => {
                if let Ok(args) = msg.args() {
                    if args.name().as_str() == NOTIFICATIONS_BUS {
                        let owned = args.new_owner().is_some();
                        available.store(owned || activatable, Ordering::Release);
                        tracing::info!(owned, "Notification daemon ownership changed");
                    }
                }
                continue;
            }
            else => break,
        };

        tracing::trace!(?signal, "Daemon signal received");
        if signal_tx.send(signal).await.is_err() {
            tracing::debug!("Signal receiver dropped, stopping forwarder");
            return;
        }
    }
    tracing::info!("Daemon signal streams ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_data_matches_pixel_buffer_fields() {
        let buf = PixelBuffer::from_raw(2, 1, 6, false, 8, 3, vec![1, 2, 3, 4, 5, 6]);
        let wire = ImageData::from(&buf);

        assert_eq!(wire.width, 2);
        assert_eq!(wire.height, 1);
        assert_eq!(wire.rowstride, 6);
        assert!(!wire.has_alpha);
        assert_eq!(wire.bits_per_sample, 8);
        assert_eq!(wire.channels, 3);
        assert_eq!(PixelBuffer::from(wire), buf);
    }

    #[test]
    fn test_image_hint_is_a_structure() {
        let buf = PixelBuffer::from_raw(1, 1, 4, true, 8, 4, vec![9, 8, 7, 6]);
        let value = hint_to_value(&HintValue::Image(buf));
        assert!(matches!(value, Value::Structure(_)));
    }

    #[test]
    fn test_scalar_hints_keep_their_types() {
        assert!(matches!(hint_to_value(&HintValue::Bool(true)), Value::Bool(true)));
        assert!(matches!(hint_to_value(&HintValue::Byte(2)), Value::U8(2)));
        assert!(matches!(hint_to_value(&HintValue::Int32(-4)), Value::I32(-4)));
        assert!(matches!(
            hint_to_value(&HintValue::String("im.received".into())),
            Value::Str(_)
        ));
    }
}
