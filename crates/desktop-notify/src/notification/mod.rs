//! Caller-facing notification handle.

mod lifecycle;
pub mod types;

pub use lifecycle::LifecycleState;
pub use types::*;

use std::sync::Arc;

use image::DynamicImage;
use notify_image::PixelBuffer;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

pub(crate) use lifecycle::Shared;
use lifecycle::Content;

use crate::notifier::Notifier;
use crate::{IMAGE_DATA_HINT, LEGACY_IMAGE_DATA_HINT, Result};

const BULLET: &str = "•";

/// One logical desktop notification.
///
/// The daemon assigns an identifier only after the first `Notify` reply.
/// Until then the notification is pending; further `show()`/`update()` calls
/// are absorbed into a single follow-up request. Dropping the notification
/// deregisters it and asks the daemon to close it.
pub struct Notification {
    shared: Arc<Shared>,
}

impl Notification {
    /// Create a notification using the notifier's default timeout and no icon.
    pub fn new(notifier: &Notifier, title: impl Into<String>) -> Self {
        let timeout = notifier.options().default_timeout;
        Self::with_icon_name(notifier, title, String::new(), timeout)
    }

    pub fn with_icon(
        notifier: &Notifier,
        title: impl Into<String>,
        icon: NotificationIcon,
        timeout: Timeout,
    ) -> Self {
        let icon = icon.icon_name().unwrap_or_default();
        Self::with_icon_name(notifier, title, icon, timeout)
    }

    pub fn with_icon_name(
        notifier: &Notifier,
        title: impl Into<String>,
        icon: impl Into<String>,
        timeout: Timeout,
    ) -> Self {
        let content = Content::new(title.into(), icon.into(), timeout);
        Self {
            shared: Shared::new(notifier.clone(), content),
        }
    }

    /// Receive this notification's lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.shared.subscribe()
    }

    pub fn title(&self) -> String {
        self.shared.state().content.title.clone()
    }

    pub fn body(&self) -> String {
        self.shared.state().content.body.clone()
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.shared.state().content.body = body.into();
    }

    pub fn icon_name(&self) -> String {
        self.shared.state().content.icon.clone()
    }

    pub fn set_icon_name(&mut self, icon: impl Into<String>) {
        self.shared.state().content.icon = icon.into();
    }

    pub fn set_icon(&mut self, icon: NotificationIcon) {
        self.set_icon_name(icon.icon_name().unwrap_or_default());
    }

    pub fn timeout(&self) -> Timeout {
        self.shared.state().content.timeout
    }

    pub fn set_timeout(&mut self, timeout: Timeout) {
        self.shared.state().content.timeout = timeout;
    }

    /// Application name override; empty when the notifier default is used.
    pub fn app_name(&self) -> String {
        self.shared.state().content.app_name.clone()
    }

    pub fn set_app_name(&mut self, name: impl Into<String>) {
        self.shared.state().content.app_name = name.into();
    }

    pub fn actions(&self) -> Vec<(String, String)> {
        self.shared.state().content.actions.clone()
    }

    /// Replace the ordered (action id, label) list.
    pub fn set_actions<I, K, L>(&mut self, actions: I)
    where
        I: IntoIterator<Item = (K, L)>,
        K: Into<String>,
        L: Into<String>,
    {
        self.shared.state().content.actions = actions
            .into_iter()
            .map(|(id, label)| (id.into(), label.into()))
            .collect();
    }

    pub fn add_action(&mut self, id: impl Into<String>, label: impl Into<String>) {
        self.shared
            .state()
            .content
            .actions
            .push((id.into(), label.into()));
    }

    pub fn hint(&self, key: &str) -> Option<HintValue> {
        self.shared.state().content.hints.get(key).cloned()
    }

    pub fn set_hint(&mut self, key: impl Into<String>, value: impl Into<HintValue>) {
        self.shared
            .state()
            .content
            .hints
            .insert(key.into(), value.into());
    }

    pub fn remove_hint(&mut self, key: &str) -> Option<HintValue> {
        self.shared.state().content.hints.remove(key)
    }

    /// Attach a bitmap as the `image-data` hint.
    pub fn set_image(&mut self, image: &DynamicImage) {
        self.set_pixel_buffer(PixelBuffer::from_image(image));
    }

    pub fn set_pixel_buffer(&mut self, buffer: PixelBuffer) {
        let mut state = self.shared.state();
        state.content.hints.remove(LEGACY_IMAGE_DATA_HINT);
        state
            .content
            .hints
            .insert(IMAGE_DATA_HINT.to_string(), HintValue::Image(buffer));
    }

    /// Decode the image hint, falling back to the legacy key.
    pub fn image(&self) -> Option<DynamicImage> {
        let state = self.shared.state();
        let hints = &state.content.hints;
        let image = [IMAGE_DATA_HINT, LEGACY_IMAGE_DATA_HINT]
            .into_iter()
            .find_map(|key| match hints.get(key) {
                Some(HintValue::Image(buffer)) => Some(buffer),
                _ => None,
            })
            .and_then(PixelBuffer::to_image);
        image
    }

    pub fn state(&self) -> LifecycleState {
        self.shared.state().lifecycle
    }

    /// Identifier assigned by the daemon, if any.
    pub fn id(&self) -> Option<u32> {
        self.state().id()
    }

    pub fn is_pending(&self) -> bool {
        self.state().is_pending()
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state(), LifecycleState::Assigned(_))
    }

    /// Send the notification, or replace the one already shown.
    ///
    /// Returns `false` only when the daemon is unavailable, in which case an
    /// [`NotificationEvent::Error`] is emitted as well.
    pub fn show(&self) -> bool {
        self.shared.show()
    }

    pub fn show_message(&mut self, message: impl Into<String>) -> bool {
        self.set_body(message);
        self.show()
    }

    /// Append `line` to a shown notification as a bulleted entry, or start
    /// a fresh body when nothing is shown yet.
    pub fn update(&mut self, line: &str) -> bool {
        {
            let mut state = self.shared.state();
            let active = state.lifecycle != LifecycleState::Unassigned;
            let body = &mut state.content.body;
            if !active || body.is_empty() {
                *body = line.to_string();
            } else {
                if !body.starts_with(BULLET) {
                    body.insert_str(0, "• ");
                }
                body.push_str("\n• ");
                body.push_str(line);
            }
        }
        self.show()
    }

    /// Request the daemon to close the notification.
    ///
    /// Returns `false` without side effects when nothing is shown or pending.
    pub fn hide(&self) -> bool {
        self.shared.hide()
    }

    /// Awaitable [`Notification::hide`]: resolves once the daemon answered
    /// `CloseNotification`. Returns `Ok(false)` when no identifier is assigned.
    pub async fn close(&self) -> Result<bool> {
        let Some(id) = self.id() else {
            return Ok(false);
        };
        self.shared
            .notifier()
            .transport()
            .close_notification(id)
            .await?;
        Ok(true)
    }

    /// Stop tracking the notification and leave it on screen.
    ///
    /// Returns the identifier it was shown under, if any. Signals for that
    /// identifier are ignored from now on.
    pub fn detach(self) -> Option<u32> {
        let id = self.shared.deregister();
        tracing::debug!(?id, "Notification detached");
        id
    }

    /// Keep the notification alive in the background until it is closed or
    /// fails, then drop it.
    pub fn release_on_close_or_error(self) {
        let mut events = self.subscribe();
        let state = self.state();
        if state == LifecycleState::Unassigned {
            tracing::debug!("Releasing notification that is neither shown nor pending");
            return;
        }

        let notifier = self.shared.notifier().clone();
        notifier.spawn(async move {
            loop {
                match events.recv().await {
                    Ok(NotificationEvent::Closed { .. } | NotificationEvent::Error { .. }) => break,
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::trace!(skipped, "Release watcher lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            drop(self);
        });
    }
}

impl Drop for Notification {
    fn drop(&mut self) {
        self.shared.release();
    }
}

impl std::fmt::Debug for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state();
        f.debug_struct("Notification")
            .field("title", &state.content.title)
            .field("lifecycle", &state.lifecycle)
            .finish()
    }
}
