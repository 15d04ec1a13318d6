//! Per-notification state machine.
//!
//! ```text
//!            show()                 reply(id)
//! Unassigned ──────▶ PendingSingle ──────────▶ Assigned(id)
//!     ▲                 │ show()                  │ show()/update()
//!     │                 ▼                         ▼
//!     │           PendingCoalesced ─reply(id)─▶ Assigned(id) ─▶ follow-up show()
//!     │
//!     └── reply error / daemon unavailable / NotificationClosed / ActionInvoked
//! ```
//!
//! Lock order is registry → notification state. No transport call is made
//! while either lock is held.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use super::types::{CloseReason, HintValue, NotificationEvent, Timeout};
use crate::notifier::Notifier;
use crate::transport::NotifyRequest;
use crate::{NotifyError, Result};

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Where a notification stands relative to the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Never shown, or closed since.
    Unassigned,
    /// A `Notify` request is in flight.
    PendingSingle,
    /// A request is in flight and another show was absorbed; exactly one
    /// follow-up request is sent when the reply lands.
    PendingCoalesced,
    /// The daemon confirmed this identifier.
    Assigned(u32),
}

impl LifecycleState {
    pub fn id(&self) -> Option<u32> {
        match self {
            Self::Assigned(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::PendingSingle | Self::PendingCoalesced)
    }
}

/// Caller-visible fields of a notification.
#[derive(Debug, Clone)]
pub(crate) struct Content {
    pub(crate) app_name: String,
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) icon: String,
    pub(crate) timeout: Timeout,
    pub(crate) actions: Vec<(String, String)>,
    pub(crate) hints: BTreeMap<String, HintValue>,
}

impl Content {
    pub(crate) fn new(title: String, icon: String, timeout: Timeout) -> Self {
        Self {
            app_name: String::new(),
            title,
            body: String::new(),
            icon,
            timeout,
            actions: Vec::new(),
            hints: BTreeMap::new(),
        }
    }

    fn to_request(&self, replaces_id: u32, default_app_name: &str) -> NotifyRequest {
        let app_name = if self.app_name.is_empty() {
            default_app_name
        } else {
            &self.app_name
        };
        NotifyRequest {
            app_name: app_name.to_string(),
            replaces_id,
            icon: self.icon.clone(),
            summary: self.title.clone(),
            body: self.body.clone(),
            actions: self.actions.clone(),
            hints: self.hints.clone(),
            expire_timeout: self.timeout.as_wire(),
        }
    }
}

/// The request currently awaiting a reply.
#[derive(Debug, Clone, Copy)]
struct InFlight {
    token: u64,
    replaces_id: u32,
}

pub(crate) struct State {
    pub(crate) content: Content,
    pub(crate) lifecycle: LifecycleState,
    in_flight: Option<InFlight>,
    next_token: u64,
    close_when_assigned: bool,
}

/// State shared between a [`super::Notification`] and its reply tasks.
///
/// The registry only ever holds `Weak` references to this.
pub(crate) struct Shared {
    notifier: Notifier,
    state: Mutex<State>,
    events: broadcast::Sender<NotificationEvent>,
}

enum ReplyOutcome {
    Shown {
        id: u32,
        needs_update: bool,
        close: bool,
    },
    Failed(NotifyError),
}

impl Shared {
    pub(crate) fn new(notifier: Notifier, content: Content) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            notifier,
            state: Mutex::new(State {
                content,
                lifecycle: LifecycleState::Unassigned,
                in_flight: None,
                next_token: 0,
                close_when_assigned: false,
            }),
            events,
        })
    }

    pub(crate) fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: NotificationEvent) {
        tracing::trace!(?event, "Notification event");
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Send the current fields to the daemon, or absorb the call into the
    /// request already in flight.
    pub(crate) fn show(self: &Arc<Self>) -> bool {
        let transport = self.notifier.transport();
        let available = transport.is_available();

        // Decision and transition share one critical section
        let dispatch = {
            let mut registry = self.notifier.registry().lock();
            let mut state = self.state();
            match state.lifecycle {
                LifecycleState::PendingSingle => {
                    state.lifecycle = LifecycleState::PendingCoalesced;
                    tracing::debug!("Show coalesced into the pending request");
                    return true;
                }
                LifecycleState::PendingCoalesced => {
                    tracing::trace!("Show absorbed, follow-up already scheduled");
                    return true;
                }
                LifecycleState::Unassigned | LifecycleState::Assigned(_) => {}
            }

            if available {
                let replaces_id = state.lifecycle.id().unwrap_or(0);
                let request = state
                    .content
                    .to_request(replaces_id, &self.notifier.options().app_name);
                state.next_token += 1;
                let token = state.next_token;
                state.in_flight = Some(InFlight { token, replaces_id });
                state.lifecycle = LifecycleState::PendingSingle;
                Some((request, token))
            } else {
                if let Some(id) = state.lifecycle.id() {
                    registry.remove_if_owned(id, self);
                }
                state.lifecycle = LifecycleState::Unassigned;
                state.in_flight = None;
                state.close_when_assigned = false;
                None
            }
        };

        let Some((request, token)) = dispatch else {
            tracing::warn!("Notification daemon unavailable");
            self.emit(NotificationEvent::Error {
                message: NotifyError::TransportUnavailable.to_string(),
            });
            return false;
        };

        tracing::debug!(token, replaces_id = request.replaces_id, "Dispatching Notify");
        let reply = transport.notify(request);
        let weak = Arc::downgrade(self);
        self.notifier.spawn(async move {
            let result = reply.await;
            match weak.upgrade() {
                Some(shared) => shared.handle_notify_result(token, result),
                None => tracing::debug!(token, "Discarding Notify reply for dropped notification"),
            }
        });
        true
    }

    /// Apply the daemon's reply to the request identified by `token`.
    pub(crate) fn handle_notify_result(self: &Arc<Self>, token: u64, result: Result<u32>) {
        let outcome = {
            let mut registry = self.notifier.registry().lock();
            let mut state = self.state();

            let Some(in_flight) = state.in_flight.filter(|f| f.token == token) else {
                tracing::debug!(token, "Discarding stale Notify reply");
                return;
            };
            state.in_flight = None;

            match result {
                Err(e) => {
                    if in_flight.replaces_id != 0 {
                        registry.remove_if_owned(in_flight.replaces_id, self);
                    }
                    state.lifecycle = LifecycleState::Unassigned;
                    state.close_when_assigned = false;
                    ReplyOutcome::Failed(e)
                }
                Ok(id) => {
                    let needs_update = state.lifecycle == LifecycleState::PendingCoalesced;
                    if in_flight.replaces_id != 0 && in_flight.replaces_id != id {
                        registry.remove_if_owned(in_flight.replaces_id, self);
                    }
                    registry.register(id, self);
                    state.lifecycle = LifecycleState::Assigned(id);
                    let close = std::mem::take(&mut state.close_when_assigned);
                    ReplyOutcome::Shown {
                        id,
                        needs_update,
                        close,
                    }
                }
            }
        };

        match outcome {
            ReplyOutcome::Failed(e) => {
                tracing::warn!(error = %e, "Notify request failed");
                self.emit(NotificationEvent::Error {
                    message: e.to_string(),
                });
            }
            ReplyOutcome::Shown {
                id,
                needs_update,
                close,
            } => {
                tracing::info!(id, "Notification shown");
                self.emit(NotificationEvent::Shown { id });
                if close {
                    self.request_close(id);
                } else if needs_update {
                    tracing::debug!(id, "Sending coalesced update");
                    self.show();
                }
            }
        }
    }

    /// Ask the daemon to close the notification. Returns whether a close was
    /// requested; while a request is in flight the close is sent as soon as
    /// the identifier is known.
    pub(crate) fn hide(&self) -> bool {
        let id = {
            let mut state = self.state();
            match state.lifecycle {
                LifecycleState::Assigned(id) => id,
                LifecycleState::PendingSingle | LifecycleState::PendingCoalesced => {
                    state.close_when_assigned = true;
                    tracing::debug!("Close deferred until the daemon assigns an id");
                    return true;
                }
                LifecycleState::Unassigned => return false,
            }
        };
        self.request_close(id);
        true
    }

    /// Transition to `Unassigned` after the daemon closed the notification.
    ///
    /// Called with the registry lock held; the registry entry has already
    /// been taken by the caller.
    pub(crate) fn mark_closed(&self, id: u32, reason: CloseReason) {
        let mut state = self.state();
        tracing::info!(id, %reason, "Notification closed");
        state.lifecycle = LifecycleState::Unassigned;
    }

    /// Drop-time cleanup: deregister and best-effort close. Never fails.
    pub(crate) fn release(&self) {
        if let Some(id) = self.deregister() {
            self.request_close(id);
        }
    }

    /// Forget the daemon identifier without closing anything. Any reply still
    /// in flight is discarded when it lands. Returns the identifier the daemon
    /// is still showing, including one an in-flight update would replace.
    pub(crate) fn deregister(&self) -> Option<u32> {
        let mut registry = self.notifier.registry().lock();
        let mut state = self.state();
        // During an update round-trip the daemon still shows `replaces_id`
        let id = state
            .in_flight
            .take()
            .map(|in_flight| in_flight.replaces_id)
            .filter(|&id| id != 0)
            .or(state.lifecycle.id());
        if let Some(id) = id {
            registry.remove_if_owned(id, self);
        }
        state.lifecycle = LifecycleState::Unassigned;
        state.close_when_assigned = false;
        id
    }

    fn request_close(&self, id: u32) {
        tracing::debug!(id, "Requesting CloseNotification");
        self.notifier.close_in_background(id);
    }
}
