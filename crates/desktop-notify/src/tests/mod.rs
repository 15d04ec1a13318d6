use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::{broadcast, oneshot};

use crate::transport::{NotifyRequest, Transport};
use crate::{NotificationEvent, Notifier, NotifierOptions, NotifyError, Result};

mod capabilities;

/// In-memory transport. `Notify` replies stay outstanding until the test
/// resolves them with [`MockTransport::reply`], oldest first.
pub(crate) struct MockTransport {
    available: AtomicBool,
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    requests: Vec<NotifyRequest>,
    replies: VecDeque<oneshot::Sender<Result<u32>>>,
    closed: Vec<u32>,
    capabilities: Option<Vec<String>>,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            available: AtomicBool::new(true),
            state: Mutex::new(MockState::default()),
        })
    }

    pub(crate) fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub(crate) fn set_capabilities(&self, tokens: Option<Vec<&str>>) {
        self.state.lock().unwrap().capabilities =
            tokens.map(|t| t.into_iter().map(String::from).collect());
    }

    pub(crate) fn requests(&self) -> Vec<NotifyRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub(crate) fn last_request(&self) -> NotifyRequest {
        self.requests().pop().expect("no Notify request was sent")
    }

    pub(crate) fn closed(&self) -> Vec<u32> {
        self.state.lock().unwrap().closed.clone()
    }

    /// Resolve the oldest outstanding `Notify` call.
    pub(crate) fn reply(&self, result: Result<u32>) {
        let sender = self
            .state
            .lock()
            .unwrap()
            .replies
            .pop_front()
            .expect("no outstanding Notify call");
        let _ = sender.send(result);
    }
}

impl Transport for MockTransport {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn notify(&self, request: NotifyRequest) -> BoxFuture<'static, Result<u32>> {
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request);
            state.replies.push_back(tx);
        }
        Box::pin(async move {
            rx.await
                .unwrap_or_else(|_| Err(NotifyError::Reply("mock reply dropped".into())))
        })
    }

    fn close_notification(&self, id: u32) -> BoxFuture<'static, Result<()>> {
        self.state.lock().unwrap().closed.push(id);
        Box::pin(async { Ok(()) })
    }

    fn get_capabilities(&self) -> BoxFuture<'static, Result<Vec<String>>> {
        let tokens = self.state.lock().unwrap().capabilities.clone();
        Box::pin(async move {
            tokens.ok_or_else(|| NotifyError::Reply("GetCapabilities rejected".into()))
        })
    }
}

fn test_notifier() -> (Notifier, Arc<MockTransport>) {
    let mock = MockTransport::new();
    let options = NotifierOptions::new().with_app_name("test-app");
    let notifier = Notifier::new(mock.clone(), options).expect("Failed to create notifier");
    (notifier, mock)
}

/// Next event, failing the test if none arrives within a second.
async fn next_event(events: &mut broadcast::Receiver<NotificationEvent>) -> NotificationEvent {
    tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("timed out waiting for notification event")
        .expect("event channel closed")
}

/// Let spawned reply tasks run to completion.
async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
