use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use desktop_notify::{Notifier, NotifierOptions, NotifyRequest, Transport};
use futures::future::BoxFuture;

/// Transport that answers every call immediately, handing out ids the way
/// a daemon does: a non-zero `replaces_id` is kept, otherwise a new one is
/// allocated.
pub(crate) struct AutoReplyTransport {
    available: AtomicBool,
    next_id: AtomicU32,
    requests: Mutex<Vec<NotifyRequest>>,
    closed: Mutex<Vec<u32>>,
    capabilities: Mutex<Vec<String>>,
}

impl AutoReplyTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            available: AtomicBool::new(true),
            next_id: AtomicU32::new(1),
            requests: Mutex::new(Vec::new()),
            closed: Mutex::new(Vec::new()),
            capabilities: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub(crate) fn set_capabilities(&self, tokens: &[&str]) {
        *self.capabilities.lock().unwrap() = tokens.iter().map(|t| t.to_string()).collect();
    }

    pub(crate) fn requests(&self) -> Vec<NotifyRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> NotifyRequest {
        self.requests().pop().expect("no Notify request was sent")
    }

    pub(crate) fn closed(&self) -> Vec<u32> {
        self.closed.lock().unwrap().clone()
    }
}

impl Transport for AutoReplyTransport {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn notify(&self, request: NotifyRequest) -> BoxFuture<'static, desktop_notify::Result<u32>> {
        let id = match request.replaces_id {
            0 => self.next_id.fetch_add(1, Ordering::SeqCst),
            id => id,
        };
        self.requests.lock().unwrap().push(request);
        Box::pin(async move { Ok(id) })
    }

    fn close_notification(&self, id: u32) -> BoxFuture<'static, desktop_notify::Result<()>> {
        self.closed.lock().unwrap().push(id);
        Box::pin(async { Ok(()) })
    }

    fn get_capabilities(&self) -> BoxFuture<'static, desktop_notify::Result<Vec<String>>> {
        let tokens = self.capabilities.lock().unwrap().clone();
        Box::pin(async move { Ok(tokens) })
    }
}

pub(crate) fn test_notifier(transport: &Arc<AutoReplyTransport>) -> Notifier {
    let options = NotifierOptions::new().with_app_name("notifyctl-test");
    Notifier::new(transport.clone(), options).expect("Failed to create notifier")
}
