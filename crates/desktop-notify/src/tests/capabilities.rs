use std::time::Duration;

use tokio::sync::oneshot;

use super::test_notifier;
use crate::{Capabilities, NotifyError};

async fn query(notifier: &crate::Notifier) -> Option<Capabilities> {
    let (tx, rx) = oneshot::channel();
    let dispatched = notifier.query_capabilities(move |caps| {
        let _ = tx.send(caps);
    });
    if !dispatched {
        return None;
    }
    let caps = tokio::time::timeout(Duration::from_secs(1), rx)
        .await
        .expect("timed out waiting for capabilities")
        .expect("callback dropped");
    Some(caps)
}

#[tokio::test]
async fn test_query_reports_daemon_tokens() {
    let (notifier, mock) = test_notifier();
    mock.set_capabilities(Some(vec!["actions", "body", "persistence"]));

    let caps = query(&notifier).await.unwrap();
    assert!(caps.supports_actions());
    assert!(caps.supports_persistence());
    assert!(!caps.supports_sound());
    assert_eq!(caps.len(), 3);
}

#[tokio::test]
async fn test_failed_query_yields_empty_set() {
    let (notifier, mock) = test_notifier();
    mock.set_capabilities(None);

    let caps = query(&notifier).await.unwrap();
    assert!(caps.is_empty());
}

#[tokio::test]
async fn test_query_skipped_when_unavailable() {
    let (notifier, mock) = test_notifier();
    mock.set_available(false);

    assert!(query(&notifier).await.is_none());
    assert!(matches!(
        notifier.capabilities().await,
        Err(NotifyError::TransportUnavailable)
    ));
}

#[tokio::test]
async fn test_awaitable_query_propagates_errors() {
    let (notifier, mock) = test_notifier();
    mock.set_capabilities(Some(vec!["body"]));
    assert!(notifier.capabilities().await.unwrap().supports_body());

    mock.set_capabilities(None);
    assert!(matches!(
        notifier.capabilities().await,
        Err(NotifyError::Reply(_))
    ));
}
