//! `notifyctl send`: one notification, optionally waiting for its outcome.

use anyhow::{Context, bail};
use desktop_notify::{CloseReason, Notification, NotificationEvent, Notifier, Timeout};
use tokio::sync::broadcast::error::RecvError;

use super::wait_until_shown;
use crate::cli::{SendArgs, parse_hint_value, resolve_icon};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub id: u32,
    /// Action the user picked, when waiting.
    pub action: Option<String>,
    /// Why the notification went away, when waiting.
    pub reason: Option<CloseReason>,
}

pub async fn run(notifier: &Notifier, args: SendArgs) -> anyhow::Result<SendOutcome> {
    let notification = build(notifier, &args)?;
    let mut events = notification.subscribe();
    if !notification.show() {
        bail!("Notification daemon is not available");
    }

    let id = wait_until_shown(&mut events).await?;
    tracing::info!(id, "Notification sent");

    if !args.wait {
        notification.detach();
        return Ok(SendOutcome {
            id,
            action: None,
            reason: None,
        });
    }

    let mut action = None;
    let reason = loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(NotificationEvent::ActionInvoked { action: invoked }) => action = Some(invoked),
                Ok(NotificationEvent::Closed { reason }) => break Some(reason),
                Ok(NotificationEvent::Error { message }) => bail!("Notification failed: {message}"),
                Ok(NotificationEvent::Shown { .. }) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break None,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(id, "Interrupted, closing notification");
                notification.close().await?;
                notification.detach();
                break None;
            }
        }
    };

    Ok(SendOutcome { id, action, reason })
}

fn build(notifier: &Notifier, args: &SendArgs) -> anyhow::Result<Notification> {
    let timeout = args
        .timeout
        .map(Timeout::from_wire)
        .unwrap_or(notifier.options().default_timeout);
    let icon = args.icon.as_deref().map(resolve_icon).unwrap_or_default();

    let mut notification = Notification::with_icon_name(notifier, &args.title, icon, timeout);
    if let Some(body) = &args.body {
        notification.set_body(body.clone());
    }
    if let Some(path) = &args.image {
        let image = image::open(path)
            .with_context(|| format!("Failed to open image {}", path.display()))?;
        notification.set_image(&image);
    }
    notification.set_actions(args.actions.iter().cloned());
    for (key, value) in &args.hints {
        notification.set_hint(key.clone(), parse_hint_value(key, value));
    }
    if let Some(app_name) = &args.app_name {
        notification.set_app_name(app_name.clone());
    }
    Ok(notification)
}

#[cfg(test)]
mod tests {
    use desktop_notify::HintValue;

    use super::*;
    use crate::commands::testing::{AutoReplyTransport, test_notifier};

    fn args(title: &str) -> SendArgs {
        SendArgs {
            title: title.to_string(),
            body: None,
            icon: None,
            image: None,
            timeout: None,
            actions: Vec::new(),
            hints: Vec::new(),
            app_name: None,
            wait: false,
        }
    }

    #[tokio::test]
    async fn test_send_without_wait_leaves_notification() {
        let transport = AutoReplyTransport::new();
        let notifier = test_notifier(&transport);
        let mut send = args("Deploy");
        send.body = Some("Finished".into());
        send.icon = Some("warning".into());
        send.timeout = Some(0);
        send.actions = vec![("default".into(), "Open".into())];
        send.hints = vec![("urgency".into(), "2".into())];
        send.app_name = Some("ci".into());

        let outcome = run(&notifier, send).await.unwrap();
        assert_eq!(outcome.id, 1);
        assert_eq!(outcome.action, None);

        let request = transport.last_request();
        assert_eq!(request.summary, "Deploy");
        assert_eq!(request.body, "Finished");
        assert_eq!(request.icon, "dialog-warning");
        assert_eq!(request.expire_timeout, 0);
        assert_eq!(request.app_name, "ci");
        assert_eq!(request.flattened_actions(), vec!["default", "Open"]);
        assert_eq!(request.hints.get("urgency"), Some(&HintValue::Byte(2)));

        // Detached: exiting must not close it
        assert!(transport.closed().is_empty());
        assert!(!notifier.is_registered(1));
    }

    #[tokio::test]
    async fn test_send_wait_reports_action() {
        let transport = AutoReplyTransport::new();
        let notifier = test_notifier(&transport);
        let mut send = args("Deploy");
        send.wait = true;

        let signaller = notifier.clone();
        tokio::spawn(async move {
            while !signaller.is_registered(1) {
                tokio::task::yield_now().await;
            }
            signaller.handle_action_invoked(1, "retry");
        });

        let outcome = run(&notifier, send).await.unwrap();
        assert_eq!(
            outcome,
            SendOutcome {
                id: 1,
                action: Some("retry".into()),
                reason: Some(CloseReason::ActionInvoked),
            }
        );
        assert_eq!(transport.closed(), vec![1]);
    }

    #[tokio::test]
    async fn test_send_fails_when_unavailable() {
        let transport = AutoReplyTransport::new();
        transport.set_available(false);
        let notifier = test_notifier(&transport);

        let err = run(&notifier, args("Deploy")).await.unwrap_err();
        assert!(err.to_string().contains("not available"));
    }

    #[tokio::test]
    async fn test_missing_image_is_reported() {
        let transport = AutoReplyTransport::new();
        let notifier = test_notifier(&transport);
        let mut send = args("Photo");
        send.image = Some("/nonexistent/picture.png".into());

        let err = run(&notifier, send).await.unwrap_err();
        assert!(err.to_string().contains("Failed to open image"));
        assert!(transport.requests().is_empty());
    }
}
