use tokio::sync::broadcast;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::notification::Notification;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification channel closed")]
    ChannelClosed,

    #[error("dispatch failed: {0}")]
    Dispatch(String),
}

/// Fire-and-forget delivery of notifications to customers, merchants, couriers and admins.
pub trait NotificationDispatcher: Send + Sync {
    fn dispatch(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Publishes notifications on a broadcast channel consumed by websocket clients.
pub struct BroadcastDispatcher {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastDispatcher {
    pub fn new(tx: broadcast::Sender<Notification>) -> Self {
        Self { tx }
    }
}

impl NotificationDispatcher for BroadcastDispatcher {
    fn dispatch(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.tx.receiver_count() == 0 {
            return Ok(());
        }

        self.tx
            .send(notification.clone())
            .map(|_| ())
            .map_err(|_| NotifyError::ChannelClosed)
    }
}

/// Dispatches every notification; failures are logged and never propagated.
pub fn dispatch_all(dispatcher: &dyn NotificationDispatcher, notifications: &[Notification]) {
    for notification in notifications {
        match dispatcher.dispatch(notification) {
            Ok(()) => debug!(
                event = notification.event.name(),
                recipient = ?notification.recipient,
                "notification dispatched"
            ),
            Err(err) => warn!(
                error = %err,
                event = notification.event.name(),
                recipient = ?notification.recipient,
                "notification dispatch failed"
            ),
        }
    }
}
