use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::notification::{Audience, Notification};
use crate::observability::metrics::Metrics;
use crate::state::AppState;

/// Fan-out boundary. Implementations must not block and must never fail the caller.
pub trait Notifier: Send + Sync {
    fn notify(&self, audience: Audience, title: &str, message: &str);
}

pub struct QueuedNotifier {
    tx: mpsc::Sender<Notification>,
    metrics: Metrics,
}

impl QueuedNotifier {
    pub fn new(tx: mpsc::Sender<Notification>, metrics: Metrics) -> Self {
        Self { tx, metrics }
    }
}

impl Notifier for QueuedNotifier {
    fn notify(&self, audience: Audience, title: &str, message: &str) {
        let notification = Notification {
            id: Uuid::new_v4(),
            audience,
            title: title.to_string(),
            message: message.to_string(),
            created_at: Utc::now(),
        };

        // Counted before the send so the worker's decrement never runs first.
        self.metrics.notifications_in_queue.inc();
        match self.tx.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                self.metrics.notifications_in_queue.dec();
                self.metrics.notifications_dropped_total.inc();
                warn!(notification_id = %dropped.id, "notification queue full; dropping");
            }
            Err(TrySendError::Closed(dropped)) => {
                self.metrics.notifications_in_queue.dec();
                self.metrics.notifications_dropped_total.inc();
                warn!(notification_id = %dropped.id, "notification queue closed; dropping");
            }
        }
    }
}

/// Drains the queue into the in-app inbox. Other delivery channels hang off this loop.
pub async fn run_notification_worker(
    state: Arc<AppState>,
    mut rx: mpsc::Receiver<Notification>,
) {
    info!("notification worker started");

    while let Some(notification) = rx.recv().await {
        state.metrics.notifications_in_queue.dec();

        info!(
            notification_id = %notification.id,
            audience = ?notification.audience,
            title = %notification.title,
            "notification delivered to inbox"
        );
        state.notifications.insert(notification.id, notification);
    }

    warn!("notification worker stopped: queue channel closed");
}
