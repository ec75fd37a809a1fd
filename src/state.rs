use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::engine::clock::Clock;
use crate::engine::dispatch::Dispatcher;
use crate::engine::notify::QueuedNotifier;
use crate::engine::policy::DispatchPolicy;
use crate::models::assignment::Assignment;
use crate::models::notification::Notification;
use crate::observability::metrics::Metrics;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<Store>,
    pub dispatcher: Dispatcher,
    pub notifications: DashMap<Uuid, Notification>,
    pub assignment_events_tx: broadcast::Sender<Assignment>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        policy: DispatchPolicy,
        clock: Arc<dyn Clock>,
        notification_queue_size: usize,
        event_buffer_size: usize,
    ) -> (Self, mpsc::Receiver<Notification>) {
        let (notification_tx, notification_rx) = mpsc::channel(notification_queue_size);
        let (assignment_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        let metrics = Metrics::new();
        let store = Arc::new(Store::new());
        let notifier = Arc::new(QueuedNotifier::new(notification_tx, metrics.clone()));
        let dispatcher = Dispatcher::new(store.clone(), notifier, clock, policy, metrics.clone());

        (
            Self {
                store,
                dispatcher,
                notifications: DashMap::new(),
                assignment_events_tx,
                metrics,
            },
            notification_rx,
        )
    }
}
