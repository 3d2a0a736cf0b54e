use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::Rules;
use crate::models::notification::Notification;
use crate::notify::{dispatch_all, BroadcastDispatcher, NotificationDispatcher};
use crate::observability::metrics::Metrics;
use crate::store::{Committed, Store};

pub struct AppState {
    pub store: Store,
    pub rules: Rules,
    pub ready_tx: mpsc::Sender<Uuid>,
    pub notification_tx: broadcast::Sender<Notification>,
    pub dispatcher: Arc<dyn NotificationDispatcher>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        rules: Rules,
        order_queue_size: usize,
        event_buffer_size: usize,
    ) -> (Self, mpsc::Receiver<Uuid>) {
        let (ready_tx, ready_rx) = mpsc::channel(order_queue_size);
        let (notification_tx, _unused_rx) = broadcast::channel(event_buffer_size);
        let dispatcher = Arc::new(BroadcastDispatcher::new(notification_tx.clone()));

        (
            Self {
                store: Store::new(Arc::new(SystemClock)),
                rules,
                ready_tx,
                notification_tx,
                dispatcher,
                metrics: Metrics::new(),
            },
            ready_rx,
        )
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.store = Store::new(clock);
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Records metrics for a committed unit of work and sends its notifications.
    pub fn publish(&self, committed: &Committed) {
        for entry in &committed.entries {
            self.metrics
                .ledger_entries_total
                .with_label_values(&[entry.kind.as_str()])
                .inc();
        }
        dispatch_all(self.dispatcher.as_ref(), &committed.notifications);
    }

    pub fn notify(&self, notifications: &[Notification]) {
        dispatch_all(self.dispatcher.as_ref(), notifications);
    }
}
