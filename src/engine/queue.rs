use tracing::warn;
use uuid::Uuid;

use crate::state::AppState;

/// Hands a ready order to the proposal engine without blocking the caller.
/// A full queue is not fatal: the periodic rescan picks the order up.
pub fn enqueue_ready_order(state: &AppState, order_id: Uuid) {
    match state.ready_tx.try_send(order_id) {
        Ok(()) => state.metrics.ready_orders_in_queue.inc(),
        Err(err) => warn!(order_id = %order_id, error = %err, "ready queue rejected order; rescan will retry"),
    }
}
