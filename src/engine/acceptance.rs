use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, ReasonCode};
use crate::models::assignment::Assignment;
use crate::models::courier::{Availability, CourierStatus};
use crate::models::notification::{NotificationEvent, Recipient};
use crate::state::AppState;
use crate::store::CourierOp;

/// Turns an offer into a binding assignment.
///
/// The order's exclusive guard is held while the preconditions are re-checked
/// and the assignment is written, so concurrent callers for the same order are
/// serialized and only the first valid one wins. Losers get
/// `ORDER_NOT_AVAILABLE` and leave no trace.
pub fn accept_order(
    state: &AppState,
    order_id: Uuid,
    courier_id: Uuid,
) -> Result<Assignment, AppError> {
    let result = try_accept(state, order_id, courier_id);

    let outcome = match &result {
        Ok(_) => "assigned",
        Err(AppError::Conflict { .. }) => "conflict",
        Err(_) => "error",
    };
    state
        .metrics
        .acceptances_total
        .with_label_values(&[outcome])
        .inc();

    result
}

fn try_accept(state: &AppState, order_id: Uuid, courier_id: Uuid) -> Result<Assignment, AppError> {
    let courier = state.store.courier(courier_id)?;
    if courier.status != CourierStatus::Active {
        return Err(AppError::conflict(
            ReasonCode::CourierNotEligible,
            format!("courier {courier_id} is {:?}", courier.status),
        ));
    }

    let (assignment, committed) = state.store.transact(order_id, |_, uow| {
        let now = uow.now;
        if !uow.order.is_ready_and_unassigned()
            || uow.order.excluded_couriers.contains(&courier_id)
        {
            return Err(AppError::order_not_available(order_id));
        }
        if let Some(active) = uow.order.active_proposal(now)
            && active.courier_id != courier_id
        {
            return Err(AppError::order_not_available(order_id));
        }

        uow.order.proposal = None;
        uow.order.assigned_courier = Some(courier_id);
        uow.order.timestamps.assigned_at = Some(now);
        uow.courier(courier_id, CourierOp::SetAvailability(Availability::Busy));

        let assigned = NotificationEvent::OrderAssigned {
            order_id,
            courier_id,
        };
        uow.notify(Recipient::Customer(uow.order.customer_id), assigned.clone());
        if let Some(merchant_id) = uow.order.merchant_id {
            uow.notify(Recipient::Merchant(merchant_id), assigned);
        }

        Ok(Assignment {
            order_id,
            courier_id,
            assigned_at: now,
        })
    })
    .inspect_err(|err| {
        warn!(order_id = %order_id, courier_id = %courier_id, error = %err, "acceptance rejected")
    })?;
    state.publish(&committed);

    info!(order_id = %order_id, courier_id = %courier_id, "order assigned");
    Ok(assignment)
}
