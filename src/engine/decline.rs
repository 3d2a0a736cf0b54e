use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::engine::proposal::propose_order;
use crate::error::{AppError, ReasonCode};
use crate::models::assignment::ProposalOutcome;
use crate::models::courier::Availability;
use crate::models::ledger::LedgerEntryKind;
use crate::models::notification::{NotificationEvent, Recipient};
use crate::models::order::OrderStatus;
use crate::models::Money;
use crate::state::AppState;
use crate::store::CourierOp;

#[derive(Debug, Clone, Serialize)]
pub struct DeclineOutcome {
    pub order_id: Uuid,
    pub courier_id: Uuid,
    /// Set when the courier cancelled after accepting.
    pub penalty: Option<Money>,
    pub next: ProposalOutcome,
}

/// Lets a courier back out of an offer or, at a cost, out of an accepted order.
/// Either way the order goes back to the proposal engine and the courier is not
/// offered it again.
pub fn decline_delivery(
    state: &AppState,
    order_id: Uuid,
    courier_id: Uuid,
) -> Result<DeclineOutcome, AppError> {
    let penalty_amount = state.rules.cancellation_penalty_amount;

    let (was_assigned, committed) = state.store.transact(order_id, |_, uow| {
        let now = uow.now;

        if uow.order.assigned_courier == Some(courier_id) {
            if uow.order.status != OrderStatus::Ready {
                return Err(AppError::conflict(
                    ReasonCode::InvalidTransition,
                    format!(
                        "order {order_id} cannot be released from {:?}",
                        uow.order.status
                    ),
                ));
            }

            uow.courier(
                courier_id,
                CourierOp::Deduct {
                    kind: LedgerEntryKind::CancellationPenalty,
                    amount: penalty_amount,
                    metadata: json!({ "reason": "cancelled_after_acceptance" }),
                },
            );
            uow.courier(courier_id, CourierOp::SetAvailability(Availability::Available));
            uow.order.assigned_courier = None;
            uow.order.timestamps.assigned_at = None;
            uow.order.exclude_courier(courier_id);

            uow.notify(
                Recipient::Courier(courier_id),
                NotificationEvent::CancellationPenaltyApplied {
                    order_id,
                    amount: penalty_amount,
                },
            );
            let released = NotificationEvent::OrderReleased { order_id };
            uow.notify(Recipient::Customer(uow.order.customer_id), released.clone());
            if let Some(merchant_id) = uow.order.merchant_id {
                uow.notify(Recipient::Merchant(merchant_id), released);
            }
            return Ok(true);
        }

        let offered_to_caller = uow.order.is_ready_and_unassigned()
            && uow
                .order
                .active_proposal(now)
                .is_some_and(|p| p.courier_id == courier_id);
        if !offered_to_caller {
            return Err(AppError::order_not_available(order_id));
        }

        uow.order.withdraw_proposal();
        Ok(false)
    })?;
    state.publish(&committed);

    let penalty = was_assigned.then(|| {
        committed
            .entries
            .iter()
            .find(|entry| entry.kind == LedgerEntryKind::CancellationPenalty)
            .map(|entry| -entry.amount)
            .unwrap_or(0)
    });

    info!(
        order_id = %order_id,
        courier_id = %courier_id,
        after_acceptance = was_assigned,
        "courier declined order"
    );

    let next = propose_order(state, order_id)?;

    Ok(DeclineOutcome {
        order_id,
        courier_id,
        penalty,
        next,
    })
}
