//! Cash remittance claims and their review.
//!
//! A claim on an order lives in `Store::remittance_claims` from the moment a
//! remittance is created until that remittance is rejected. Claims are taken
//! through the map's entry API, so two couriers racing for the same order can
//! never both hold it.

use std::collections::HashSet;

use dashmap::mapref::entry::Entry;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, ReasonCode};
use crate::models::notification::{NotificationEvent, Recipient};
use crate::models::order::{OrderStatus, PaymentMethod};
use crate::models::remittance::{
    CashRemittance, RemittanceMethod, RemittanceOrder, RemittanceStatus, ReviewDecision,
};
use crate::models::{Money, MAX_AMOUNT};
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRemittance {
    pub courier_id: Uuid,
    pub amount: Money,
    pub method: RemittanceMethod,
    pub order_ids: Vec<Uuid>,
}

pub fn create_remittance(
    state: &AppState,
    request: CreateRemittance,
) -> Result<CashRemittance, AppError> {
    let result = try_create(state, request);

    let outcome = match &result {
        Ok(_) => "submitted",
        Err(AppError::InvariantViolation { .. }) => "amount_mismatch",
        Err(AppError::Conflict { .. }) => "conflict",
        Err(_) => "error",
    };
    state
        .metrics
        .remittances_total
        .with_label_values(&[outcome])
        .inc();

    result
}

fn try_create(state: &AppState, request: CreateRemittance) -> Result<CashRemittance, AppError> {
    validate(&request)?;
    let courier_id = request.courier_id;
    state.store.courier(courier_id)?;

    let mut links = Vec::with_capacity(request.order_ids.len());
    for order_id in &request.order_ids {
        let order = state.store.order(*order_id)?;

        if order.assigned_courier != Some(courier_id)
            || order.status != OrderStatus::Delivered
            || order.payment_method != PaymentMethod::Cash
        {
            return Err(AppError::conflict(
                ReasonCode::OrderNotEligible,
                format!("order {order_id} is not a delivered cash order of courier {courier_id}"),
            ));
        }
        if let Some(claimed_by) = state.store.remittance_claims.get(order_id) {
            return Err(already_claimed(*order_id, *claimed_by));
        }

        links.push(RemittanceOrder {
            order_id: *order_id,
            order_total: order.total,
        });
    }

    let linked_total: Money = links.iter().map(|link| link.order_total).sum();
    let discrepancy = request.amount - linked_total;
    if discrepancy.abs() > state.rules.remittance_tolerance {
        warn!(
            courier_id = %courier_id,
            declared = request.amount,
            linked_total,
            discrepancy,
            "remittance amount mismatch"
        );
        return Err(AppError::InvariantViolation {
            code: ReasonCode::AmountMismatch,
            discrepancy,
        });
    }

    let remittance_id = Uuid::new_v4();
    claim_orders(state, remittance_id, &links)?;

    let now = state.store.now();
    let remittance = CashRemittance {
        id: remittance_id,
        courier_id,
        amount: request.amount,
        method: request.method,
        status: RemittanceStatus::Pending,
        orders: links,
        rejection_reason: None,
        created_at: now,
        reviewed_at: None,
    };
    state
        .store
        .remittances
        .insert(remittance_id, remittance.clone());

    state.notify(&[Recipient::Admin.notify(
        NotificationEvent::RemittanceSubmitted {
            remittance_id,
            courier_id,
            amount: remittance.amount,
        },
        now,
    )]);

    info!(
        remittance_id = %remittance_id,
        courier_id = %courier_id,
        amount = remittance.amount,
        orders = remittance.orders.len(),
        "remittance submitted"
    );
    Ok(remittance)
}

fn validate(request: &CreateRemittance) -> Result<(), AppError> {
    if request.order_ids.is_empty() {
        return Err(AppError::validation("order_ids must not be empty"));
    }
    if request.amount <= 0 {
        return Err(AppError::validation("amount must be positive"));
    }
    if request.amount > MAX_AMOUNT {
        return Err(AppError::validation(format!("amount must be <= {MAX_AMOUNT}")));
    }
    let unique: HashSet<&Uuid> = request.order_ids.iter().collect();
    if unique.len() != request.order_ids.len() {
        return Err(AppError::validation("order_ids must not repeat"));
    }
    Ok(())
}

/// Claims every order for `remittance_id` or none of them.
fn claim_orders(
    state: &AppState,
    remittance_id: Uuid,
    links: &[RemittanceOrder],
) -> Result<(), AppError> {
    let claims = &state.store.remittance_claims;

    for (claimed, link) in links.iter().enumerate() {
        match claims.entry(link.order_id) {
            Entry::Vacant(slot) => {
                slot.insert(remittance_id);
            }
            Entry::Occupied(existing) => {
                let holder = *existing.get();
                drop(existing);
                for taken in &links[..claimed] {
                    claims.remove_if(&taken.order_id, |_, owner| *owner == remittance_id);
                }
                return Err(already_claimed(link.order_id, holder));
            }
        }
    }
    Ok(())
}

fn already_claimed(order_id: Uuid, remittance_id: Uuid) -> AppError {
    AppError::conflict(
        ReasonCode::OrderAlreadyClaimed,
        format!("order {order_id} is already linked to remittance {remittance_id}"),
    )
}

pub fn get_remittance(state: &AppState, remittance_id: Uuid) -> Result<CashRemittance, AppError> {
    state
        .store
        .remittances
        .get(&remittance_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("remittance {remittance_id} not found")))
}

/// Records the reviewer's verdict on a pending remittance.
///
/// Completion reconciles the linked orders and lowers the courier's cash on
/// hand. Rejection releases the orders so they can be declared again.
pub fn review_remittance(
    state: &AppState,
    remittance_id: Uuid,
    decision: ReviewDecision,
) -> Result<CashRemittance, AppError> {
    let now = state.store.now();

    let reviewed = {
        let mut remittance = state
            .store
            .remittances
            .get_mut(&remittance_id)
            .ok_or_else(|| AppError::NotFound(format!("remittance {remittance_id} not found")))?;

        if remittance.status != RemittanceStatus::Pending {
            return Err(AppError::conflict(
                ReasonCode::RemittanceAlreadyReviewed,
                format!(
                    "remittance {remittance_id} is already {:?}",
                    remittance.status
                ),
            ));
        }

        match decision {
            ReviewDecision::Complete => {
                remittance.status = RemittanceStatus::Completed;
                for link in &remittance.orders {
                    if let Some(mut order) = state.store.orders.get_mut(&link.order_id) {
                        order.timestamps.cash_reconciled_at = Some(now);
                    }
                }
                if let Some(mut courier) = state.store.couriers.get_mut(&remittance.courier_id) {
                    courier.cash_on_hand -= remittance.amount;
                    courier.updated_at = now;
                }
            }
            ReviewDecision::Reject { reason } => {
                remittance.status = RemittanceStatus::Rejected;
                remittance.rejection_reason = Some(reason);
                for link in &remittance.orders {
                    state
                        .store
                        .remittance_claims
                        .remove_if(&link.order_id, |_, owner| *owner == remittance_id);
                }
            }
        }
        remittance.reviewed_at = Some(now);
        remittance.clone()
    };

    state.notify(&[Recipient::Courier(reviewed.courier_id).notify(
        NotificationEvent::RemittanceReviewed {
            remittance_id,
            status: reviewed.status,
        },
        now,
    )]);
    let outcome = match reviewed.status {
        RemittanceStatus::Completed => "completed",
        _ => "rejected",
    };
    state
        .metrics
        .remittances_total
        .with_label_values(&[outcome])
        .inc();

    info!(
        remittance_id = %remittance_id,
        status = ?reviewed.status,
        "remittance reviewed"
    );
    Ok(reviewed)
}
