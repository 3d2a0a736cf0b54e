use std::sync::Arc;

use chrono::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::engine::ranking::{rank_candidates, RankedCandidate};
use crate::error::AppError;
use crate::models::assignment::ProposalOutcome;
use crate::models::courier::Courier;
use crate::models::notification::{NotificationEvent, Recipient};
use crate::models::order::{DeliveryOrder, Proposal};
use crate::state::AppState;

/// Consumes orders as they become ready and periodically rescans for ready
/// orders without an active offer.
pub async fn run_proposal_engine(
    state: Arc<AppState>,
    mut ready_rx: mpsc::Receiver<Uuid>,
    rescan_every: std::time::Duration,
) {
    info!("proposal engine started");

    let mut ticker = tokio::time::interval(rescan_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            received = ready_rx.recv() => {
                let Some(order_id) = received else {
                    break;
                };
                state.metrics.ready_orders_in_queue.dec();

                if let Err(err) = propose_order(&state, order_id) {
                    error!(order_id = %order_id, error = %err, "failed to propose order");
                }
            }
            _ = ticker.tick() => {
                let proposed = rescan(&state);
                if proposed > 0 {
                    info!(proposed, "rescan proposed orders");
                }
            }
        }
    }

    warn!("proposal engine stopped: ready queue closed");
}

/// Offers a ready, unassigned order to the nearest eligible courier.
///
/// Safe to call redundantly: an order that already carries an active offer is
/// left untouched, and an order with no eligible courier is left for the next
/// rescan. A lapsed offer is cleared here and its courier excluded.
pub fn propose_order(state: &AppState, order_id: Uuid) -> Result<ProposalOutcome, AppError> {
    let snapshot = state.store.order(order_id)?;
    let now = state.store.now();

    if !snapshot.is_ready_and_unassigned() {
        debug!(order_id = %order_id, status = ?snapshot.status, "order not open for proposals");
        record(state, "skipped");
        return Ok(ProposalOutcome::skipped());
    }
    if let Some(active) = snapshot.active_proposal(now) {
        record(state, "already_proposed");
        return Ok(existing(active));
    }

    let mut excluded = snapshot.excluded_couriers.clone();
    if let Some(lapsed) = &snapshot.proposal {
        excluded.push(lapsed.courier_id);
    }

    let couriers: Vec<Courier> = state
        .store
        .couriers
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    let ranked = rank_candidates(&couriers, snapshot.pickup.as_ref(), &excluded);

    let expiry = Duration::seconds(state.rules.proposal_expiry_seconds);
    let (outcome, committed) = state.store.transact(order_id, |_, uow| {
        if !uow.order.is_ready_and_unassigned() {
            return Ok(ProposalOutcome::skipped());
        }
        if let Some(active) = uow.order.active_proposal(uow.now) {
            return Ok(existing(active));
        }
        if let Some(lapsed) = uow.order.withdraw_proposal() {
            info!(order_id = %order_id, courier_id = %lapsed.courier_id, "proposal expired");
        }

        // Exclusions may have grown since ranking.
        let Some(candidate) = first_eligible(&ranked, &uow.order.excluded_couriers) else {
            return Ok(ProposalOutcome::skipped());
        };

        let proposal = Proposal {
            courier_id: candidate.courier_id,
            expires_at: uow.now + expiry,
        };
        uow.order.proposal = Some(proposal);
        uow.notify(
            Recipient::Courier(candidate.courier_id),
            NotificationEvent::OrderProposed {
                order_id,
                expires_at: proposal.expires_at,
            },
        );

        Ok(ProposalOutcome {
            proposed: true,
            courier_id: Some(proposal.courier_id),
            expires_at: Some(proposal.expires_at),
        })
    })?;
    state.publish(&committed);

    match (outcome.proposed, outcome.courier_id) {
        (true, Some(courier_id)) => {
            record(state, "proposed");
            info!(order_id = %order_id, courier_id = %courier_id, "order proposed");
        }
        (false, Some(_)) => record(state, "already_proposed"),
        _ => {
            record(state, "no_candidate");
            debug!(order_id = %order_id, "no eligible courier; waiting for rescan");
        }
    }

    Ok(outcome)
}

fn first_eligible<'a>(
    ranked: &'a [RankedCandidate],
    excluded: &[Uuid],
) -> Option<&'a RankedCandidate> {
    ranked.iter().find(|c| !excluded.contains(&c.courier_id))
}

/// Drops the current offer, if the order is still open, and offers the order
/// to the next candidate. The previous holder is excluded from later offers.
pub fn clear_proposal_and_propose_next(
    state: &AppState,
    order_id: Uuid,
) -> Result<ProposalOutcome, AppError> {
    let (_, committed) = state.store.transact(order_id, |_, uow| {
        if uow.order.is_ready_and_unassigned()
            && let Some(previous) = uow.order.withdraw_proposal()
        {
            uow.notify(
                Recipient::Courier(previous.courier_id),
                NotificationEvent::OrderReleased { order_id },
            );
        }
        Ok(())
    })?;
    state.publish(&committed);

    propose_order(state, order_id)
}

/// Reads an order, resolving a lapsed offer first.
pub fn get_order(state: &AppState, order_id: Uuid) -> Result<DeliveryOrder, AppError> {
    let order = state.store.order(order_id)?;

    if order.is_ready_and_unassigned() && order.has_expired_proposal(state.store.now()) {
        clear_proposal_and_propose_next(state, order_id)?;
        return state.store.order(order_id);
    }

    Ok(order)
}

/// Re-proposes every ready, unassigned order without an active offer.
/// Returns how many orders received a new offer.
pub fn rescan(state: &AppState) -> usize {
    let now = state.store.now();
    let open: Vec<Uuid> = state
        .store
        .orders
        .iter()
        .filter(|entry| entry.is_ready_and_unassigned() && entry.active_proposal(now).is_none())
        .map(|entry| *entry.key())
        .collect();

    let mut proposed = 0;
    for order_id in open {
        match propose_order(state, order_id) {
            Ok(outcome) if outcome.proposed => proposed += 1,
            Ok(_) => {}
            Err(err) => warn!(order_id = %order_id, error = %err, "rescan proposal failed"),
        }
    }
    proposed
}

fn existing(active: &Proposal) -> ProposalOutcome {
    ProposalOutcome {
        proposed: false,
        courier_id: Some(active.courier_id),
        expires_at: Some(active.expires_at),
    }
}

fn record(state: &AppState, outcome: &str) {
    state
        .metrics
        .proposals_total
        .with_label_values(&[outcome])
        .inc();
}
