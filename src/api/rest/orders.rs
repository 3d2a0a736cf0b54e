use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::acceptance::accept_order;
use crate::engine::decline::{decline_delivery, DeclineOutcome};
use crate::engine::ledger::ledger_for_order;
use crate::engine::lifecycle::{self, Actor, CreateOrder};
use crate::engine::proposal::{self, propose_order};
use crate::engine::settlement::{confirm_delivery, SettlementReport};
use crate::error::AppError;
use crate::models::assignment::{Assignment, ProposalOutcome};
use crate::models::ledger::LedgerEntry;
use crate::models::order::{DeliveryOrder, OrderStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/transition", post(transition_order))
        .route("/orders/:id/propose", post(propose))
        .route("/orders/:id/accept", post(accept))
        .route("/orders/:id/decline", post(decline))
        .route("/orders/:id/deliver", post(deliver))
        .route("/orders/:id/ledger", get(order_ledger))
}

#[derive(Deserialize)]
pub struct TransitionRequest {
    pub actor: Actor,
    pub status: OrderStatus,
}

/// Body shared by the courier-facing order actions.
#[derive(Deserialize)]
pub struct CourierActionRequest {
    pub courier_id: Uuid,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrder>,
) -> Result<Json<DeliveryOrder>, AppError> {
    lifecycle::create_order(&state, payload).map(Json)
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeliveryOrder>, AppError> {
    proposal::get_order(&state, id).map(Json)
}

async fn transition_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionRequest>,
) -> Result<Json<DeliveryOrder>, AppError> {
    lifecycle::transition(&state, id, payload.actor, payload.status).map(Json)
}

async fn propose(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProposalOutcome>, AppError> {
    propose_order(&state, id).map(Json)
}

async fn accept(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CourierActionRequest>,
) -> Result<Json<Assignment>, AppError> {
    accept_order(&state, id, payload.courier_id).map(Json)
}

async fn decline(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CourierActionRequest>,
) -> Result<Json<DeclineOutcome>, AppError> {
    decline_delivery(&state, id, payload.courier_id).map(Json)
}

async fn deliver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CourierActionRequest>,
) -> Result<Json<SettlementReport>, AppError> {
    confirm_delivery(&state, id, payload.courier_id).map(Json)
}

async fn order_ledger(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LedgerEntry>>, AppError> {
    ledger_for_order(&state, id).map(Json)
}
