use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use uuid::Uuid;

use crate::engine::remittance::{self, CreateRemittance};
use crate::error::AppError;
use crate::models::remittance::{CashRemittance, ReviewDecision};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/remittances", post(create_remittance))
        .route("/remittances/:id", get(get_remittance))
        .route("/remittances/:id/review", post(review_remittance))
}

async fn create_remittance(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRemittance>,
) -> Result<Json<CashRemittance>, AppError> {
    remittance::create_remittance(&state, payload).map(Json)
}

async fn get_remittance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CashRemittance>, AppError> {
    remittance::get_remittance(&state, id).map(Json)
}

async fn review_remittance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewDecision>,
) -> Result<Json<CashRemittance>, AppError> {
    remittance::review_remittance(&state, id, payload).map(Json)
}
