use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::Json;
use axum::Router;
use uuid::Uuid;

use crate::engine::ledger::loyalty_account;
use crate::models::loyalty::LoyaltySummary;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/loyalty/:customer_id", get(get_loyalty))
}

async fn get_loyalty(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<Uuid>,
) -> Json<LoyaltySummary> {
    Json(loyalty_account(&state, customer_id))
}
