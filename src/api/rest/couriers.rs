use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, patch};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::couriers::{self, RegisterCourier};
use crate::engine::ledger::{courier_ledger, CourierLedger};
use crate::error::AppError;
use crate::models::courier::{Availability, Courier, CourierStatus, GeoPoint};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/couriers", get(list_couriers).post(create_courier))
        .route("/couriers/:id", get(get_courier))
        .route("/couriers/:id/status", patch(update_courier_status))
        .route("/couriers/:id/availability", patch(update_courier_availability))
        .route("/couriers/:id/location", patch(update_courier_location))
        .route("/couriers/:id/ledger", get(get_courier_ledger))
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: CourierStatus,
}

#[derive(Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub availability: Availability,
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub location: GeoPoint,
}

async fn create_courier(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterCourier>,
) -> Result<Json<Courier>, AppError> {
    couriers::register_courier(&state, payload).map(Json)
}

async fn list_couriers(State(state): State<Arc<AppState>>) -> Json<Vec<Courier>> {
    Json(couriers::list_couriers(&state))
}

async fn get_courier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Courier>, AppError> {
    couriers::get_courier(&state, id).map(Json)
}

async fn update_courier_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Courier>, AppError> {
    couriers::set_courier_status(&state, id, payload.status).map(Json)
}

async fn update_courier_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAvailabilityRequest>,
) -> Result<Json<Courier>, AppError> {
    couriers::set_availability(&state, id, payload.availability).map(Json)
}

async fn update_courier_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<Courier>, AppError> {
    couriers::update_location(&state, id, payload.location).map(Json)
}

async fn get_courier_ledger(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CourierLedger>, AppError> {
    courier_ledger(&state, id).map(Json)
}
