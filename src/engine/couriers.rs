use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::courier::{Availability, Courier, CourierStatus, GeoPoint};
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterCourier {
    pub name: String,
    pub location: Option<GeoPoint>,
    pub status: Option<CourierStatus>,
    pub availability: Option<Availability>,
}

pub fn register_courier(state: &AppState, request: RegisterCourier) -> Result<Courier, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::validation("name cannot be empty"));
    }
    if let Some(location) = &request.location {
        validate_location(location)?;
    }

    let mut courier = Courier::new(request.name, request.location, state.store.now());
    if let Some(status) = request.status {
        courier.status = status;
    }
    if let Some(availability) = request.availability {
        courier.availability = availability;
    }

    state.store.couriers.insert(courier.id, courier.clone());
    info!(courier_id = %courier.id, "courier registered");
    Ok(courier)
}

pub fn get_courier(state: &AppState, courier_id: Uuid) -> Result<Courier, AppError> {
    state.store.courier(courier_id)
}

pub fn list_couriers(state: &AppState) -> Vec<Courier> {
    let mut couriers: Vec<Courier> = state
        .store
        .couriers
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    couriers.sort_by_key(|courier| courier.id);
    couriers
}

pub fn set_courier_status(
    state: &AppState,
    courier_id: Uuid,
    status: CourierStatus,
) -> Result<Courier, AppError> {
    update_courier(state, courier_id, |courier| {
        courier.status = status;
        Ok(())
    })
}

pub fn set_availability(
    state: &AppState,
    courier_id: Uuid,
    availability: Availability,
) -> Result<Courier, AppError> {
    update_courier(state, courier_id, |courier| {
        courier.availability = availability;
        Ok(())
    })
}

pub fn update_location(
    state: &AppState,
    courier_id: Uuid,
    location: GeoPoint,
) -> Result<Courier, AppError> {
    validate_location(&location)?;
    update_courier(state, courier_id, |courier| {
        courier.location = Some(location);
        Ok(())
    })
}

fn update_courier(
    state: &AppState,
    courier_id: Uuid,
    apply: impl FnOnce(&mut Courier) -> Result<(), AppError>,
) -> Result<Courier, AppError> {
    let now = state.store.now();
    let mut courier = state
        .store
        .couriers
        .get_mut(&courier_id)
        .ok_or_else(|| AppError::NotFound(format!("courier {courier_id} not found")))?;

    apply(&mut courier)?;
    courier.updated_at = now;

    Ok(courier.clone())
}

pub(crate) fn validate_location(location: &GeoPoint) -> Result<(), AppError> {
    let valid = location.lat.is_finite()
        && location.lng.is_finite()
        && (-90.0..=90.0).contains(&location.lat)
        && (-180.0..=180.0).contains(&location.lng);

    if valid {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "invalid coordinates ({}, {})",
            location.lat, location.lng
        )))
    }
}
