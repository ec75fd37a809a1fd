use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::post;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::routine::RoutineRound;
use crate::models::vehicle::Vehicle;
use crate::models::weekday::IsoWeekday;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/vehicles", post(create_vehicle))
        .route("/routine-rounds", post(create_routine_round))
}

#[derive(Deserialize)]
pub struct CreateVehicleRequest {
    pub plate_number: String,
    pub default_officer_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct CreateRoutineRoundRequest {
    pub officer_id: Uuid,
    pub weekday: IsoWeekday,
    pub vehicle_id: Uuid,
    pub zone_ids: Vec<Uuid>,
}

async fn create_vehicle(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateVehicleRequest>,
) -> Result<Json<Vehicle>, AppError> {
    if payload.plate_number.trim().is_empty() {
        return Err(AppError::BadRequest("plate_number cannot be empty".to_string()));
    }

    let vehicle = Vehicle {
        id: Uuid::new_v4(),
        plate_number: payload.plate_number,
        default_officer_id: payload.default_officer_id,
        created_at: Utc::now(),
    };

    state.store.vehicles.insert(vehicle.id, vehicle.clone());
    Ok(Json(vehicle))
}

async fn create_routine_round(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRoutineRoundRequest>,
) -> Result<Json<RoutineRound>, AppError> {
    if !state.store.officers.contains_key(&payload.officer_id) {
        return Err(AppError::BadRequest(format!(
            "officer {} does not exist",
            payload.officer_id
        )));
    }

    if !state.store.vehicles.contains_key(&payload.vehicle_id) {
        return Err(AppError::BadRequest(format!(
            "vehicle {} does not exist",
            payload.vehicle_id
        )));
    }

    if payload.zone_ids.is_empty() {
        return Err(AppError::BadRequest("zone_ids cannot be empty".to_string()));
    }

    if let Some(missing) = payload
        .zone_ids
        .iter()
        .find(|zone_id| !state.store.zones.contains_key(*zone_id))
    {
        return Err(AppError::BadRequest(format!("zone {missing} does not exist")));
    }

    let round = RoutineRound {
        id: Uuid::new_v4(),
        officer_id: payload.officer_id,
        weekday: payload.weekday,
        vehicle_id: payload.vehicle_id,
        zone_ids: payload.zone_ids,
    };

    state.store.routine_rounds.insert(round.id, round.clone());
    Ok(Json(round))
}
