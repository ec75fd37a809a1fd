use std::collections::BTreeSet;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{patch, post};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, StoreError};
use crate::models::officer::{MAX_DAYS_OFF, Officer};
use crate::models::weekday::IsoWeekday;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/officers", post(create_officer).get(list_officers))
        .route("/officers/:id/availability", patch(update_availability))
}

#[derive(Deserialize)]
pub struct CreateOfficerRequest {
    pub name: String,
    #[serde(default)]
    pub days_off: Vec<IsoWeekday>,
    pub zone_id: Option<Uuid>,
    pub default_vehicle_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub is_available: bool,
}

async fn create_officer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOfficerRequest>,
) -> Result<Json<Officer>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    let days_off: BTreeSet<IsoWeekday> = payload.days_off.into_iter().collect();
    if days_off.len() > MAX_DAYS_OFF {
        return Err(AppError::BadRequest(format!(
            "an officer can have at most {MAX_DAYS_OFF} days off"
        )));
    }

    if let Some(zone_id) = payload.zone_id {
        if !state.store.zones.contains_key(&zone_id) {
            return Err(AppError::BadRequest(format!("zone {zone_id} does not exist")));
        }
    }

    if let Some(vehicle_id) = payload.default_vehicle_id {
        if !state.store.vehicles.contains_key(&vehicle_id) {
            return Err(AppError::BadRequest(format!(
                "vehicle {vehicle_id} does not exist"
            )));
        }
    }

    let officer = Officer {
        id: Uuid::new_v4(),
        name: payload.name,
        is_available: true,
        days_off: days_off.into_iter().collect(),
        zone_id: payload.zone_id,
        default_vehicle_id: payload.default_vehicle_id,
        updated_at: Utc::now(),
    };

    state.store.officers.insert(officer.id, officer.clone());
    Ok(Json(officer))
}

async fn list_officers(State(state): State<Arc<AppState>>) -> Json<Vec<Officer>> {
    let officers = state
        .store
        .officers
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(officers)
}

async fn update_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAvailabilityRequest>,
) -> Result<Json<Officer>, AppError> {
    let officer = state
        .store
        .set_officer_availability(&id, payload.is_available)
        .map_err(|err| match err {
            StoreError::NotFound { .. } => AppError::NotFound(format!("officer {} not found", id)),
            other => AppError::Storage(other),
        })?;

    Ok(Json(officer))
}
