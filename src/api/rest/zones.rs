use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::post;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::GeoPoint;
use crate::models::zone::Zone;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/zones", post(create_zone).get(list_zones))
}

#[derive(Deserialize)]
pub struct CreateZoneRequest {
    pub name: String,
    pub center: Option<GeoPoint>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

async fn create_zone(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateZoneRequest>,
) -> Result<Json<Zone>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    if let Some(center) = &payload.center {
        if !center.is_valid() {
            return Err(AppError::BadRequest("center is out of range".to_string()));
        }
    }

    let zone = Zone {
        id: Uuid::new_v4(),
        name: payload.name,
        center: payload.center,
        is_active: payload.is_active,
    };

    state.store.zones.insert(zone.id, zone.clone());
    Ok(Json(zone))
}

async fn list_zones(State(state): State<Arc<AppState>>) -> Json<Vec<Zone>> {
    let zones = state
        .store
        .zones
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(zones)
}
