use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::dispatch::{AssignmentResult, DispatchOutcome};
use crate::error::AppError;
use crate::geo::GeoPoint;
use crate::models::assignment::Assignment;
use crate::models::history::StatusHistoryEntry;
use crate::models::notification::Notification;
use crate::models::request::{PickupRequest, RequestStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/requests", post(create_request))
        .route("/requests/:id", get(get_request))
        .route("/requests/:id/dispatch", post(redispatch_request))
        .route("/requests/:id/history", get(request_history))
        .route("/assignments", get(list_assignments))
        .route("/notifications", get(list_notifications))
}

#[derive(Deserialize)]
pub struct CreatePickupRequest {
    pub requester_id: Option<Uuid>,
    pub location: Option<GeoPoint>,
    pub address: String,
}

#[derive(Serialize)]
pub struct DispatchResponse {
    pub request: PickupRequest,
    pub dispatch: AssignmentResult,
}

async fn create_request(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreatePickupRequest>,
) -> Result<Json<DispatchResponse>, AppError> {
    if payload.address.trim().is_empty() {
        return Err(AppError::BadRequest("address cannot be empty".to_string()));
    }

    if let Some(location) = &payload.location {
        if !location.is_valid() {
            return Err(AppError::BadRequest("location is out of range".to_string()));
        }
    }

    let request = PickupRequest {
        id: Uuid::new_v4(),
        requester_id: payload.requester_id,
        location: payload.location,
        address: payload.address,
        status: RequestStatus::Submitted,
        assigned_officer: None,
        created_at: Utc::now(),
    };

    let request_id = request.id;
    state.store.requests.insert(request_id, request);
    run_dispatch(&state, request_id)
}

async fn redispatch_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DispatchResponse>, AppError> {
    run_dispatch(&state, id)
}

fn run_dispatch(state: &AppState, request_id: Uuid) -> Result<Json<DispatchResponse>, AppError> {
    let outcome = state.dispatcher.dispatch(request_id)?;

    if let DispatchOutcome::Assigned(assignment) = &outcome {
        let _ = state.assignment_events_tx.send(assignment.clone());
    }

    let request = state
        .store
        .requests
        .get(&request_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("request {} not found", request_id)))?;

    Ok(Json(DispatchResponse {
        request,
        dispatch: AssignmentResult::from(&outcome),
    }))
}

async fn get_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PickupRequest>, AppError> {
    let request = state
        .store
        .requests
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("request {} not found", id)))?;

    Ok(Json(request.value().clone()))
}

async fn request_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<StatusHistoryEntry>>, AppError> {
    if !state.store.requests.contains_key(&id) {
        return Err(AppError::NotFound(format!("request {} not found", id)));
    }

    Ok(Json(state.store.history_for(&id)))
}

async fn list_assignments(State(state): State<Arc<AppState>>) -> Json<Vec<Assignment>> {
    let assignments = state
        .store
        .assignments
        .iter()
        .map(|entry| entry.value().clone())
        .collect();

    Json(assignments)
}

async fn list_notifications(State(state): State<Arc<AppState>>) -> Json<Vec<Notification>> {
    let mut notifications: Vec<Notification> = state
        .notifications
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    notifications.sort_by_key(|notification| notification.created_at);

    Json(notifications)
}
