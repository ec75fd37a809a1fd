use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("foreign key violation: {entity} {id} does not exist")]
    ForeignKey { entity: &'static str, id: Uuid },

    #[error("request {0} already has an active assignment")]
    DuplicateActiveAssignment(Uuid),

    #[error("request {id} is {status}, expected submitted")]
    StaleRequest { id: Uuid, status: &'static str },

    #[error("officer {0} is no longer available on the pickup day")]
    OfficerUnavailable(Uuid),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("request {0} not found")]
    RequestNotFound(Uuid),

    #[error("no pickup date can be scheduled after {0}")]
    ScheduleOutOfRange(DateTime<Utc>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::RequestNotFound(id) => {
                AppError::NotFound(format!("request {id} not found"))
            }
            DispatchError::ScheduleOutOfRange(now) => {
                AppError::Internal(format!("no pickup date can be scheduled after {now}"))
            }
            DispatchError::Store(
                err @ (StoreError::DuplicateActiveAssignment(_)
                | StoreError::StaleRequest { .. }
                | StoreError::OfficerUnavailable(_)),
            ) => AppError::Conflict(err.to_string()),
            DispatchError::Store(err) => AppError::Storage(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Storage(err) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
