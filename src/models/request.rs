use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoPoint;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Submitted,
    Scheduled,
    EnRoute,
    Completed,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Submitted => "submitted",
            RequestStatus::Scheduled => "scheduled",
            RequestStatus::EnRoute => "en_route",
            RequestStatus::Completed => "completed",
            RequestStatus::Rejected => "rejected",
        }
    }

    /// Requests only move forward; `Rejected` is reachable from any non-terminal state.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        use RequestStatus::*;

        matches!(
            (self, next),
            (Submitted, Scheduled)
                | (Scheduled, EnRoute)
                | (EnRoute, Completed)
                | (Submitted | Scheduled | EnRoute, Rejected)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupRequest {
    pub id: Uuid,
    /// `None` for guest submissions.
    pub requester_id: Option<Uuid>,
    pub location: Option<GeoPoint>,
    pub address: String,
    pub status: RequestStatus,
    pub assigned_officer: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
