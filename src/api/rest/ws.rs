use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use futures::SinkExt;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::assignment::Assignment;
use crate::state::AppState;

/// `?officer_id=` narrows the feed to one officer's pickups; without it the
/// client sees every assignment (admin console).
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub officer_id: Option<Uuid>,
}

impl FeedQuery {
    fn wants(&self, assignment: &Assignment) -> bool {
        self.officer_id
            .is_none_or(|officer_id| officer_id == assignment.officer_id)
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename = "pickup_scheduled")]
pub struct PickupScheduledEvent {
    pub assignment_id: Uuid,
    pub request_id: Uuid,
    pub officer_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub zone_id: Option<Uuid>,
    pub distance_km: f64,
    pub scheduled_at: DateTime<Utc>,
}

impl From<&Assignment> for PickupScheduledEvent {
    fn from(assignment: &Assignment) -> Self {
        Self {
            assignment_id: assignment.id,
            request_id: assignment.request_id,
            officer_id: assignment.officer_id,
            vehicle_id: assignment.vehicle_id,
            zone_id: assignment.zone_id,
            distance_km: assignment.distance_km,
            scheduled_at: assignment.scheduled_at,
        }
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<FeedQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, query: FeedQuery) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.assignment_events_tx.subscribe();

    info!(officer_id = ?query.officer_id, "assignment feed client connected");

    let send_task = tokio::spawn(async move {
        loop {
            let assignment = match rx.recv().await {
                Ok(assignment) => assignment,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "assignment feed client lagging; events skipped");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            if !query.wants(&assignment) {
                continue;
            }

            let json = match serde_json::to_string(&PickupScheduledEvent::from(&assignment)) {
                Ok(json) => json,
                Err(err) => {
                    warn!(
                        error = %err,
                        assignment_id = %assignment.id,
                        "failed to serialize assignment for ws"
                    );
                    continue;
                }
            };

            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(_msg)) = receiver.next().await {}
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    info!("assignment feed client disconnected");
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{FeedQuery, PickupScheduledEvent};
    use crate::models::assignment::{Assignment, AssignmentStatus};

    fn assignment(officer_id: Uuid) -> Assignment {
        Assignment {
            id: Uuid::new_v4(),
            request_id: Uuid::new_v4(),
            officer_id,
            vehicle_id: None,
            zone_id: Some(Uuid::new_v4()),
            distance_km: 2.48,
            scheduled_at: Utc::now(),
            status: AssignmentStatus::Active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn unfiltered_feed_wants_everything() {
        let query = FeedQuery::default();
        assert!(query.wants(&assignment(Uuid::new_v4())));
    }

    #[test]
    fn officer_feed_skips_other_officers() {
        let officer_id = Uuid::new_v4();
        let query = FeedQuery {
            officer_id: Some(officer_id),
        };

        assert!(query.wants(&assignment(officer_id)));
        assert!(!query.wants(&assignment(Uuid::new_v4())));
    }

    #[test]
    fn event_is_tagged_and_omits_internal_status() {
        let assignment = assignment(Uuid::new_v4());
        let value = serde_json::to_value(PickupScheduledEvent::from(&assignment)).unwrap();

        assert_eq!(value["type"], "pickup_scheduled");
        assert_eq!(value["assignment_id"], assignment.id.to_string());
        assert_eq!(value["request_id"], assignment.request_id.to_string());
        assert!(value.get("status").is_none());
    }
}
