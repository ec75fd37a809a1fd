use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum HistorySubject {
    Request(Uuid),
    Assignment(Uuid),
}

impl HistorySubject {
    pub fn id(&self) -> Uuid {
        match self {
            HistorySubject::Request(id) | HistorySubject::Assignment(id) => *id,
        }
    }
}

/// Append-only audit row. `actor_id` is `None` for system-generated transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub id: Uuid,
    pub subject: HistorySubject,
    pub status: String,
    pub note: Option<String>,
    pub actor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
