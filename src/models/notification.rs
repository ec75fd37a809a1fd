use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Audience {
    AllAdmins,
    ZoneOfficers(Uuid),
    Officer(Uuid),
    User(Uuid),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub audience: Audience,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
