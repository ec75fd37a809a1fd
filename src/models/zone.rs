use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoPoint;

/// Administrative area; `center` is an approximate point used only for proximity filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: Uuid,
    pub name: String,
    pub center: Option<GeoPoint>,
    pub is_active: bool,
}
