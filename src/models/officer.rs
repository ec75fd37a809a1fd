use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::weekday::IsoWeekday;

pub const MAX_DAYS_OFF: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Officer {
    pub id: Uuid,
    pub name: String,
    pub is_available: bool,
    pub days_off: Vec<IsoWeekday>,
    pub zone_id: Option<Uuid>,
    pub default_vehicle_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl Officer {
    pub fn is_off_on(&self, day: IsoWeekday) -> bool {
        self.days_off.contains(&day)
    }
}
