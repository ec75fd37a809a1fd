use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::weekday::IsoWeekday;

/// Recurring collection round: where `officer_id` collects with `vehicle_id` every `weekday`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineRound {
    pub id: Uuid,
    pub officer_id: Uuid,
    pub weekday: IsoWeekday,
    pub vehicle_id: Uuid,
    pub zone_ids: Vec<Uuid>,
}

impl RoutineRound {
    pub fn covers(&self, zone_id: &Uuid) -> bool {
        self.zone_ids.contains(zone_id)
    }
}
