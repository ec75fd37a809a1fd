use std::collections::BTreeSet;

use uuid::Uuid;

use crate::engine::proximity::NearbyZones;
use crate::engine::snapshot::ReferenceSnapshot;
use crate::models::officer::Officer;
use crate::models::weekday::IsoWeekday;

/// How an officer comes to cover a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    Direct,
    Routine { round_id: Uuid, vehicle_id: Uuid },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevantZone {
    pub zone_id: Uuid,
    pub distance_km: f64,
    pub coverage: Coverage,
}

/// In-radius zones the officer covers on `weekday`: the direct zone first, then
/// the in-radius zones of every round scheduled that day, in round id order.
pub fn relevant_zones(
    snapshot: &ReferenceSnapshot,
    officer: &Officer,
    nearby: &NearbyZones,
    weekday: IsoWeekday,
) -> Vec<RelevantZone> {
    let mut relevant = Vec::new();

    if let Some(zone_id) = officer.zone_id {
        if let Some(distance_km) = nearby.distance_km(&zone_id) {
            relevant.push(RelevantZone {
                zone_id,
                distance_km,
                coverage: Coverage::Direct,
            });
        }
    }

    for round in snapshot.rounds_on(&officer.id, weekday) {
        relevant.extend(
            nearby
                .iter()
                .filter(|zone| round.covers(&zone.zone_id))
                .map(|zone| RelevantZone {
                    zone_id: zone.zone_id,
                    distance_km: zone.distance_km,
                    coverage: Coverage::Routine {
                        round_id: round.id,
                        vehicle_id: round.vehicle_id,
                    },
                }),
        );
    }

    relevant
}

pub fn is_eligible(
    snapshot: &ReferenceSnapshot,
    officer: &Officer,
    nearby: &NearbyZones,
    weekday: IsoWeekday,
) -> bool {
    officer.is_available
        && !officer.is_off_on(weekday)
        && !relevant_zones(snapshot, officer, nearby, weekday).is_empty()
}

pub fn eligible_officers(
    snapshot: &ReferenceSnapshot,
    nearby: &NearbyZones,
    weekday: IsoWeekday,
) -> BTreeSet<Uuid> {
    if nearby.is_empty() {
        return BTreeSet::new();
    }

    snapshot
        .officers
        .values()
        .filter(|officer| is_eligible(snapshot, officer, nearby, weekday))
        .map(|officer| officer.id)
        .collect()
}
