use std::cmp::Ordering;
use std::collections::BTreeSet;

use uuid::Uuid;

use crate::engine::eligibility::{RelevantZone, relevant_zones};
use crate::engine::proximity::NearbyZones;
use crate::engine::snapshot::ReferenceSnapshot;
use crate::models::weekday::IsoWeekday;

/// Rank key for officers with no resolvable relevant zone; sorts them last.
const UNRESOLVED_DISTANCE_KM: f64 = f64::MAX;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedOfficer {
    pub officer_id: Uuid,
    pub distance_km: f64,
    pub closest: Option<RelevantZone>,
}

impl RankedOfficer {
    /// Nearest first; equal distances fall back to the lowest officer id.
    fn rank_cmp(&self, other: &Self) -> Ordering {
        self.distance_km
            .total_cmp(&other.distance_km)
            .then_with(|| self.officer_id.cmp(&other.officer_id))
    }
}

pub fn rank_officers(
    snapshot: &ReferenceSnapshot,
    eligible: &BTreeSet<Uuid>,
    nearby: &NearbyZones,
    weekday: IsoWeekday,
) -> Vec<RankedOfficer> {
    let mut ranked: Vec<RankedOfficer> = eligible
        .iter()
        .map(|officer_id| {
            let closest = snapshot.officer(officer_id).and_then(|officer| {
                relevant_zones(snapshot, officer, nearby, weekday)
                    .into_iter()
                    .min_by(|a, b| a.distance_km.total_cmp(&b.distance_km))
            });

            RankedOfficer {
                officer_id: *officer_id,
                distance_km: closest.map_or(UNRESOLVED_DISTANCE_KM, |zone| zone.distance_km),
                closest,
            }
        })
        .collect();

    ranked.sort_by(RankedOfficer::rank_cmp);
    ranked
}

pub fn select_best(
    snapshot: &ReferenceSnapshot,
    eligible: &BTreeSet<Uuid>,
    nearby: &NearbyZones,
    weekday: IsoWeekday,
) -> Option<RankedOfficer> {
    rank_officers(snapshot, eligible, nearby, weekday)
        .into_iter()
        .next()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use uuid::Uuid;

    use super::{UNRESOLVED_DISTANCE_KM, rank_officers, select_best};
    use crate::engine::eligibility::fixtures::{day, officer, round, zone};
    use crate::engine::proximity::{NearbyZone, NearbyZones};
    use crate::engine::snapshot::ReferenceSnapshot;

    fn nearby(entries: &[(u128, f64)]) -> NearbyZones {
        entries
            .iter()
            .map(|(seed, distance_km)| NearbyZone {
                zone_id: Uuid::from_u128(*seed),
                distance_km: *distance_km,
            })
            .collect()
    }

    fn ids(seeds: &[u128]) -> BTreeSet<Uuid> {
        seeds.iter().map(|seed| Uuid::from_u128(*seed)).collect()
    }

    #[test]
    fn empty_eligible_set_selects_nobody() {
        let snapshot = ReferenceSnapshot::default();
        assert!(select_best(&snapshot, &BTreeSet::new(), &nearby(&[(10, 1.0)]), day(4)).is_none());
    }

    #[test]
    fn closest_relevant_zone_wins() {
        let near = zone(10, -6.9, 108.2);
        let far = zone(11, -6.93, 108.2);
        let snapshot = ReferenceSnapshot::new(
            [near.clone(), far.clone()],
            [officer(1, Some(far.id)), officer(2, Some(near.id))],
            [],
        );

        let best = select_best(
            &snapshot,
            &ids(&[1, 2]),
            &nearby(&[(10, 0.4), (11, 3.1)]),
            day(4),
        )
        .unwrap();
        assert_eq!(best.officer_id, Uuid::from_u128(2));
        assert!((best.distance_km - 0.4).abs() < 1e-12);
    }

    #[test]
    fn routine_zone_distance_is_used_for_ranking() {
        let direct = zone(10, -6.93, 108.2);
        let visited = zone(11, -6.9, 108.2);
        let rounder = officer(1, None);
        let r = round(100, rounder.id, day(4), Uuid::from_u128(500), vec![visited.id]);
        let snapshot = ReferenceSnapshot::new(
            [direct.clone(), visited],
            [rounder, officer(2, Some(direct.id))],
            [r],
        );

        let ranked = rank_officers(
            &snapshot,
            &ids(&[1, 2]),
            &nearby(&[(10, 3.0), (11, 0.8)]),
            day(4),
        );
        assert_eq!(ranked[0].officer_id, Uuid::from_u128(1));
        assert!((ranked[0].distance_km - 0.8).abs() < 1e-12);
        assert_eq!(ranked[1].officer_id, Uuid::from_u128(2));
    }

    #[test]
    fn equal_distances_break_ties_by_lowest_officer_id() {
        let shared = zone(10, -6.9, 108.2);
        let snapshot = ReferenceSnapshot::new(
            [shared.clone()],
            [officer(7, Some(shared.id)), officer(3, Some(shared.id)), officer(5, Some(shared.id))],
            [],
        );
        let zones = nearby(&[(10, 1.5)]);

        for _ in 0..10 {
            let best = select_best(&snapshot, &ids(&[7, 5, 3]), &zones, day(4)).unwrap();
            assert_eq!(best.officer_id, Uuid::from_u128(3));
        }
    }

    #[test]
    fn officer_without_relevant_zone_sorts_last() {
        let shared = zone(10, -6.9, 108.2);
        let snapshot = ReferenceSnapshot::new(
            [shared.clone()],
            [officer(1, None), officer(2, Some(shared.id))],
            [],
        );

        let ranked = rank_officers(&snapshot, &ids(&[1, 2]), &nearby(&[(10, 3.9)]), day(4));
        assert_eq!(ranked[0].officer_id, Uuid::from_u128(2));
        assert_eq!(ranked[1].distance_km, UNRESOLVED_DISTANCE_KM);
        assert!(ranked[1].closest.is_none());
    }
}
