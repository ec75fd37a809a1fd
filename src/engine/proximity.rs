use std::collections::BTreeMap;

use uuid::Uuid;

use crate::geo::{GeoPoint, haversine_km};
use crate::models::zone::Zone;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyZone {
    pub zone_id: Uuid,
    pub distance_km: f64,
}

/// Zones within the dispatch radius of a request, keyed by zone id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NearbyZones {
    by_zone: BTreeMap<Uuid, f64>,
}

impl NearbyZones {
    pub fn is_empty(&self) -> bool {
        self.by_zone.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_zone.len()
    }

    pub fn contains(&self, zone_id: &Uuid) -> bool {
        self.by_zone.contains_key(zone_id)
    }

    pub fn distance_km(&self, zone_id: &Uuid) -> Option<f64> {
        self.by_zone.get(zone_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = NearbyZone> + '_ {
        self.by_zone
            .iter()
            .map(|(zone_id, distance_km)| NearbyZone {
                zone_id: *zone_id,
                distance_km: *distance_km,
            })
    }

    pub fn nearest(&self) -> Option<NearbyZone> {
        self.iter()
            .min_by(|a, b| a.distance_km.total_cmp(&b.distance_km))
    }
}

impl FromIterator<NearbyZone> for NearbyZones {
    fn from_iter<I: IntoIterator<Item = NearbyZone>>(iter: I) -> Self {
        Self {
            by_zone: iter
                .into_iter()
                .map(|zone| (zone.zone_id, zone.distance_km))
                .collect(),
        }
    }
}

/// Active zones with a registered center no further than `radius_km` from `location`.
/// The boundary is inclusive. A request without a coordinate has no nearby zones.
pub fn nearby_zones<'a>(
    location: Option<&GeoPoint>,
    zones: impl IntoIterator<Item = &'a Zone>,
    radius_km: f64,
) -> NearbyZones {
    let Some(location) = location else {
        return NearbyZones::default();
    };

    zones
        .into_iter()
        .filter(|zone| zone.is_active)
        .filter_map(|zone| {
            let center = zone.center.as_ref()?;
            let distance_km = haversine_km(location, center);
            (distance_km <= radius_km).then_some(NearbyZone {
                zone_id: zone.id,
                distance_km,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::nearby_zones;
    use crate::geo::{GeoPoint, haversine_km};
    use crate::models::zone::Zone;

    // Kilometers per degree of latitude on a 6371 km sphere.
    const KM_PER_DEGREE: f64 = 111.194_926_644_558_73;

    fn zone(seed: u128, center: Option<GeoPoint>, is_active: bool) -> Zone {
        Zone {
            id: Uuid::from_u128(seed),
            name: format!("zone-{seed}"),
            center,
            is_active,
        }
    }

    fn north_of(origin: GeoPoint, km: f64) -> GeoPoint {
        GeoPoint::new(origin.lat + km / KM_PER_DEGREE, origin.lng)
    }

    #[test]
    fn no_coordinate_yields_nothing() {
        let zones = vec![zone(1, Some(GeoPoint::new(-6.9, 108.2)), true)];
        assert!(nearby_zones(None, &zones, 4.0).is_empty());
    }

    #[test]
    fn skips_inactive_and_centerless_zones() {
        let origin = GeoPoint::new(-6.9, 108.2);
        let zones = vec![
            zone(1, Some(origin), false),
            zone(2, None, true),
            zone(3, Some(north_of(origin, 1.0)), true),
        ];

        let nearby = nearby_zones(Some(&origin), &zones, 4.0);
        assert_eq!(nearby.len(), 1);
        assert!(nearby.contains(&Uuid::from_u128(3)));
    }

    #[test]
    fn zone_at_exactly_the_radius_is_included() {
        let origin = GeoPoint::new(-6.9, 108.2);
        let edge = zone(1, Some(north_of(origin, 4.0)), true);
        let edge_distance = haversine_km(&origin, edge.center.as_ref().unwrap());
        assert!((edge_distance - 4.0).abs() < 1e-9);

        let nearby = nearby_zones(Some(&origin), [&edge], 4.0);
        assert!(nearby.contains(&edge.id));
    }

    #[test]
    fn radius_comparison_is_inclusive() {
        let origin = GeoPoint::new(-6.9, 108.2);
        let edge = zone(1, Some(north_of(origin, 2.5)), true);
        let edge_distance = haversine_km(&origin, edge.center.as_ref().unwrap());

        assert!(nearby_zones(Some(&origin), [&edge], edge_distance).contains(&edge.id));
        assert!(nearby_zones(Some(&origin), [&edge], edge_distance - 1e-9).is_empty());
    }

    #[test]
    fn zone_just_past_the_radius_is_excluded() {
        let origin = GeoPoint::new(-6.9, 108.2);
        let inside = zone(1, Some(north_of(origin, 3.999)), true);
        let outside = zone(2, Some(north_of(origin, 4.001)), true);

        let nearby = nearby_zones(Some(&origin), [&inside, &outside], 4.0);
        assert!(nearby.contains(&inside.id));
        assert!(!nearby.contains(&outside.id));
        assert!((nearby.distance_km(&inside.id).unwrap() - 3.999).abs() < 1e-6);
    }

    #[test]
    fn nearest_picks_smallest_distance() {
        let origin = GeoPoint::new(-6.9, 108.2);
        let zones = vec![
            zone(1, Some(north_of(origin, 3.0)), true),
            zone(2, Some(north_of(origin, 0.5)), true),
        ];

        let nearest = nearby_zones(Some(&origin), &zones, 4.0).nearest().unwrap();
        assert_eq!(nearest.zone_id, Uuid::from_u128(2));
    }
}
