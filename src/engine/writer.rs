use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::engine::eligibility::{Coverage, relevant_zones};
use crate::engine::policy::DispatchPolicy;
use crate::engine::proximity::NearbyZones;
use crate::engine::ranking::RankedOfficer;
use crate::engine::snapshot::ReferenceSnapshot;
use crate::error::StoreError;
use crate::models::assignment::{Assignment, AssignmentStatus};
use crate::models::history::{HistorySubject, StatusHistoryEntry};
use crate::models::officer::Officer;
use crate::models::request::{PickupRequest, RequestStatus};
use crate::models::weekday::IsoWeekday;
use crate::store::{DispatchCommit, DispatchStore};

/// Everything one dispatch run matched against.
pub struct MatchContext<'a> {
    pub snapshot: &'a ReferenceSnapshot,
    pub nearby: &'a NearbyZones,
    pub weekday: IsoWeekday,
    pub now: DateTime<Utc>,
    pub scheduled_at: DateTime<Utc>,
}

pub struct AssignmentWriter<'a> {
    store: &'a dyn DispatchStore,
    policy: &'a DispatchPolicy,
}

impl<'a> AssignmentWriter<'a> {
    pub fn new(store: &'a dyn DispatchStore, policy: &'a DispatchPolicy) -> Self {
        Self { store, policy }
    }

    /// Persists the assignment, the `scheduled` transition and its history row in one commit.
    pub fn write(
        &self,
        request: &PickupRequest,
        officer: &Officer,
        selection: &RankedOfficer,
        context: &MatchContext<'_>,
    ) -> Result<Assignment, StoreError> {
        let now = context.now;
        let assignment = Assignment {
            id: Uuid::new_v4(),
            request_id: request.id,
            officer_id: officer.id,
            vehicle_id: resolve_vehicle(context.snapshot, officer, context.nearby, context.weekday),
            zone_id: selection.closest.map(|zone| zone.zone_id),
            distance_km: selection.distance_km,
            scheduled_at: context.scheduled_at,
            status: AssignmentStatus::Active,
            created_at: now,
        };

        let history = StatusHistoryEntry {
            id: Uuid::new_v4(),
            subject: HistorySubject::Request(request.id),
            status: RequestStatus::Scheduled.as_str().to_string(),
            note: Some(self.history_note(officer, selection, context.snapshot)),
            actor_id: None,
            created_at: now,
        };

        self.store.commit_dispatch(DispatchCommit {
            assignment: assignment.clone(),
            next_status: RequestStatus::Scheduled,
            target_weekday: context.weekday,
            history,
        })?;

        Ok(assignment)
    }

    fn history_note(
        &self,
        officer: &Officer,
        selection: &RankedOfficer,
        snapshot: &ReferenceSnapshot,
    ) -> String {
        let zone_name = selection
            .closest
            .and_then(|zone| snapshot.zone(&zone.zone_id))
            .map_or("unknown zone", |zone| zone.name.as_str());

        format!(
            "Automatically assigned to officer {} ({}, {:.2} km from {}, within {} km radius)",
            officer.name, officer.id, selection.distance_km, zone_name, self.policy.radius_km
        )
    }
}

/// Vehicle of the routine round that brings the officer closest to the request,
/// else the officer's default vehicle.
pub fn resolve_vehicle(
    snapshot: &ReferenceSnapshot,
    officer: &Officer,
    nearby: &NearbyZones,
    weekday: IsoWeekday,
) -> Option<Uuid> {
    relevant_zones(snapshot, officer, nearby, weekday)
        .into_iter()
        .filter_map(|zone| match zone.coverage {
            Coverage::Routine {
                round_id,
                vehicle_id,
            } => Some((zone.distance_km, round_id, vehicle_id)),
            Coverage::Direct => None,
        })
        .min_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, _, vehicle_id)| vehicle_id)
        .or(officer.default_vehicle_id)
}
