use std::sync::Mutex;

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::engine::snapshot::ReferenceSnapshot;
use crate::error::StoreError;
use crate::models::assignment::{Assignment, AssignmentStatus};
use crate::models::history::StatusHistoryEntry;
use crate::models::officer::Officer;
use crate::models::request::{PickupRequest, RequestStatus};
use crate::models::routine::RoutineRound;
use crate::models::vehicle::Vehicle;
use crate::models::weekday::IsoWeekday;
use crate::models::zone::Zone;

/// The writes produced by one successful dispatch, applied all-or-nothing.
#[derive(Debug, Clone)]
pub struct DispatchCommit {
    pub assignment: Assignment,
    pub next_status: RequestStatus,
    /// Pickup weekday the officer was matched for; re-checked against the live roster.
    pub target_weekday: IsoWeekday,
    pub history: StatusHistoryEntry,
}

pub trait DispatchStore: Send + Sync {
    fn request(&self, id: &Uuid) -> Result<Option<PickupRequest>, StoreError>;

    fn snapshot(&self) -> Result<ReferenceSnapshot, StoreError>;

    fn commit_dispatch(&self, commit: DispatchCommit) -> Result<(), StoreError>;
}

/// In-memory tables. Reference data is only read by dispatch; requests,
/// assignments and history change through `commit_dispatch`.
#[derive(Default)]
pub struct Store {
    pub zones: DashMap<Uuid, Zone>,
    pub officers: DashMap<Uuid, Officer>,
    pub routine_rounds: DashMap<Uuid, RoutineRound>,
    pub vehicles: DashMap<Uuid, Vehicle>,
    pub requests: DashMap<Uuid, PickupRequest>,
    pub assignments: DashMap<Uuid, Assignment>,
    history: DashMap<Uuid, Vec<StatusHistoryEntry>>,
    commit_lock: Mutex<()>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history_for(&self, subject_id: &Uuid) -> Vec<StatusHistoryEntry> {
        self.history
            .get(subject_id)
            .map(|entries| entries.value().clone())
            .unwrap_or_default()
    }

    pub fn append_history(&self, entry: StatusHistoryEntry) {
        self.history
            .entry(entry.subject.id())
            .or_default()
            .push(entry);
    }

    pub fn active_assignment_for(&self, request_id: &Uuid) -> Option<Assignment> {
        self.assignments
            .iter()
            .find(|entry| {
                entry.request_id == *request_id && entry.status == AssignmentStatus::Active
            })
            .map(|entry| entry.value().clone())
    }

    /// Serialized with `commit_dispatch`, so a commit never assigns an officer
    /// whose availability changed after its roster check.
    pub fn set_officer_availability(
        &self,
        id: &Uuid,
        is_available: bool,
    ) -> Result<Officer, StoreError> {
        let _guard = self
            .commit_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("commit lock poisoned".to_string()))?;

        let mut officer = self
            .officers
            .get_mut(id)
            .ok_or(StoreError::NotFound {
                entity: "officer",
                id: *id,
            })?;
        officer.is_available = is_available;
        officer.updated_at = Utc::now();

        Ok(officer.clone())
    }

    fn check_commit(&self, commit: &DispatchCommit) -> Result<(), StoreError> {
        let assignment = &commit.assignment;

        let status = self
            .requests
            .get(&assignment.request_id)
            .map(|request| request.status)
            .ok_or(StoreError::NotFound {
                entity: "request",
                id: assignment.request_id,
            })?;
        if status != RequestStatus::Submitted || !status.can_transition_to(commit.next_status) {
            return Err(StoreError::StaleRequest {
                id: assignment.request_id,
                status: status.as_str(),
            });
        }

        if self.active_assignment_for(&assignment.request_id).is_some() {
            return Err(StoreError::DuplicateActiveAssignment(assignment.request_id));
        }

        let officer_free = self
            .officers
            .get(&assignment.officer_id)
            .map(|officer| officer.is_available && !officer.is_off_on(commit.target_weekday))
            .ok_or(StoreError::ForeignKey {
                entity: "officer",
                id: assignment.officer_id,
            })?;
        if !officer_free {
            return Err(StoreError::OfficerUnavailable(assignment.officer_id));
        }

        if let Some(vehicle_id) = assignment.vehicle_id {
            if !self.vehicles.contains_key(&vehicle_id) {
                return Err(StoreError::ForeignKey {
                    entity: "vehicle",
                    id: vehicle_id,
                });
            }
        }

        Ok(())
    }
}

impl DispatchStore for Store {
    fn request(&self, id: &Uuid) -> Result<Option<PickupRequest>, StoreError> {
        Ok(self.requests.get(id).map(|entry| entry.value().clone()))
    }

    fn snapshot(&self) -> Result<ReferenceSnapshot, StoreError> {
        Ok(ReferenceSnapshot::new(
            self.zones.iter().map(|entry| entry.value().clone()),
            self.officers.iter().map(|entry| entry.value().clone()),
            self.routine_rounds.iter().map(|entry| entry.value().clone()),
        ))
    }

    fn commit_dispatch(&self, commit: DispatchCommit) -> Result<(), StoreError> {
        let _guard = self
            .commit_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("commit lock poisoned".to_string()))?;

        // Every check runs before the first write so a rejected commit leaves no trace.
        self.check_commit(&commit)?;

        let DispatchCommit {
            assignment,
            next_status,
            history,
            ..
        } = commit;

        if let Some(mut request) = self.requests.get_mut(&assignment.request_id) {
            request.status = next_status;
            request.assigned_officer = Some(assignment.officer_id);
        }
        self.assignments.insert(assignment.id, assignment);
        self.append_history(history);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{DispatchCommit, DispatchStore, Store};
    use crate::error::StoreError;
    use crate::geo::GeoPoint;
    use crate::models::assignment::{Assignment, AssignmentStatus};
    use crate::models::history::{HistorySubject, StatusHistoryEntry};
    use crate::models::officer::Officer;
    use crate::models::request::{PickupRequest, RequestStatus};
    use crate::models::weekday::IsoWeekday;

    fn seeded_store() -> (Store, Uuid, Uuid) {
        let store = Store::new();
        let officer = Officer {
            id: Uuid::new_v4(),
            name: "Sari".to_string(),
            is_available: true,
            days_off: Vec::new(),
            zone_id: None,
            default_vehicle_id: None,
            updated_at: Utc::now(),
        };
        let request = PickupRequest {
            id: Uuid::new_v4(),
            requester_id: None,
            location: Some(GeoPoint::new(-6.9, 108.2)),
            address: "Jl. Merdeka 1".to_string(),
            status: RequestStatus::Submitted,
            assigned_officer: None,
            created_at: Utc::now(),
        };
        let (officer_id, request_id) = (officer.id, request.id);
        store.officers.insert(officer.id, officer);
        store.requests.insert(request.id, request);
        (store, officer_id, request_id)
    }

    fn commit(request_id: Uuid, officer_id: Uuid, vehicle_id: Option<Uuid>) -> DispatchCommit {
        DispatchCommit {
            assignment: Assignment {
                id: Uuid::new_v4(),
                request_id,
                officer_id,
                vehicle_id,
                zone_id: None,
                distance_km: 1.0,
                scheduled_at: Utc::now(),
                status: AssignmentStatus::Active,
                created_at: Utc::now(),
            },
            next_status: RequestStatus::Scheduled,
            target_weekday: IsoWeekday::new(4).unwrap(),
            history: StatusHistoryEntry {
                id: Uuid::new_v4(),
                subject: HistorySubject::Request(request_id),
                status: RequestStatus::Scheduled.as_str().to_string(),
                note: None,
                actor_id: None,
                created_at: Utc::now(),
            },
        }
    }

    #[test]
    fn commit_applies_all_writes() {
        let (store, officer_id, request_id) = seeded_store();

        store
            .commit_dispatch(commit(request_id, officer_id, None))
            .unwrap();

        let request = store.request(&request_id).unwrap().unwrap();
        assert_eq!(request.status, RequestStatus::Scheduled);
        assert_eq!(request.assigned_officer, Some(officer_id));
        assert!(store.active_assignment_for(&request_id).is_some());
        assert_eq!(store.history_for(&request_id).len(), 1);
    }

    #[test]
    fn missing_vehicle_rolls_back_everything() {
        let (store, officer_id, request_id) = seeded_store();

        let err = store
            .commit_dispatch(commit(request_id, officer_id, Some(Uuid::new_v4())))
            .unwrap_err();

        assert!(matches!(err, StoreError::ForeignKey { entity: "vehicle", .. }));
        let request = store.request(&request_id).unwrap().unwrap();
        assert_eq!(request.status, RequestStatus::Submitted);
        assert!(request.assigned_officer.is_none());
        assert!(store.assignments.is_empty());
        assert!(store.history_for(&request_id).is_empty());
    }

    #[test]
    fn officer_made_unavailable_before_commit_is_not_assigned() {
        let (store, officer_id, request_id) = seeded_store();
        if let Some(mut officer) = store.officers.get_mut(&officer_id) {
            officer.is_available = false;
        }

        let err = store
            .commit_dispatch(commit(request_id, officer_id, None))
            .unwrap_err();

        assert!(matches!(err, StoreError::OfficerUnavailable(id) if id == officer_id));
        assert_eq!(
            store.request(&request_id).unwrap().unwrap().status,
            RequestStatus::Submitted
        );
        assert!(store.assignments.is_empty());
        assert!(store.history_for(&request_id).is_empty());
    }

    #[test]
    fn officer_given_the_day_off_before_commit_is_not_assigned() {
        let (store, officer_id, request_id) = seeded_store();
        if let Some(mut officer) = store.officers.get_mut(&officer_id) {
            officer.days_off = vec![IsoWeekday::new(4).unwrap()];
        }

        let err = store
            .commit_dispatch(commit(request_id, officer_id, None))
            .unwrap_err();

        assert!(matches!(err, StoreError::OfficerUnavailable(_)));
        assert!(store.assignments.is_empty());
    }

    #[test]
    fn availability_update_is_visible_to_the_next_commit() {
        let (store, officer_id, request_id) = seeded_store();

        let officer = store.set_officer_availability(&officer_id, false).unwrap();
        assert!(!officer.is_available);

        let err = store
            .commit_dispatch(commit(request_id, officer_id, None))
            .unwrap_err();
        assert!(matches!(err, StoreError::OfficerUnavailable(_)));
        assert!(matches!(
            store.set_officer_availability(&Uuid::new_v4(), true),
            Err(StoreError::NotFound { entity: "officer", .. })
        ));
    }

    #[test]
    fn second_commit_for_same_request_is_rejected() {
        let (store, officer_id, request_id) = seeded_store();

        store
            .commit_dispatch(commit(request_id, officer_id, None))
            .unwrap();
        let err = store
            .commit_dispatch(commit(request_id, officer_id, None))
            .unwrap_err();

        assert!(matches!(err, StoreError::StaleRequest { .. }));
        assert_eq!(store.assignments.len(), 1);
        assert_eq!(store.history_for(&request_id).len(), 1);
    }
}
