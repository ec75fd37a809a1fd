use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::engine::clock::Clock;
use crate::engine::eligibility::eligible_officers;
use crate::engine::notify::Notifier;
use crate::engine::policy::DispatchPolicy;
use crate::engine::proximity::{NearbyZones, nearby_zones};
use crate::engine::ranking::select_best;
use crate::engine::writer::{AssignmentWriter, MatchContext};
use crate::error::DispatchError;
use crate::models::assignment::Assignment;
use crate::models::notification::Audience;
use crate::models::request::{PickupRequest, RequestStatus};
use crate::models::weekday::IsoWeekday;
use crate::observability::metrics::Metrics;
use crate::store::DispatchStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnassignedReason {
    NoCoordinate,
    NoZoneInRadius,
    NoEligibleOfficer,
    AlreadyDispatched,
}

impl UnassignedReason {
    pub fn as_str(self) -> &'static str {
        match self {
            UnassignedReason::NoCoordinate => "no_coordinate",
            UnassignedReason::NoZoneInRadius => "no_zone_in_radius",
            UnassignedReason::NoEligibleOfficer => "no_eligible_officer",
            UnassignedReason::AlreadyDispatched => "already_dispatched",
        }
    }
}

#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    Assigned(Assignment),
    Unassigned(UnassignedReason),
}

impl DispatchOutcome {
    fn label(&self) -> &'static str {
        match self {
            DispatchOutcome::Assigned(_) => "assigned",
            DispatchOutcome::Unassigned(reason) => reason.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentResult {
    pub assigned: bool,
    pub assignment_id: Option<Uuid>,
    pub officer_id: Option<Uuid>,
    pub reason: Option<UnassignedReason>,
}

impl From<&DispatchOutcome> for AssignmentResult {
    fn from(outcome: &DispatchOutcome) -> Self {
        match outcome {
            DispatchOutcome::Assigned(assignment) => Self {
                assigned: true,
                assignment_id: Some(assignment.id),
                officer_id: Some(assignment.officer_id),
                reason: None,
            },
            DispatchOutcome::Unassigned(reason) => Self {
                assigned: false,
                assignment_id: None,
                officer_id: None,
                reason: Some(*reason),
            },
        }
    }
}

pub struct Dispatcher {
    store: Arc<dyn DispatchStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    policy: DispatchPolicy,
    metrics: Metrics,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn DispatchStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        policy: DispatchPolicy,
        metrics: Metrics,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            policy,
            metrics,
        }
    }

    /// Matches a freshly submitted request to an officer. "No match" is a normal
    /// outcome; only storage failures are errors, and those leave no partial writes.
    pub fn dispatch(&self, request_id: Uuid) -> Result<DispatchOutcome, DispatchError> {
        let start = Instant::now();
        let result = self.run(request_id);
        let elapsed = start.elapsed().as_secs_f64();

        match &result {
            Ok(outcome) => self.metrics.record_dispatch(outcome.label(), elapsed),
            Err(err) => {
                self.metrics.record_dispatch("error", elapsed);
                error!(request_id = %request_id, error = %err, "dispatch failed");
            }
        }

        result
    }

    fn run(&self, request_id: Uuid) -> Result<DispatchOutcome, DispatchError> {
        let request = self
            .store
            .request(&request_id)?
            .ok_or(DispatchError::RequestNotFound(request_id))?;

        if request.status != RequestStatus::Submitted {
            warn!(
                request_id = %request.id,
                status = request.status.as_str(),
                "request already dispatched"
            );
            return Ok(DispatchOutcome::Unassigned(UnassignedReason::AlreadyDispatched));
        }

        let Some(location) = request.location else {
            return Ok(self.unassigned(&request, UnassignedReason::NoCoordinate, None));
        };

        let snapshot = self.store.snapshot()?;
        let now = self.clock.now();
        let target_date = self
            .policy
            .target_date(now)
            .ok_or(DispatchError::ScheduleOutOfRange(now))?;
        let weekday = IsoWeekday::of(target_date);

        let nearby = nearby_zones(Some(&location), snapshot.zones.values(), self.policy.radius_km);
        if nearby.is_empty() {
            return Ok(self.unassigned(&request, UnassignedReason::NoZoneInRadius, None));
        }

        let eligible = eligible_officers(&snapshot, &nearby, weekday);
        let Some((selection, officer)) = select_best(&snapshot, &eligible, &nearby, weekday)
            .and_then(|selection| {
                let officer = snapshot.officer(&selection.officer_id)?;
                Some((selection, officer))
            })
        else {
            let reason = UnassignedReason::NoEligibleOfficer;
            return Ok(self.unassigned(&request, reason, Some(&nearby)));
        };

        let context = MatchContext {
            snapshot: &snapshot,
            nearby: &nearby,
            weekday,
            now,
            scheduled_at: self.policy.pickup_at(target_date),
        };
        let assignment = AssignmentWriter::new(self.store.as_ref(), &self.policy).write(
            &request,
            officer,
            &selection,
            &context,
        )?;

        self.metrics
            .officer_assignments_total
            .with_label_values(&[&officer.id.to_string()])
            .inc();

        info!(
            request_id = %request.id,
            officer_id = %officer.id,
            assignment_id = %assignment.id,
            distance_km = assignment.distance_km,
            candidates = eligible.len(),
            weekday = weekday.number(),
            "request assigned"
        );

        self.announce_assignment(&request, &assignment, &officer.name);
        Ok(DispatchOutcome::Assigned(assignment))
    }

    fn unassigned(
        &self,
        request: &PickupRequest,
        reason: UnassignedReason,
        nearby: Option<&NearbyZones>,
    ) -> DispatchOutcome {
        info!(request_id = %request.id, reason = reason.as_str(), "request left unassigned");

        let message = format!(
            "Pickup request at {} could not be assigned automatically ({}).",
            request.address,
            reason.as_str()
        );
        if let Some(nearest) = nearby.and_then(NearbyZones::nearest) {
            self.notifier.notify(
                Audience::ZoneOfficers(nearest.zone_id),
                "Unassigned pickup request nearby",
                &message,
            );
        }
        self.notifier
            .notify(Audience::AllAdmins, "Manual assignment needed", &message);

        DispatchOutcome::Unassigned(reason)
    }

    fn announce_assignment(
        &self,
        request: &PickupRequest,
        assignment: &Assignment,
        officer_name: &str,
    ) {
        let when = assignment
            .scheduled_at
            .with_timezone(&self.policy.utc_offset)
            .format("%Y-%m-%d %H:%M");

        self.notifier.notify(
            Audience::Officer(assignment.officer_id),
            "New pickup assignment",
            &format!("Collect waste at {} on {when}.", request.address),
        );
        self.notifier.notify(
            Audience::AllAdmins,
            "Pickup request assigned",
            &format!(
                "Request at {} assigned to {officer_name} for {when} ({:.2} km).",
                request.address, assignment.distance_km
            ),
        );
        if let Some(requester_id) = request.requester_id {
            self.notifier.notify(
                Audience::User(requester_id),
                "Pickup scheduled",
                &format!("Your pickup at {} is scheduled for {when}.", request.address),
            );
        }
    }
}
