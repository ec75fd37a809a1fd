use std::collections::BTreeMap;

use uuid::Uuid;

use crate::models::officer::Officer;
use crate::models::routine::RoutineRound;
use crate::models::weekday::IsoWeekday;
use crate::models::zone::Zone;

/// Read-only view of the reference data, fetched once per dispatch run.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSnapshot {
    pub zones: BTreeMap<Uuid, Zone>,
    pub officers: BTreeMap<Uuid, Officer>,
    rounds_by_officer: BTreeMap<Uuid, Vec<RoutineRound>>,
}

impl ReferenceSnapshot {
    pub fn new(
        zones: impl IntoIterator<Item = Zone>,
        officers: impl IntoIterator<Item = Officer>,
        rounds: impl IntoIterator<Item = RoutineRound>,
    ) -> Self {
        let mut rounds_by_officer: BTreeMap<Uuid, Vec<RoutineRound>> = BTreeMap::new();
        for round in rounds {
            rounds_by_officer
                .entry(round.officer_id)
                .or_default()
                .push(round);
        }
        for rounds in rounds_by_officer.values_mut() {
            rounds.sort_by_key(|round| round.id);
        }

        Self {
            zones: zones.into_iter().map(|zone| (zone.id, zone)).collect(),
            officers: officers
                .into_iter()
                .map(|officer| (officer.id, officer))
                .collect(),
            rounds_by_officer,
        }
    }

    pub fn officer(&self, id: &Uuid) -> Option<&Officer> {
        self.officers.get(id)
    }

    pub fn zone(&self, id: &Uuid) -> Option<&Zone> {
        self.zones.get(id)
    }

    /// Rounds the officer runs on `weekday`, ordered by round id.
    pub fn rounds_on<'a>(
        &'a self,
        officer_id: &Uuid,
        weekday: IsoWeekday,
    ) -> impl Iterator<Item = &'a RoutineRound> + 'a {
        self.rounds_by_officer
            .get(officer_id)
            .into_iter()
            .flatten()
            .filter(move |round| round.weekday == weekday)
    }
}
