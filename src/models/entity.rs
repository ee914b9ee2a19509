use serde::{Deserialize, Serialize};

use super::StationId;

/// Entities are numbered in creation order, starting at zero.
pub type EntityId = usize;

/// The timestamps of a single station visit.  Service start and end are
/// recorded once the entity reaches those points, so a visit cut off by the
/// horizon leaves them empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub station: StationId,
    pub arrival: f64,
    pub service_start: Option<f64>,
    pub service_end: Option<f64>,
}

impl Visit {
    /// Time spent in the wait line.
    pub fn waiting_time(&self) -> Option<f64> {
        self.service_start.map(|start| start - self.arrival)
    }

    pub fn service_time(&self) -> Option<f64> {
        match (self.service_start, self.service_end) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    pub fn response_time(&self) -> Option<f64> {
        self.service_end.map(|end| end - self.arrival)
    }
}

/// The timestamp ledger of one flow unit (e.g. a patient).  Visits are kept
/// in the order they happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    id: EntityId,
    created_at: f64,
    visits: Vec<Visit>,
    exited_at: Option<f64>,
}

impl Entity {
    pub fn new(id: EntityId, created_at: f64) -> Self {
        Self {
            id,
            created_at,
            visits: Vec::new(),
            exited_at: None,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn created_at(&self) -> f64 {
        self.created_at
    }

    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    pub fn exited_at(&self) -> Option<f64> {
        self.exited_at
    }

    pub fn has_exited(&self) -> bool {
        self.exited_at.is_some()
    }

    /// The first visit to `station`, if any.
    pub fn visit(&self, station: StationId) -> Option<&Visit> {
        self.visits.iter().find(|visit| visit.station == station)
    }

    pub fn first_arrival(&self) -> Option<f64> {
        self.visits.first().map(|visit| visit.arrival)
    }

    /// Summed wait-line time over all visits that reached service.
    pub fn total_waiting_time(&self) -> f64 {
        self.visits.iter().filter_map(Visit::waiting_time).sum()
    }

    /// Time from creation to network exit.
    pub fn total_response_time(&self) -> Option<f64> {
        self.exited_at.map(|exit| exit - self.created_at)
    }

    pub(crate) fn record_arrival(&mut self, station: StationId, time: f64) {
        self.visits.push(Visit {
            station,
            arrival: time,
            service_start: None,
            service_end: None,
        });
    }

    pub(crate) fn record_service_start(&mut self, time: f64) {
        if let Some(visit) = self.visits.last_mut() {
            visit.service_start = Some(time);
        }
    }

    pub(crate) fn record_service_end(&mut self, time: f64) {
        if let Some(visit) = self.visits.last_mut() {
            visit.service_end = Some(time);
        }
    }

    pub(crate) fn record_exit(&mut self, time: f64) {
        self.exited_at = Some(time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_tracks_visits_in_order() {
        let mut entity = Entity::new(4, 1.0);
        entity.record_arrival(0, 1.0);
        entity.record_service_start(1.5);
        entity.record_service_end(2.0);
        entity.record_arrival(2, 2.0);
        entity.record_service_start(2.0);
        entity.record_service_end(3.25);
        entity.record_exit(3.25);

        assert_eq!(entity.visits().len(), 2);
        assert_eq!(entity.first_arrival(), Some(1.0));
        assert_eq!(entity.visit(2).and_then(Visit::service_time), Some(1.25));
        assert_eq!(entity.visit(1), None);
        assert_eq!(entity.total_waiting_time(), 0.5);
        assert_eq!(entity.total_response_time(), Some(2.25));
    }

    #[test]
    fn unfinished_visit_has_no_service_times() {
        let mut entity = Entity::new(0, 0.0);
        entity.record_arrival(0, 0.0);
        let visit = &entity.visits()[0];
        assert_eq!(visit.waiting_time(), None);
        assert_eq!(visit.response_time(), None);
        assert!(!entity.has_exited());
        assert_eq!(entity.total_response_time(), None);
    }
}
