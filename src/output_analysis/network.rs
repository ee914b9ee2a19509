use serde::Serialize;

use crate::models::{Entity, Visit};
use crate::simulator::{RunOutput, StationOutput};

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (count, total) = values.fold((0usize, 0.0), |(count, total), value| {
        (count + 1, total + value)
    });
    if count == 0 {
        None
    } else {
        Some(total / count as f64)
    }
}

/// Derived statistics of one station over the measured interval.  Mean
/// times are over the visits of post-warm-up entities, and are empty when
/// no such visit reached the corresponding point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationMetrics {
    pub name: String,
    pub servers: usize,
    pub service_rate: f64,
    pub avg_queue_length: f64,
    pub avg_in_service: f64,
    pub avg_in_system: f64,
    pub utilization: f64,
    pub completed_count: usize,
    pub mean_waiting_time: Option<f64>,
    pub mean_service_time: Option<f64>,
    pub mean_response_time: Option<f64>,
}

/// Network-wide per-entity figures, `E[w]` and `E[R]`, over the exited
/// post-warm-up entities.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallMetrics {
    pub mean_total_wait: Option<f64>,
    pub mean_total_response: Option<f64>,
    pub entity_count: usize,
}

/// The scalar results of one replication.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub seed: u64,
    pub stations: Vec<StationMetrics>,
    pub overall: OverallMetrics,
}

impl RunSummary {
    pub fn from_output(output: &RunOutput) -> Self {
        Self {
            seed: output.seed,
            stations: output.station_metrics(),
            overall: output.overall_metrics(),
        }
    }

    pub fn station(&self, name: &str) -> Option<&StationMetrics> {
        self.stations.iter().find(|metrics| metrics.name == name)
    }
}

impl RunOutput {
    /// Entities that reached their first station at or after the end of the
    /// warm-up period.
    pub fn entities_after_warmup(&self) -> impl Iterator<Item = &Entity> + '_ {
        let warmup_duration = self.warmup_duration;
        self.entities.iter().filter(move |entity| {
            entity
                .first_arrival()
                .map_or(false, |arrival| arrival >= warmup_duration)
        })
    }

    pub fn station_by_name(&self, name: &str) -> Option<&StationOutput> {
        self.stations.iter().find(|station| station.name == name)
    }

    fn visits_at(&self, station: &StationOutput) -> Vec<&Visit> {
        let id = station.id;
        self.entities_after_warmup()
            .flat_map(|entity| entity.visits().iter())
            .filter(|visit| visit.station == id)
            .collect()
    }

    /// Time-weighted averages, utilization and mean visit times per station.
    pub fn station_metrics(&self) -> Vec<StationMetrics> {
        self.stations
            .iter()
            .map(|station| {
                let accumulator = &station.accumulator;
                let duration = accumulator.observed_duration();
                let visits = self.visits_at(station);
                StationMetrics {
                    name: station.name.clone(),
                    servers: station.servers,
                    service_rate: station.service_rate,
                    avg_queue_length: accumulator.avg_queue_length(duration),
                    avg_in_service: accumulator.avg_in_service(duration),
                    avg_in_system: accumulator.avg_in_system(duration),
                    utilization: accumulator.utilization(station.servers, duration),
                    completed_count: accumulator.completed_count(),
                    mean_waiting_time: mean(visits.iter().filter_map(|visit| visit.waiting_time())),
                    mean_service_time: mean(visits.iter().filter_map(|visit| visit.service_time())),
                    mean_response_time: mean(
                        visits.iter().filter_map(|visit| visit.response_time()),
                    ),
                }
            })
            .collect()
    }

    pub fn overall_metrics(&self) -> OverallMetrics {
        let exited: Vec<&Entity> = self
            .entities_after_warmup()
            .filter(|entity| entity.has_exited())
            .collect();
        OverallMetrics {
            mean_total_wait: mean(exited.iter().map(|entity| entity.total_waiting_time())),
            mean_total_response: mean(
                exited
                    .iter()
                    .filter_map(|entity| entity.total_response_time()),
            ),
            entity_count: exited.len(),
        }
    }
}
