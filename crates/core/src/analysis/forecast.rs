//! Forecast timeline and overall farm status
//!
//! An hourly forecast is classified hour by hour and collapsed into runs of
//! identical status. Each run becomes one [`ForecastEvent`]; a status that
//! ends and later comes back produces a second event.
//!
//! Hours that cannot be classified (missing wind or temperature) are skipped
//! and counted. A skipped hour never starts or ends a run, so a run spanning
//! it simply continues.

use crate::analysis::turbine::{OperationalStatus, TurbineAssessment, TurbineClassifier};
use crate::config::OutlookConfig;
use crate::core_types::WeatherSample;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::{debug, trace};

/// Whether an event opens the timeline or follows a change of status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastEventKind {
    /// First run of the forecast
    Initial,
    /// Status changed from the previous run
    Transition,
}

/// A run of consecutive forecast hours sharing one status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEvent {
    /// Status of the preceding run, `None` for the first event
    pub previous: Option<OperationalStatus>,
    /// Status during this run
    pub status: OperationalStatus,
    /// Hours from the start of the forecast to the first hour of the run
    pub onset_hour: u32,
    /// Length of the run in hours
    pub duration_hours: u32,
    /// The run lasts to the end of the forecast and may continue beyond it
    pub ongoing: bool,
    /// Valid time of the first hour of the run
    pub starts_at: DateTime<Utc>,
}

impl ForecastEvent {
    /// Initial or transition
    #[must_use]
    pub fn kind(&self) -> ForecastEventKind {
        if self.previous.is_some() {
            ForecastEventKind::Transition
        } else {
            ForecastEventKind::Initial
        }
    }
}

/// Result of scanning a forecast series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastScan {
    /// Runs, earliest onset first
    pub events: Vec<ForecastEvent>,
    /// Hours that failed validation and were left out
    pub skipped_samples: usize,
    /// Number of hours in the forecast
    pub horizon_hours: u32,
}

impl ForecastScan {
    /// True when at least one hour had to be skipped
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.skipped_samples > 0
    }
}

/// Classify each forecast hour and merge consecutive equal statuses.
///
/// `forecast` is hourly and in ascending time order; index 0 is "now + 0 h".
#[must_use]
pub fn scan_forecast(forecast: &[WeatherSample], classifier: &TurbineClassifier) -> ForecastScan {
    let horizon = forecast.len() as u32;
    let mut events: Vec<ForecastEvent> = Vec::new();
    let mut skipped = 0;

    for (hour, sample) in forecast.iter().enumerate() {
        let hour = hour as u32;
        let status = match classifier.classify(sample) {
            Ok(status) => status,
            Err(err) => {
                trace!("Skipping forecast hour {hour}: {err}");
                skipped += 1;
                continue;
            }
        };

        let previous = events.last().map(|e| e.status);
        if previous == Some(status) {
            continue;
        }
        if let Some(run) = events.last_mut() {
            run.duration_hours = hour - run.onset_hour;
        }
        events.push(ForecastEvent {
            previous,
            status,
            onset_hour: hour,
            duration_hours: 0,
            ongoing: false,
            starts_at: sample.timestamp,
        });
    }

    if let Some(run) = events.last_mut() {
        run.duration_hours = horizon - run.onset_hour;
        run.ongoing = true;
    }

    debug!(
        "Forecast scan: {} hours, {} events, {} skipped",
        horizon,
        events.len(),
        skipped
    );
    ForecastScan {
        events,
        skipped_samples: skipped,
        horizon_hours: horizon,
    }
}

/// Current conditions combined with the forecast outlook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStatus {
    /// Assessment of current conditions
    pub current: TurbineAssessment,
    /// Status to report: current, or an upcoming risk that outranks it
    pub priority_status: OperationalStatus,
    /// The forecast event that set `priority_status`, if any
    pub priority_event: Option<ForecastEvent>,
    /// Every forecast event, earliest first
    pub upcoming: Vec<ForecastEvent>,
}

impl OverallStatus {
    /// True when an upcoming risk overrides current conditions
    #[must_use]
    pub fn is_escalated(&self) -> bool {
        self.priority_event.is_some()
    }
}

/// Surface upcoming risk even when current conditions look benign.
///
/// `SHUTDOWN` and `ICING_RISK` events inside their horizons (the whole forecast
/// unless limited) are candidates; the highest-priority candidate, earliest on
/// ties, replaces the current status if it outranks it.
#[must_use]
pub fn resolve_overall(
    current: &TurbineAssessment,
    scan: &ForecastScan,
    outlook: &OutlookConfig,
) -> OverallStatus {
    let within = |event: &ForecastEvent, horizon: Option<u32>| match horizon {
        Some(hours) => event.onset_hour < hours,
        None => true,
    };

    let risk = scan
        .events
        .iter()
        .filter(|e| match e.status {
            OperationalStatus::Shutdown => within(e, outlook.shutdown_horizon_hours),
            OperationalStatus::IcingRisk => within(e, outlook.icing_horizon_hours),
            _ => false,
        })
        .min_by_key(|e| (Reverse(e.status.priority()), e.onset_hour))
        .filter(|e| e.status.priority() > current.status.priority());

    OverallStatus {
        current: current.clone(),
        priority_status: risk.map_or(current.status, |e| e.status),
        priority_event: risk.cloned(),
        upcoming: scan.events.clone(),
    }
}
