//! Per-farm reports and fleet-wide summary
//!
//! Each farm is independent: its current sample and forecast go through the
//! turbine classifier and forecast scan, and the results are combined into an
//! [`OverallStatus`]. Fleets are assessed in parallel since nothing is shared
//! between farms.

use crate::analysis::forecast::{resolve_overall, scan_forecast, OverallStatus};
use crate::analysis::turbine::{OperationalStatus, TurbineClassifier};
use crate::config::AnalysisConfig;
use crate::core_types::WeatherSample;
use crate::error::Result;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Upcoming events listed in a text report
const REPORT_EVENTS: usize = 3;

/// An offshore wind farm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindFarm {
    /// Display name
    pub name: String,
    /// Nameplate capacity (MW)
    pub capacity_mw: f64,
    /// Site latitude
    pub latitude: f64,
    /// Site longitude
    pub longitude: f64,
}

/// Weather for one farm: current conditions plus an hourly forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmSnapshot {
    /// The farm
    pub farm: WindFarm,
    /// Conditions now
    pub current: WeatherSample,
    /// Hourly forecast starting at now + 0 h
    #[serde(default)]
    pub forecast: Vec<WeatherSample>,
}

/// Outcome of assessing one farm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmReport {
    /// The farm
    pub farm: WindFarm,
    /// Current and forecast status
    pub overall: OverallStatus,
    /// Forecast hours that could not be classified
    pub forecast_skipped: usize,
    /// Capacity times current capacity factor (MW)
    pub estimated_output_mw: f64,
}

impl fmt::Display for FarmReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = &self.overall.current;
        writeln!(f, "{} ({:.0} MW)", self.farm.name, self.farm.capacity_mw)?;
        writeln!(
            f,
            "  Status: {} [{}]",
            self.overall.priority_status,
            self.overall.priority_status.color()
        )?;
        writeln!(
            f,
            "  Capacity: {:.0}% (~{:.0} MW)",
            current.capacity_factor * 100.0,
            self.estimated_output_mw
        )?;
        writeln!(f, "  Current: {}", current.description())?;

        if let Some(event) = &self.overall.priority_event {
            writeln!(
                f,
                "  Priority issue: {} in {}h for {}h{}",
                event.status,
                event.onset_hour,
                event.duration_hours,
                if event.ongoing { "+" } else { "" }
            )?;
        }

        if !self.overall.upcoming.is_empty() {
            writeln!(f, "  Upcoming:")?;
            for event in self.overall.upcoming.iter().take(REPORT_EVENTS) {
                writeln!(
                    f,
                    "    +{}h {} for {}h",
                    event.onset_hour, event.status, event.duration_hours
                )?;
            }
        }
        if self.forecast_skipped > 0 {
            writeln!(f, "  ({} forecast hours skipped)", self.forecast_skipped)?;
        }
        Ok(())
    }
}

/// Assess one farm.
///
/// # Errors
/// [`crate::AnalysisError::Validation`] if the current sample lacks wind speed
/// or temperature. Invalid forecast hours are skipped, not reported as errors.
pub fn assess_farm(snapshot: &FarmSnapshot, config: &AnalysisConfig) -> Result<FarmReport> {
    let classifier = TurbineClassifier::from_config(config);
    let current = classifier.assess(&snapshot.current)?;
    let scan = scan_forecast(&snapshot.forecast, &classifier);
    let overall = resolve_overall(&current, &scan, &config.outlook);

    if scan.is_degraded() {
        warn!(
            "{}: {} of {} forecast hours could not be classified",
            snapshot.farm.name, scan.skipped_samples, scan.horizon_hours
        );
    }
    if overall.is_escalated() {
        debug!(
            "{}: {} escalated to {}",
            snapshot.farm.name, current.status, overall.priority_status
        );
    }

    Ok(FarmReport {
        estimated_output_mw: snapshot.farm.capacity_mw * current.capacity_factor,
        farm: snapshot.farm.clone(),
        forecast_skipped: scan.skipped_samples,
        overall,
    })
}

/// A farm that could not be assessed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmFailure {
    /// Farm name
    pub name: String,
    /// Error message
    pub reason: String,
}

/// Fleet-wide results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FleetSummary {
    /// Reports in input order
    pub reports: Vec<FarmReport>,
    /// Farms whose current sample failed validation
    pub failures: Vec<FarmFailure>,
    /// Number of farms per reported (priority) status
    pub status_counts: FxHashMap<OperationalStatus, usize>,
    /// Nameplate capacity of the assessed farms (MW)
    pub total_capacity_mw: f64,
    /// Sum of estimated outputs (MW)
    pub estimated_output_mw: f64,
    /// Farms whose status was raised by a forecast risk
    pub escalated_farms: usize,
}

impl FleetSummary {
    /// Farms reporting `status`
    #[must_use]
    pub fn count(&self, status: OperationalStatus) -> usize {
        self.status_counts.get(&status).copied().unwrap_or(0)
    }

    /// Estimated output as a fraction of assessed capacity
    #[must_use]
    pub fn fleet_capacity_factor(&self) -> f64 {
        if self.total_capacity_mw > 0.0 {
            self.estimated_output_mw / self.total_capacity_mw
        } else {
            0.0
        }
    }
}

/// Assess every farm in parallel.
///
/// Farms that fail are listed in [`FleetSummary::failures`]; the rest of the
/// fleet is still reported.
#[must_use]
pub fn assess_fleet(snapshots: &[FarmSnapshot], config: &AnalysisConfig) -> FleetSummary {
    let results: Vec<_> = snapshots
        .par_iter()
        .map(|snapshot| (snapshot, assess_farm(snapshot, config)))
        .collect();

    let mut summary = FleetSummary::default();
    for (snapshot, result) in results {
        match result {
            Ok(report) => {
                *summary
                    .status_counts
                    .entry(report.overall.priority_status)
                    .or_insert(0) += 1;
                summary.total_capacity_mw += report.farm.capacity_mw;
                summary.estimated_output_mw += report.estimated_output_mw;
                if report.overall.is_escalated() {
                    summary.escalated_farms += 1;
                }
                summary.reports.push(report);
            }
            Err(err) => {
                warn!("Skipping farm {}: {}", snapshot.farm.name, err);
                summary.failures.push(FarmFailure {
                    name: snapshot.farm.name.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    info!(
        "Assessed {} farms ({} failed): {:.0} of {:.0} MW",
        summary.reports.len(),
        summary.failures.len(),
        summary.estimated_output_mw,
        summary.total_capacity_mw
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn farm(name: &str, capacity_mw: f64) -> WindFarm {
        WindFarm {
            name: name.to_owned(),
            capacity_mw,
            latitude: 53.9,
            longitude: 1.8,
        }
    }

    fn sample(hour: i64, speed: f64, temp: f64) -> WeatherSample {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 15, 6, 0, 0).unwrap();
        WeatherSample::at(53.9, 1.8, t0 + Duration::hours(hour))
            .with_wind(speed, 240.0)
            .with_temperature(temp)
            .with_humidity(70.0)
    }

    fn snapshot(name: &str, capacity: f64, speeds: &[f64]) -> FarmSnapshot {
        FarmSnapshot {
            farm: farm(name, capacity),
            current: sample(0, speeds[0], 6.0),
            forecast: speeds
                .iter()
                .enumerate()
                .map(|(h, &s)| sample(h as i64, s, 6.0))
                .collect(),
        }
    }

    #[test]
    fn test_assess_farm_output() {
        let report =
            assess_farm(&snapshot("Hornsea", 1200.0, &[8.0; 6]), &AnalysisConfig::default())
                .unwrap();
        assert_eq!(report.overall.priority_status, OperationalStatus::SubOptimal);
        assert_relative_eq!(report.estimated_output_mw, 600.0, epsilon = 1e-9);
        assert_eq!(report.forecast_skipped, 0);

        let text = report.to_string();
        assert!(text.starts_with("Hornsea (1200 MW)"));
        assert!(text.contains("Capacity: 50% (~600 MW)"));
        assert!(text.contains("+0h SUB_OPTIMAL for 6h"));
        assert!(!text.contains("Priority issue"));
    }

    #[test]
    fn test_report_mentions_priority_issue() {
        let report = assess_farm(
            &snapshot("Dogger", 1000.0, &[14.0, 14.0, 27.0, 27.0]),
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!(report.overall.priority_status, OperationalStatus::Shutdown);
        assert!(report.to_string().contains("Priority issue: SHUTDOWN in 2h for 2h+"));
        // Output reflects current conditions, not the escalated status
        assert_relative_eq!(report.estimated_output_mw, 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fleet_summary() {
        let mut broken = snapshot("Broken", 500.0, &[10.0; 3]);
        broken.current.wind_speed = None;

        let snapshots = vec![
            snapshot("A", 1000.0, &[15.0; 4]),
            snapshot("B", 400.0, &[2.0; 4]),
            broken,
            snapshot("C", 600.0, &[15.0, 30.0, 30.0]),
        ];
        let summary = assess_fleet(&snapshots, &AnalysisConfig::default());

        assert_eq!(summary.reports.len(), 3);
        assert_eq!(summary.reports[0].farm.name, "A");
        assert_eq!(summary.reports[2].farm.name, "C");
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].name, "Broken");
        assert!(summary.failures[0].reason.contains("wind_speed"));

        assert_eq!(summary.count(OperationalStatus::Normal), 1);
        assert_eq!(summary.count(OperationalStatus::Idle), 1);
        assert_eq!(summary.count(OperationalStatus::Shutdown), 1);
        assert_eq!(summary.count(OperationalStatus::IcingRisk), 0);
        assert_eq!(summary.escalated_farms, 1);
        assert_relative_eq!(summary.total_capacity_mw, 2000.0);
        assert_relative_eq!(summary.estimated_output_mw, 1600.0, epsilon = 1e-9);
        assert_relative_eq!(summary.fleet_capacity_factor(), 0.8, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_fleet() {
        let summary = assess_fleet(&[], &AnalysisConfig::default());
        assert!(summary.reports.is_empty());
        assert_eq!(summary.fleet_capacity_factor(), 0.0);
    }
}
