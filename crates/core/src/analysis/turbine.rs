//! Turbine operational status from point weather
//!
//! Status is decided by a fixed priority order because the conditions overlap
//! (a freezing, humid, calm hour is both idle and at risk of icing). Physical
//! risk always outranks efficiency:
//!
//! | Order | Condition                                   | Status        |
//! |-------|---------------------------------------------|---------------|
//! | 1     | speed ≥ cut-out (25 m/s)                    | `Shutdown`    |
//! | 2     | temp ≤ 0 °C and humidity ≥ 80 %             | `IcingRisk`   |
//! | 3     | speed < cut-in (3.5 m/s)                    | `Idle`        |
//! | 4     | rated (12.5 m/s) ≤ speed < cut-out          | `Normal`      |
//! | 5     | otherwise                                   | `SubOptimal`  |

use crate::config::{AnalysisConfig, PowerCurve, TurbineThresholds};
use crate::core_types::{Celsius, MetersPerSecond, Percent, WeatherSample};
use crate::error::{AnalysisError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating state of a turbine (or a whole farm) for one hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationalStatus {
    /// At or above rated speed, full output
    Normal,
    /// Between cut-in and rated, partial output
    SubOptimal,
    /// Below cut-in, spinning but not generating
    Idle,
    /// Freezing and humid, blades may ice up
    IcingRisk,
    /// Above cut-out, emergency stop
    Shutdown,
}

/// How urgently a status needs attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Nothing to report
    None,
    /// Reduced output
    Low,
    /// Operational risk
    Medium,
    /// Turbines offline
    Critical,
}

impl OperationalStatus {
    /// Conflict-resolution rank, highest wins:
    /// Shutdown > `IcingRisk` > Idle > `SubOptimal` > Normal
    #[must_use]
    pub fn priority(self) -> u8 {
        match self {
            OperationalStatus::Normal => 0,
            OperationalStatus::SubOptimal => 1,
            OperationalStatus::Idle => 2,
            OperationalStatus::IcingRisk => 3,
            OperationalStatus::Shutdown => 4,
        }
    }

    /// Severity band
    #[must_use]
    pub fn severity(self) -> Severity {
        match self {
            OperationalStatus::Normal => Severity::None,
            OperationalStatus::SubOptimal | OperationalStatus::Idle => Severity::Low,
            OperationalStatus::IcingRisk => Severity::Medium,
            OperationalStatus::Shutdown => Severity::Critical,
        }
    }

    /// Marker colour on the impact map
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            OperationalStatus::Normal => "green",
            OperationalStatus::SubOptimal | OperationalStatus::Idle => "yellow",
            OperationalStatus::IcingRisk => "orange",
            OperationalStatus::Shutdown => "red",
        }
    }

    /// True for the statuses that escalate a farm's overall status
    #[must_use]
    pub fn is_risk(self) -> bool {
        matches!(
            self,
            OperationalStatus::IcingRisk | OperationalStatus::Shutdown
        )
    }
}

impl fmt::Display for OperationalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OperationalStatus::Normal => "NORMAL",
            OperationalStatus::SubOptimal => "SUB_OPTIMAL",
            OperationalStatus::Idle => "IDLE",
            OperationalStatus::IcingRisk => "ICING_RISK",
            OperationalStatus::Shutdown => "SHUTDOWN",
        };
        f.write_str(label)
    }
}

/// Status, output and the readings behind them for one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurbineAssessment {
    /// Valid time of the sample
    pub timestamp: DateTime<Utc>,
    /// Classified status
    pub status: OperationalStatus,
    /// Fraction of rated output, 0-1
    pub capacity_factor: f64,
    /// Mean wind speed
    pub wind_speed: MetersPerSecond,
    /// Gust speed, if reported
    pub wind_gust: Option<MetersPerSecond>,
    /// Air temperature
    pub temperature: Celsius,
    /// Relative humidity, if reported
    pub humidity: Option<Percent>,
}

impl TurbineAssessment {
    /// One-line explanation of the status
    #[must_use]
    pub fn description(&self) -> String {
        let speed = self.wind_speed;
        match self.status {
            OperationalStatus::Shutdown => match self.wind_gust {
                Some(gust) => format!(
                    "High winds: {speed:.1} (gusts {gust:.1}) - Emergency shutdown"
                ),
                None => format!("High winds: {speed:.1} - Emergency shutdown"),
            },
            OperationalStatus::IcingRisk => {
                let humidity = self
                    .humidity
                    .map_or_else(|| "unknown".to_owned(), |h| format!("{h:.0}"));
                format!(
                    "Icing risk: {:.1} @ {humidity} humidity",
                    self.temperature
                )
            }
            OperationalStatus::Idle => format!("Low wind: {speed:.1} - No generation"),
            OperationalStatus::SubOptimal => format!(
                "Below rated speed: {speed:.1} - {:.0}% capacity",
                self.capacity_factor * 100.0
            ),
            OperationalStatus::Normal => format!("Rated output: {speed:.1}"),
        }
    }
}

/// Classifies samples against a turbine's operating envelope
#[derive(Debug, Clone, Copy, Default)]
pub struct TurbineClassifier {
    thresholds: TurbineThresholds,
    power_curve: PowerCurve,
}

impl TurbineClassifier {
    /// Create a classifier
    #[must_use]
    pub fn new(thresholds: TurbineThresholds, power_curve: PowerCurve) -> Self {
        Self {
            thresholds,
            power_curve,
        }
    }

    /// Classifier using the turbine section of an analysis config
    #[must_use]
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.turbine, config.power_curve)
    }

    /// Operational status for one sample.
    ///
    /// Missing humidity means icing cannot be determined and is treated as no
    /// icing.
    ///
    /// # Errors
    /// [`AnalysisError::Validation`] if wind speed or temperature is missing
    /// or not finite.
    pub fn classify(&self, sample: &WeatherSample) -> Result<OperationalStatus> {
        let speed = required(sample.wind_speed.map(f64::from), "wind_speed")?;
        let temperature = required(sample.temperature.map(f64::from), "temperature")?;
        let humidity = sample
            .humidity
            .map(f64::from)
            .filter(|h| h.is_finite());
        Ok(self.status_for(speed, temperature, humidity))
    }

    /// Fraction of rated output for a wind speed in a given status.
    ///
    /// Zero whenever the turbine is stopped (shutdown, icing, idle); otherwise
    /// the power curve between cut-in and rated, 1.0 at or above rated.
    #[must_use]
    pub fn capacity_factor(&self, wind_speed: f64, status: OperationalStatus) -> f64 {
        let t = &self.thresholds;
        match status {
            OperationalStatus::Shutdown
            | OperationalStatus::IcingRisk
            | OperationalStatus::Idle => 0.0,
            OperationalStatus::Normal | OperationalStatus::SubOptimal => {
                if wind_speed >= t.rated {
                    1.0
                } else {
                    self.power_curve
                        .apply((wind_speed - t.cut_in) / (t.rated - t.cut_in))
                }
            }
        }
    }

    /// Full assessment of a sample: status, capacity factor and readings.
    ///
    /// # Errors
    /// Same as [`TurbineClassifier::classify`].
    pub fn assess(&self, sample: &WeatherSample) -> Result<TurbineAssessment> {
        let status = self.classify(sample)?;
        // classify() has already checked both are present and finite
        let wind_speed = sample.wind_speed.unwrap_or_default();
        let temperature = sample.temperature.unwrap_or_default();

        Ok(TurbineAssessment {
            timestamp: sample.timestamp,
            status,
            capacity_factor: self.capacity_factor(*wind_speed, status),
            wind_speed,
            wind_gust: sample.wind_gust.filter(|g| g.is_finite()),
            temperature,
            humidity: sample.humidity.filter(|h| h.is_finite()),
        })
    }

    fn status_for(&self, speed: f64, temperature: f64, humidity: Option<f64>) -> OperationalStatus {
        let t = &self.thresholds;
        let icing = temperature <= t.icing_temperature
            && humidity.is_some_and(|h| h >= t.icing_humidity);

        if speed >= t.cut_out {
            OperationalStatus::Shutdown
        } else if icing {
            OperationalStatus::IcingRisk
        } else if speed < t.cut_in {
            OperationalStatus::Idle
        } else if speed >= t.rated {
            OperationalStatus::Normal
        } else {
            OperationalStatus::SubOptimal
        }
    }
}

fn required(value: Option<f64>, field: &'static str) -> Result<f64> {
    match value {
        None => Err(AnalysisError::missing(field)),
        Some(v) if !v.is_finite() => Err(AnalysisError::not_finite(field, v)),
        Some(v) => Ok(v),
    }
}
