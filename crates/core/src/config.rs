//! Analysis configuration
//!
//! All thresholds live in one immutable value that is passed into every
//! analysis call. Nothing here is process-wide or mutable at runtime.
//!
//! Every struct deserializes with `#[serde(default)]`, so a JSON file only
//! needs to name the values it overrides:
//!
//! ```
//! use windfarm_weather_core::AnalysisConfig;
//!
//! let config: AnalysisConfig =
//!     serde_json::from_str(r#"{ "detector": { "front_gradient_threshold": 2.0 } }"#).unwrap();
//! assert_eq!(config.detector.front_gradient_threshold, 2.0);
//! assert_eq!(config.detector.high_pressure_floor, 1015.0);
//! assert_eq!(config.turbine.cut_out, 25.0);
//! ```

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// Thresholds for pressure-system and front detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Minimum rows and columns (and populated cells per side) for a scan
    pub min_grid_size: usize,

    /// A HIGH must exceed this pressure (hPa)
    pub high_pressure_floor: f64,

    /// A LOW must be below this pressure (hPa)
    pub low_pressure_ceiling: f64,

    /// Temperature gradient (°C per degree of lat/lon) a pair must exceed to
    /// count as a front
    pub front_gradient_threshold: f64,

    /// Front speed as a fraction of the local wind speed.
    ///
    /// Empirical: fronts are taken to travel at roughly half the ambient
    /// wind. An approximation, not a physical law.
    pub front_velocity_factor: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_grid_size: 3,
            high_pressure_floor: 1015.0,
            low_pressure_ceiling: 1010.0,
            front_gradient_threshold: 1.5,
            front_velocity_factor: 0.5,
        }
    }
}

/// Operating envelope of an offshore wind turbine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurbineThresholds {
    /// Minimum wind for generation (m/s)
    pub cut_in: f64,
    /// Wind at which nameplate output is reached (m/s)
    pub rated: f64,
    /// Emergency shutdown wind (m/s)
    pub cut_out: f64,
    /// Icing possible at or below this temperature (°C)
    pub icing_temperature: f64,
    /// Icing possible at or above this relative humidity (%)
    pub icing_humidity: f64,
}

impl Default for TurbineThresholds {
    fn default() -> Self {
        Self {
            cut_in: 3.5,
            rated: 12.5,
            cut_out: 25.0,
            icing_temperature: 0.0,
            icing_humidity: 80.0,
        }
    }
}

/// Shape of the power curve between cut-in and rated speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerCurve {
    /// Output rises linearly from 0 at cut-in to 1 at rated
    #[default]
    Linear,
    /// Output follows the cube of the normalised speed (closer to the
    /// aerodynamic power law)
    Cubic,
}

impl PowerCurve {
    /// Map a normalised speed in `[0, 1]` to a capacity fraction
    #[must_use]
    pub fn apply(self, normalized: f64) -> f64 {
        let x = normalized.clamp(0.0, 1.0);
        match self {
            PowerCurve::Linear => x,
            PowerCurve::Cubic => x * x * x,
        }
    }
}

/// How far ahead forecast risks may escalate the overall status.
///
/// `None` means the whole forecast window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlookConfig {
    /// Only `SHUTDOWN` events starting within this many hours escalate
    pub shutdown_horizon_hours: Option<u32>,
    /// Only `ICING_RISK` events starting within this many hours escalate
    pub icing_horizon_hours: Option<u32>,
}

/// Complete configuration for one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Grid detector thresholds
    pub detector: DetectorConfig,
    /// Turbine operating envelope
    pub turbine: TurbineThresholds,
    /// Capacity factor interpolation
    pub power_curve: PowerCurve,
    /// Forecast escalation horizons
    pub outlook: OutlookConfig,
}

impl AnalysisConfig {
    /// Check that the thresholds are internally consistent.
    ///
    /// # Errors
    /// Returns [`AnalysisError::Configuration`] when a threshold is not finite,
    /// the turbine speeds are not strictly increasing, or the detector limits
    /// are out of range.
    pub fn validate(&self) -> Result<()> {
        let d = &self.detector;
        let t = &self.turbine;

        let values = [
            ("high_pressure_floor", d.high_pressure_floor),
            ("low_pressure_ceiling", d.low_pressure_ceiling),
            ("front_gradient_threshold", d.front_gradient_threshold),
            ("front_velocity_factor", d.front_velocity_factor),
            ("cut_in", t.cut_in),
            ("rated", t.rated),
            ("cut_out", t.cut_out),
            ("icing_temperature", t.icing_temperature),
            ("icing_humidity", t.icing_humidity),
        ];
        if let Some((name, value)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AnalysisError::configuration(format!(
                "{name} must be finite, got {value}"
            )));
        }

        if d.min_grid_size < 3 {
            return Err(AnalysisError::configuration(format!(
                "min_grid_size must be at least 3, got {}",
                d.min_grid_size
            )));
        }
        if d.front_gradient_threshold <= 0.0 {
            return Err(AnalysisError::configuration(
                "front_gradient_threshold must be positive",
            ));
        }
        if d.front_velocity_factor < 0.0 {
            return Err(AnalysisError::configuration(
                "front_velocity_factor must not be negative",
            ));
        }
        if !((0.0..t.rated).contains(&t.cut_in) && t.rated < t.cut_out) {
            return Err(AnalysisError::configuration(format!(
                "turbine speeds must satisfy 0 <= cut_in < rated < cut_out, got {} / {} / {}",
                t.cut_in, t.rated, t.cut_out
            )));
        }
        Ok(())
    }
}
