//! Offshore Wind Farm Weather Analysis Core Library
//!
//! Turns gridded weather observations and hourly forecasts into operational
//! guidance for offshore wind farms.
//!
//! ## Analyses
//!
//! - Pressure centres (HIGH/LOW) and cold/warm fronts on a lat/lon grid
//! - Turbine operating status and capacity factor for a single sample
//! - Status timeline across a forecast, with upcoming risks escalating the
//!   reported status
//! - Parallel per-farm reports and a fleet summary
//!
//! Every analysis is a pure function of its inputs and an immutable
//! [`AnalysisConfig`]. Fetching data, rendering maps and storage belong to the
//! caller.

// Core types and utilities
pub mod core_types;

pub mod config;
pub mod error;
pub mod grid;

pub mod analysis;

// Re-export core types
pub use core_types::{Celsius, CompassPoint, Degrees, Hectopascals, MetersPerSecond, Percent};
pub use core_types::Vec2;
pub use core_types::{describe_wmo_code, WeatherCondition, WeatherSample};

pub use config::{AnalysisConfig, DetectorConfig, OutlookConfig, PowerCurve, TurbineThresholds};
pub use error::{AnalysisError, Result};
pub use grid::{GeoBounds, GridCoord, WeatherGrid};

// Re-export analyses
pub use analysis::{Front, FrontDetector, FrontKind, FrontMovement, GridAnalysis};
pub use analysis::{PressureKind, PressureSystem};
pub use analysis::{resolve_overall, scan_forecast, ForecastEvent, ForecastScan, OverallStatus};
pub use analysis::{OperationalStatus, TurbineAssessment, TurbineClassifier};
pub use analysis::{assess_farm, assess_fleet, FarmReport, FarmSnapshot, FleetSummary, WindFarm};
