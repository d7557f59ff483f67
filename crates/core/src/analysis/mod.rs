//! Weather analyses
//!
//! - [`fronts`]: pressure centres and fronts on a spatial grid
//! - [`turbine`]: operational status of a turbine for one sample
//! - [`forecast`]: status timeline over an hourly forecast
//! - [`fleet`]: per-farm reports and fleet summary

pub mod fleet;
pub mod forecast;
pub mod fronts;
pub mod turbine;

pub use fleet::{
    assess_farm, assess_fleet, FarmFailure, FarmReport, FarmSnapshot, FleetSummary, WindFarm,
};
pub use forecast::{
    resolve_overall, scan_forecast, ForecastEvent, ForecastEventKind, ForecastScan, OverallStatus,
};
pub use fronts::{
    Front, FrontDetector, FrontKind, FrontMovement, GridAnalysis, PressureKind, PressureSystem,
};
pub use turbine::{OperationalStatus, Severity, TurbineAssessment, TurbineClassifier};
