//! Pressure-system and weather-front detection on a coarse weather grid
//!
//! Works on the handful of grid points a forecast API can be asked for in one
//! run (typically 5×5 or 6×6 over the UK), so every scan is a direct pass over
//! the cells.
//!
//! # Pressure systems
//!
//! An interior cell whose 8 neighbours all carry a pressure is a
//! - **HIGH** when it is strictly above every neighbour and above the high
//!   floor (1015 hPa by default)
//! - **LOW** when it is strictly below every neighbour and below the low
//!   ceiling (1010 hPa by default)
//!
//! Ties disqualify, so a pressure plateau never produces a system. Cells on
//! the outer ring or next to missing data cannot be extrema.
//!
//! # Fronts
//!
//! Each horizontally or vertically adjacent pair is tested once:
//!
//! ```text
//! gradient = |T₂ - T₁| / √(Δlat² + Δlon²)     (°C per degree)
//! ```
//!
//! A pair above the threshold (1.5 °C/degree) is a front. Looking along the
//! local wind (mean of the pair's wind vectors), falling temperature means
//! cold air is advancing (**COLD**), rising temperature means warm air is
//! advancing (**WARM**). Fronts are assumed to travel at half the local wind
//! speed; this is an empirical rule of thumb.

use crate::config::DetectorConfig;
use crate::core_types::{Degrees, Hectopascals, MetersPerSecond, Vec2, WeatherSample};
use crate::error::Result;
use crate::grid::{GridCoord, WeatherGrid};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum |cos θ| between wind and pair axis for the wind to decide the
/// front type
const ALIGNMENT_EPSILON: f64 = 1e-6;

/// High or low pressure centre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureKind {
    /// Local pressure maximum
    High,
    /// Local pressure minimum
    Low,
}

impl PressureKind {
    /// Map letter ("H" or "L")
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            PressureKind::High => "H",
            PressureKind::Low => "L",
        }
    }
}

/// Detected pressure centre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureSystem {
    /// HIGH or LOW
    pub kind: PressureKind,
    /// Grid cell of the extremum
    pub coord: GridCoord,
    /// Latitude of that cell
    pub latitude: f64,
    /// Longitude of that cell
    pub longitude: f64,
    /// Pressure at the centre
    pub pressure: Hectopascals,
}

/// Cold or warm front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrontKind {
    /// Colder air advancing
    Cold,
    /// Warmer air advancing
    Warm,
}

impl FrontKind {
    /// Map glyph (▼ cold, ▲ warm)
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            FrontKind::Cold => "▼",
            FrontKind::Warm => "▲",
        }
    }
}

/// Detected front segment between two adjacent cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Front {
    /// COLD or WARM
    pub kind: FrontKind,
    /// Midpoint latitude
    pub latitude: f64,
    /// Midpoint longitude
    pub longitude: f64,
    /// The two cells whose gradient triggered detection (scan order)
    pub cells: [GridCoord; 2],
    /// Gradient magnitude (°C per degree)
    pub gradient: f64,
    /// Temperature of the second cell minus the first (°C)
    pub temperature_change: f64,
    /// Estimated speed of travel
    pub velocity: MetersPerSecond,
}

/// Grid-wide estimate of how the fronts are moving
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrontMovement {
    /// Mean wind speed over every cell reporting one
    pub mean_wind_speed: MetersPerSecond,
    /// Mean wind speed scaled by the front velocity factor
    pub velocity: MetersPerSecond,
    /// Vector-mean wind direction (blowing from), `None` if the winds cancel
    /// out or no cell reports a direction
    pub direction: Option<Degrees>,
    /// Mean 3-hour pressure change (hPa), `None` if no cell reports one
    pub pressure_trend: Option<f64>,
}

/// Everything the detector finds in one grid snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridAnalysis {
    /// Highs and lows in row-major order
    pub pressure_systems: Vec<PressureSystem>,
    /// Fronts in pair scan order
    pub fronts: Vec<Front>,
    /// Overall movement, `None` when no cell reports wind
    pub movement: Option<FrontMovement>,
}

/// Stateless detector for pressure systems and fronts
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontDetector {
    config: DetectorConfig,
}

impl FrontDetector {
    /// Create a detector with custom thresholds
    #[must_use]
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Thresholds in use
    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Run both detectors and estimate front movement.
    ///
    /// # Errors
    /// [`AnalysisError::Configuration`](crate::AnalysisError::Configuration)
    /// when the grid is smaller than `min_grid_size` in either dimension or
    /// holds fewer than `min_grid_size²` samples.
    pub fn detect(&self, grid: &WeatherGrid) -> Result<GridAnalysis> {
        Ok(GridAnalysis {
            pressure_systems: self.detect_pressure_systems(grid)?,
            fronts: self.detect_fronts(grid)?,
            movement: self.estimate_movement(grid),
        })
    }

    /// Find local pressure maxima and minima.
    ///
    /// # Errors
    /// [`AnalysisError::Configuration`](crate::AnalysisError::Configuration)
    /// when the grid is too small.
    pub fn detect_pressure_systems(&self, grid: &WeatherGrid) -> Result<Vec<PressureSystem>> {
        grid.ensure_min_size(self.config.min_grid_size)?;

        let systems: Vec<PressureSystem> = grid
            .iter_cells()
            .filter(|(coord, _)| grid.is_interior(*coord))
            .filter_map(|(coord, sample)| self.classify_extremum(grid, coord, sample))
            .collect();

        debug!(
            "Detected {} pressure systems in {}x{} grid",
            systems.len(),
            grid.rows(),
            grid.cols()
        );
        Ok(systems)
    }

    /// Find sharp temperature gradients between adjacent cells.
    ///
    /// # Errors
    /// [`AnalysisError::Configuration`](crate::AnalysisError::Configuration)
    /// when the grid is too small.
    pub fn detect_fronts(&self, grid: &WeatherGrid) -> Result<Vec<Front>> {
        grid.ensure_min_size(self.config.min_grid_size)?;

        let fronts: Vec<Front> = grid
            .adjacent_pairs()
            .filter_map(|(first, second)| self.classify_front(first, second))
            .collect();

        debug!("Detected {} fronts", fronts.len());
        Ok(fronts)
    }

    /// Mean wind speed and direction over the grid, scaled to a front speed.
    ///
    /// Missing cells and cells without wind are ignored. The direction is the
    /// circular mean of the wind vectors, so 350° and 10° average to north.
    #[must_use]
    pub fn estimate_movement(&self, grid: &WeatherGrid) -> Option<FrontMovement> {
        let speeds: Vec<f64> = grid
            .iter_cells()
            .filter_map(|(_, s)| finite(s.wind_speed.map(f64::from)))
            .collect();
        if speeds.is_empty() {
            return None;
        }
        let mean_speed = speeds.iter().sum::<f64>() / speeds.len() as f64;

        // Sum of unit vectors along the "from" bearing
        let resultant = grid
            .iter_cells()
            .filter_map(|(_, s)| finite(s.wind_direction.map(f64::from)))
            .fold(Vec2::zeros(), |acc, deg| {
                let rad = deg.to_radians();
                acc + Vec2::new(rad.sin(), rad.cos())
            });
        let direction = (resultant.norm() > ALIGNMENT_EPSILON)
            .then(|| Degrees::new(resultant.x.atan2(resultant.y).to_degrees()).normalized());

        let trends: Vec<f64> = grid
            .iter_cells()
            .filter_map(|(_, s)| finite(s.pressure_trend))
            .collect();
        let pressure_trend =
            (!trends.is_empty()).then(|| trends.iter().sum::<f64>() / trends.len() as f64);

        Some(FrontMovement {
            mean_wind_speed: MetersPerSecond::new(mean_speed),
            velocity: MetersPerSecond::new(mean_speed * self.config.front_velocity_factor),
            direction,
            pressure_trend,
        })
    }

    fn classify_extremum(
        &self,
        grid: &WeatherGrid,
        coord: GridCoord,
        sample: &WeatherSample,
    ) -> Option<PressureSystem> {
        let centre = pressure_of(sample)?;

        // Any missing neighbour (or neighbour without pressure) disqualifies
        let neighbours = grid
            .neighbors8(coord)
            .map(|(_, n)| n.and_then(pressure_of))
            .collect::<Option<Vec<f64>>>()?;
        if neighbours.len() != 8 {
            return None;
        }

        let kind = if neighbours.iter().all(|&p| centre > p)
            && centre > self.config.high_pressure_floor
        {
            PressureKind::High
        } else if neighbours.iter().all(|&p| centre < p)
            && centre < self.config.low_pressure_ceiling
        {
            PressureKind::Low
        } else {
            return None;
        };

        Some(PressureSystem {
            kind,
            coord,
            latitude: sample.latitude,
            longitude: sample.longitude,
            pressure: Hectopascals::new(centre),
        })
    }

    fn classify_front(
        &self,
        (first_coord, first): (GridCoord, &WeatherSample),
        (second_coord, second): (GridCoord, &WeatherSample),
    ) -> Option<Front> {
        let t1 = finite(first.temperature.map(f64::from))?;
        let t2 = finite(second.temperature.map(f64::from))?;
        let change = t2 - t1;
        if change == 0.0 {
            return None;
        }

        // Pair axis as (Δlon, Δlat) in degrees, first → second
        let axis = Vec2::new(
            second.longitude - first.longitude,
            second.latitude - first.latitude,
        );
        let distance = axis.norm();
        if !distance.is_finite() || distance <= 0.0 {
            return None;
        }

        let gradient = change.abs() / distance;
        if gradient <= self.config.front_gradient_threshold {
            return None;
        }

        let change_downwind = match local_wind(first, second) {
            Some(wind) if wind.norm() > 0.0 => {
                let alignment = wind.dot(&axis) / (wind.norm() * distance);
                if alignment.abs() > ALIGNMENT_EPSILON {
                    change * alignment.signum()
                } else {
                    change
                }
            }
            // Calm or unknown wind: fall back to scan order
            _ => change,
        };
        let kind = if change_downwind < 0.0 {
            FrontKind::Cold
        } else {
            FrontKind::Warm
        };

        let speeds: Vec<f64> = [first, second]
            .iter()
            .filter_map(|s| finite(s.wind_speed.map(f64::from)))
            .collect();
        let mean_speed = if speeds.is_empty() {
            0.0
        } else {
            speeds.iter().sum::<f64>() / speeds.len() as f64
        };

        Some(Front {
            kind,
            latitude: f64::midpoint(first.latitude, second.latitude),
            longitude: f64::midpoint(first.longitude, second.longitude),
            cells: [first_coord, second_coord],
            gradient,
            temperature_change: change,
            velocity: MetersPerSecond::new(mean_speed * self.config.front_velocity_factor),
        })
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn pressure_of(sample: &WeatherSample) -> Option<f64> {
    finite(sample.pressure.map(f64::from))
}

/// Mean wind vector of the two cells that report one
fn local_wind(first: &WeatherSample, second: &WeatherSample) -> Option<Vec2> {
    match (first.wind_vector(), second.wind_vector()) {
        (Some(a), Some(b)) => Some((a + b) / 2.0),
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    /// 1° lattice starting at (50N, 0E): row → latitude, col → longitude
    fn grid_from(
        rows: usize,
        cols: usize,
        cell: impl Fn(usize, usize, WeatherSample) -> Option<WeatherSample>,
    ) -> WeatherGrid {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let cells = (0..rows * cols)
            .map(|i| {
                let (r, c) = (i / cols, i % cols);
                cell(r, c, WeatherSample::at(50.0 + r as f64, c as f64, at))
            })
            .collect();
        WeatherGrid::new(rows, cols, cells).unwrap()
    }

    #[test]
    fn test_single_high_in_interior() {
        let grid = grid_from(5, 5, |r, c, s| {
            let p = if (r, c) == (2, 2) { 1020.0 } else { 1010.0 };
            Some(s.with_pressure(p))
        });
        let systems = FrontDetector::default().detect_pressure_systems(&grid).unwrap();

        assert_eq!(systems.len(), 1);
        assert_eq!(systems[0].kind, PressureKind::High);
        assert_eq!(systems[0].coord, GridCoord::new(2, 2));
        assert_eq!(systems[0].pressure, Hectopascals::new(1020.0));
        assert_eq!(systems[0].latitude, 52.0);
    }

    #[test]
    fn test_high_below_floor_is_ignored() {
        let grid = grid_from(3, 3, |r, c, s| {
            let p = if (r, c) == (1, 1) { 1014.0 } else { 1012.0 };
            Some(s.with_pressure(p))
        });
        let systems = FrontDetector::default().detect_pressure_systems(&grid).unwrap();
        assert!(systems.is_empty());
    }

    #[test]
    fn test_low_and_high_in_row_major_order() {
        let grid = grid_from(5, 6, |r, c, s| {
            let p = match (r, c) {
                (1, 4) => 1000.0,
                (3, 1) => 1025.0,
                _ => 1012.0,
            };
            Some(s.with_pressure(p))
        });
        let systems = FrontDetector::default().detect_pressure_systems(&grid).unwrap();
        let found: Vec<_> = systems.iter().map(|s| (s.kind, s.coord)).collect();
        assert_eq!(
            found,
            vec![
                (PressureKind::Low, GridCoord::new(1, 4)),
                (PressureKind::High, GridCoord::new(3, 1)),
            ]
        );
    }

    #[test]
    fn test_tie_with_neighbour_disqualifies() {
        let grid = grid_from(5, 5, |r, c, s| {
            let p = match (r, c) {
                (2, 2) | (2, 3) => 1022.0,
                _ => 1010.0,
            };
            Some(s.with_pressure(p))
        });
        let systems = FrontDetector::default().detect_pressure_systems(&grid).unwrap();
        assert!(systems.is_empty(), "plateau must not be a system: {systems:?}");
    }

    #[test]
    fn test_missing_neighbour_disqualifies() {
        let grid = grid_from(5, 5, |r, c, s| match (r, c) {
            (1, 1) => None,
            (2, 2) => Some(s.with_pressure(1030.0)),
            _ => Some(s.with_pressure(1010.0)),
        });
        let systems = FrontDetector::default().detect_pressure_systems(&grid).unwrap();
        assert!(systems.is_empty());
    }

    #[test]
    fn test_boundary_extremum_not_reported() {
        let grid = grid_from(4, 4, |r, c, s| {
            let p = if (r, c) == (0, 2) { 1030.0 } else { 1012.0 };
            Some(s.with_pressure(p))
        });
        let systems = FrontDetector::default().detect_pressure_systems(&grid).unwrap();
        assert!(systems.is_empty());
    }

    #[test]
    fn test_grid_too_small() {
        let grid = grid_from(2, 4, |_, _, s| Some(s.with_pressure(1012.0)));
        let detector = FrontDetector::default();
        assert!(detector.detect_pressure_systems(&grid).is_err());
        assert!(detector.detect_fronts(&grid).is_err());
        assert!(detector.detect(&grid).is_err());
    }

    #[test]
    fn test_cold_front_with_wind_blowing_towards_cold_side() {
        // Columns 0-1 mild, 2-4 cold; westerly wind carries air eastwards
        let grid = grid_from(3, 5, |_, c, s| {
            let t = if c < 2 { 12.0 } else { 6.0 };
            Some(s.with_temperature(t).with_wind(10.0, 270.0))
        });
        let fronts = FrontDetector::default().detect_fronts(&grid).unwrap();

        assert_eq!(fronts.len(), 3, "one front per row between col 1 and 2");
        for front in &fronts {
            assert_eq!(front.kind, FrontKind::Cold);
            assert_eq!(front.cells[0].col, 1);
            assert_eq!(front.cells[1].col, 2);
            assert_relative_eq!(front.gradient, 6.0);
            assert_relative_eq!(front.temperature_change, -6.0);
            assert_relative_eq!(*front.velocity, 5.0);
            assert_relative_eq!(front.longitude, 1.5);
        }
    }

    #[test]
    fn test_same_gradient_is_warm_against_easterly() {
        // Easterly wind carries air westwards: temperature rises downwind
        let grid = grid_from(3, 5, |_, c, s| {
            let t = if c < 2 { 12.0 } else { 6.0 };
            Some(s.with_temperature(t).with_wind(8.0, 90.0))
        });
        let fronts = FrontDetector::default().detect_fronts(&grid).unwrap();
        assert_eq!(fronts.len(), 3);
        assert!(fronts.iter().all(|f| f.kind == FrontKind::Warm));
        assert_relative_eq!(*fronts[0].velocity, 4.0);
    }

    #[test]
    fn test_perpendicular_wind_falls_back_to_scan_order() {
        // Northerly wind across an east-west pair
        let grid = grid_from(3, 3, |_, c, s| {
            let t = if c == 0 { 10.0 } else { 5.0 };
            Some(s.with_temperature(t).with_wind(6.0, 0.0))
        });
        let fronts = FrontDetector::default().detect_fronts(&grid).unwrap();
        assert_eq!(fronts.len(), 3);
        assert!(fronts.iter().all(|f| f.kind == FrontKind::Cold));
    }

    #[test]
    fn test_gentle_gradient_and_equal_temperatures_ignored() {
        let grid = grid_from(4, 4, |r, _, s| Some(s.with_temperature(8.0 + r as f64)));
        let fronts = FrontDetector::default().detect_fronts(&grid).unwrap();
        assert!(fronts.is_empty(), "1 °C/degree is below the threshold");
    }

    #[test]
    fn test_missing_cell_skipped_for_fronts() {
        let grid = grid_from(4, 4, |r, c, s| match (r, c) {
            (1, 1) => None,
            (1, 2) => Some(s.with_temperature(0.0)),
            _ => Some(s.with_temperature(10.0)),
        });
        let fronts = FrontDetector::default().detect_fronts(&grid).unwrap();
        // The (1,1)-(1,2) pair is gone; the other three around (1,2) remain
        assert_eq!(fronts.len(), 3);
        assert!(fronts
            .iter()
            .all(|f| f.cells.contains(&GridCoord::new(1, 2))));
    }

    #[test]
    fn test_configurable_threshold_and_velocity() {
        let config = DetectorConfig {
            front_gradient_threshold: 7.0,
            front_velocity_factor: 0.25,
            ..DetectorConfig::default()
        };
        let grid = grid_from(3, 3, |_, c, s| {
            let t = if c == 0 { 20.0 } else { 12.0 };
            Some(s.with_temperature(t).with_wind(12.0, 270.0))
        });
        let fronts = FrontDetector::new(config).detect_fronts(&grid).unwrap();
        assert_eq!(fronts.len(), 3);
        assert_relative_eq!(*fronts[0].velocity, 3.0);

        let strict = DetectorConfig {
            front_gradient_threshold: 8.0,
            ..config
        };
        assert!(FrontDetector::new(strict).detect_fronts(&grid).unwrap().is_empty());
    }

    #[test]
    fn test_movement_uses_circular_mean() {
        let grid = grid_from(3, 3, |r, _, s| {
            let dir = if r % 2 == 0 { 350.0 } else { 10.0 };
            Some(s.with_wind(8.0, dir))
        });
        let movement = FrontDetector::default().estimate_movement(&grid).unwrap();
        assert_relative_eq!(*movement.mean_wind_speed, 8.0);
        assert_relative_eq!(*movement.velocity, 4.0);
        let dir = *movement.direction.unwrap();
        assert!(dir < 5.0 || dir > 355.0, "expected roughly north, got {dir}");
    }

    #[test]
    fn test_movement_cancelling_winds_have_no_direction() {
        let grid = grid_from(3, 4, |_, c, s| {
            let dir = if c % 2 == 0 { 90.0 } else { 270.0 };
            Some(s.with_wind(6.0, dir))
        });
        let movement = FrontDetector::default().estimate_movement(&grid).unwrap();
        assert!(movement.direction.is_none());
        assert_relative_eq!(*movement.velocity, 3.0);
    }

    #[test]
    fn test_movement_averages_pressure_trend() {
        let grid = grid_from(3, 3, |r, c, s| {
            let s = s.with_wind(8.0, 270.0);
            match (r, c) {
                (0, _) => Some(s.with_pressure_trend(-3.0)),
                (1, _) => Some(s.with_pressure_trend(1.5)),
                _ => Some(s),
            }
        });
        let movement = FrontDetector::default().estimate_movement(&grid).unwrap();
        assert_relative_eq!(movement.pressure_trend.unwrap(), -0.75);

        let calm = grid_from(3, 3, |_, _, s| Some(s.with_wind(8.0, 270.0)));
        let movement = FrontDetector::default().estimate_movement(&calm).unwrap();
        assert!(movement.pressure_trend.is_none());
    }

    #[test]
    fn test_front_without_wind_speed_is_stationary() {
        let grid = grid_from(3, 3, |_, c, s| {
            let t = if c == 0 { 12.0 } else { 4.0 };
            Some(s.with_temperature(t))
        });
        let fronts = FrontDetector::default().detect_fronts(&grid).unwrap();
        assert_eq!(fronts.len(), 3);
        assert!(fronts.iter().all(|f| *f.velocity == 0.0));
        // No wind to decide direction: falls back to scan order
        assert!(fronts.iter().all(|f| f.kind == FrontKind::Cold));
    }

    #[test]
    fn test_movement_absent_without_wind() {
        let grid = grid_from(3, 3, |_, _, s| Some(s.with_temperature(5.0)));
        assert!(FrontDetector::default().estimate_movement(&grid).is_none());
    }
}
