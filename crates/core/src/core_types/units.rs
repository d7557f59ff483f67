//! Semantic unit types for weather quantities
//!
//! Newtype wrappers keep the quantities a weather API hands us from being mixed
//! up (a wind speed passed where a temperature was expected, a bearing used as
//! a percentage).
//!
//! # Design Philosophy
//! - Every quantity is an `f64`, matching the precision of the JSON feed
//! - `Deref` to the raw value so arithmetic stays terse at call sites
//! - Total ordering via `Ord` (NaN sorts above every other value)
//! - Serde treats each type as its inner number
//!
//! # Usage
//! ```
//! use windfarm_weather_core::core_types::units::{Celsius, Degrees, MetersPerSecond};
//!
//! let speed = MetersPerSecond::new(10.0);
//! assert!((*speed.to_kmh() - 36.0).abs() < 1e-9);
//!
//! let t1 = Celsius::new(-2.0);
//! let t2 = Celsius::new(4.0);
//! assert_eq!(t1.min(t2), Celsius::new(-2.0));
//!
//! // Bearings wrap into [0, 360)
//! assert_eq!(Degrees::new(-90.0).normalized(), Degrees::new(270.0));
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

/// Shared trait impls for every `f64` unit newtype.
///
/// Generates `Eq`/`Ord` (total ordering), `Deref<Target = f64>`, the
/// `From` conversions in both directions and `Display` with the unit suffix.
macro_rules! unit_type {
    ($name:ident, $suffix:literal) => {
        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.total_cmp(&other.0)
            }
        }

        impl Deref for $name {
            type Target = f64;
            #[inline]
            fn deref(&self) -> &f64 {
                &self.0
            }
        }

        impl From<f64> for $name {
            fn from(v: f64) -> Self {
                $name(v)
            }
        }

        impl From<$name> for f64 {
            fn from(v: $name) -> f64 {
                v.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match f.precision() {
                    Some(p) => write!(f, "{:.*}{}", p, self.0, $suffix),
                    None => write!(f, "{}{}", self.0, $suffix),
                }
            }
        }

        impl $name {
            /// Create a new value
            #[inline]
            #[must_use]
            pub const fn new(value: f64) -> Self {
                $name(value)
            }

            /// Get the raw f64 value
            #[inline]
            #[must_use]
            pub fn value(self) -> f64 {
                self.0
            }

            /// True when the value is neither NaN nor infinite
            #[inline]
            #[must_use]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }
    };
}

// ============================================================================
// TEMPERATURE
// ============================================================================

/// Air temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Celsius(f64);

unit_type!(Celsius, "°C");

// ============================================================================
// VELOCITY
// ============================================================================

/// Wind speed in meters per second
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MetersPerSecond(f64);

unit_type!(MetersPerSecond, " m/s");

impl MetersPerSecond {
    /// Convert to km/h
    #[inline]
    #[must_use]
    pub fn to_kmh(self) -> KilometersPerHour {
        KilometersPerHour(self.0 * 3.6)
    }
}

/// Wind speed in kilometres per hour, for display
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct KilometersPerHour(f64);

unit_type!(KilometersPerHour, " km/h");

// ============================================================================
// ANGLE
// ============================================================================

/// Compass bearing in degrees (0 = North, 90 = East)
///
/// Wind directions use the meteorological convention: the bearing the wind
/// blows *from*.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Degrees(f64);

unit_type!(Degrees, "°");

impl Degrees {
    /// Wrap into `[0, 360)`
    #[must_use]
    pub fn normalized(self) -> Degrees {
        Degrees(self.0.rem_euclid(360.0))
    }

    /// The opposite bearing (e.g. wind "from" → wind "towards")
    #[must_use]
    pub fn reversed(self) -> Degrees {
        Degrees(self.0 + 180.0).normalized()
    }

    /// Nearest 8-point compass direction
    #[must_use]
    pub fn compass_point(self) -> CompassPoint {
        // 45° sectors centred on each point, N spans [337.5, 22.5)
        let sector = ((self.normalized().0 + 22.5) / 45.0).floor() as usize % 8;
        CompassPoint::ALL[sector]
    }
}

/// 8-point compass direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassPoint {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl CompassPoint {
    /// Clockwise from north
    pub const ALL: [CompassPoint; 8] = [
        CompassPoint::North,
        CompassPoint::NorthEast,
        CompassPoint::East,
        CompassPoint::SouthEast,
        CompassPoint::South,
        CompassPoint::SouthWest,
        CompassPoint::West,
        CompassPoint::NorthWest,
    ];

    /// Unicode arrow pointing along the bearing
    #[must_use]
    pub fn arrow(self) -> char {
        match self {
            CompassPoint::North => '↑',
            CompassPoint::NorthEast => '↗',
            CompassPoint::East => '→',
            CompassPoint::SouthEast => '↘',
            CompassPoint::South => '↓',
            CompassPoint::SouthWest => '↙',
            CompassPoint::West => '←',
            CompassPoint::NorthWest => '↖',
        }
    }
}

// ============================================================================
// RATIOS AND PRESSURE
// ============================================================================

/// Percentage (relative humidity, cloud cover), nominally 0-100
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Percent(f64);

unit_type!(Percent, "%");

/// Atmospheric pressure in hectopascals (millibars)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Hectopascals(f64);

unit_type!(Hectopascals, " hPa");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compass_sectors() {
        assert_eq!(Degrees::new(0.0).compass_point(), CompassPoint::North);
        assert_eq!(Degrees::new(337.5).compass_point(), CompassPoint::North);
        assert_eq!(Degrees::new(22.4).compass_point(), CompassPoint::North);
        assert_eq!(Degrees::new(22.5).compass_point(), CompassPoint::NorthEast);
        assert_eq!(Degrees::new(90.0).compass_point(), CompassPoint::East);
        assert_eq!(Degrees::new(200.0).compass_point(), CompassPoint::South);
        assert_eq!(Degrees::new(-45.0).compass_point(), CompassPoint::NorthWest);
        assert_eq!(Degrees::new(720.0 + 270.0).compass_point(), CompassPoint::West);
    }

    #[test]
    fn test_reversed_bearing() {
        assert_eq!(Degrees::new(270.0).reversed(), Degrees::new(90.0));
        assert_eq!(Degrees::new(10.0).reversed(), Degrees::new(190.0));
    }

    #[test]
    fn test_total_ordering_with_nan() {
        let nan = Hectopascals::new(f64::NAN);
        let p = Hectopascals::new(1020.0);
        assert!(nan > p);
        assert!(!nan.is_finite());
    }

    #[test]
    fn test_display_precision() {
        assert_eq!(format!("{:.1}", Celsius::new(-1.26)), "-1.3°C");
        assert_eq!(format!("{:.0}", Hectopascals::new(1015.4)), "1015 hPa");
        assert_eq!(format!("{:.1}", MetersPerSecond::new(11.0).to_kmh()), "39.6 km/h");
    }
}
