//! Point weather observations
//!
//! A [`WeatherSample`] is one reading at one place and time, shaped after the
//! "current" and "hourly" blocks of a forecast API response. Every measurement
//! is optional because the upstream feed returns `null` for values it cannot
//! supply; the analyses decide which gaps they can tolerate.

use crate::core_types::units::{Celsius, Degrees, Hectopascals, MetersPerSecond, Percent};
use crate::core_types::vec2::Vec2;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One weather observation at a point and time.
///
/// Samples are plain values: the caller owns them and the analyses only read
/// them.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use windfarm_weather_core::core_types::WeatherSample;
///
/// let at = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
/// let sample = WeatherSample::at(54.0, 1.5, at)
///     .with_wind(11.0, 270.0)
///     .with_temperature(6.5)
///     .with_humidity(85.0);
///
/// // A westerly blows towards the east
/// let v = sample.wind_vector().unwrap();
/// assert!((v.x - 11.0).abs() < 1e-9);
/// assert!(v.y.abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Observation or forecast valid time (UTC)
    pub timestamp: DateTime<Utc>,

    /// Mean wind speed at hub reference height (10 m)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<MetersPerSecond>,
    /// Direction the wind blows *from*
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<Degrees>,
    /// Peak gust speed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_gust: Option<MetersPerSecond>,

    /// Air temperature at 2 m
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Celsius>,
    /// "Feels like" temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apparent_temperature: Option<Celsius>,
    /// Relative humidity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<Percent>,
    /// Mean sea-level pressure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<Hectopascals>,
    /// Pressure change over the preceding 3 hours (hPa)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_trend: Option<f64>,
    /// Total cloud cover
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_cover: Option<Percent>,
    /// Precipitation over the preceding hour (mm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation_mm: Option<f64>,
    /// WMO weather interpretation code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_code: Option<u8>,
}

impl WeatherSample {
    /// An empty observation at a location and time; fill it with the `with_*`
    /// helpers.
    #[must_use]
    pub fn at(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
            wind_speed: None,
            wind_direction: None,
            wind_gust: None,
            temperature: None,
            apparent_temperature: None,
            humidity: None,
            pressure: None,
            pressure_trend: None,
            cloud_cover: None,
            precipitation_mm: None,
            weather_code: None,
        }
    }

    /// Set wind speed (m/s) and direction (degrees, blowing from)
    #[must_use]
    pub fn with_wind(mut self, speed_ms: f64, direction_deg: f64) -> Self {
        self.wind_speed = Some(MetersPerSecond::new(speed_ms));
        self.wind_direction = Some(Degrees::new(direction_deg));
        self
    }

    /// Set gust speed (m/s)
    #[must_use]
    pub fn with_gust(mut self, gust_ms: f64) -> Self {
        self.wind_gust = Some(MetersPerSecond::new(gust_ms));
        self
    }

    /// Set air temperature (°C)
    #[must_use]
    pub fn with_temperature(mut self, celsius: f64) -> Self {
        self.temperature = Some(Celsius::new(celsius));
        self
    }

    /// Set relative humidity (%)
    #[must_use]
    pub fn with_humidity(mut self, percent: f64) -> Self {
        self.humidity = Some(Percent::new(percent));
        self
    }

    /// Set sea-level pressure (hPa)
    #[must_use]
    pub fn with_pressure(mut self, hpa: f64) -> Self {
        self.pressure = Some(Hectopascals::new(hpa));
        self
    }

    /// Set the 3-hour pressure change (hPa)
    #[must_use]
    pub fn with_pressure_trend(mut self, hpa_per_3h: f64) -> Self {
        self.pressure_trend = Some(hpa_per_3h);
        self
    }

    /// Set the WMO weather code
    #[must_use]
    pub fn with_weather_code(mut self, code: u8) -> Self {
        self.weather_code = Some(code);
        self
    }

    /// Categorical condition decoded from the WMO code
    #[must_use]
    pub fn condition(&self) -> Option<WeatherCondition> {
        self.weather_code.map(WeatherCondition::from_wmo_code)
    }

    /// Velocity of the air mass as (east, north) components in m/s.
    ///
    /// The stored direction is where the wind comes *from*, so the vector
    /// points the opposite way. `None` unless both speed and direction are
    /// present and finite.
    #[must_use]
    pub fn wind_vector(&self) -> Option<Vec2> {
        let speed = self.wind_speed.filter(|s| s.is_finite())?;
        let from = self.wind_direction.filter(|d| d.is_finite())?;
        let towards = from.reversed().to_radians();
        Some(Vec2::new(towards.sin() * *speed, towards.cos() * *speed))
    }
}

/// Broad weather category for a WMO interpretation code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    /// Code 0
    Clear,
    /// Codes 1-3
    Cloudy,
    /// Codes 45, 48
    Fog,
    /// Codes 51-55
    Drizzle,
    /// Codes 61-65
    Rain,
    /// Codes 71-77
    Snow,
    /// Codes 80-82
    RainShowers,
    /// Codes 85, 86
    SnowShowers,
    /// Codes 95-99
    Thunderstorm,
    /// Anything not in the table above
    Unknown(u8),
}

impl WeatherCondition {
    /// Decode a WMO weather interpretation code
    #[must_use]
    pub fn from_wmo_code(code: u8) -> Self {
        match code {
            0 => Self::Clear,
            1..=3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            61 | 63 | 65 => Self::Rain,
            71 | 73 | 75 | 77 => Self::Snow,
            80..=82 => Self::RainShowers,
            85 | 86 => Self::SnowShowers,
            95 | 96 | 99 => Self::Thunderstorm,
            other => Self::Unknown(other),
        }
    }

    /// Map symbol used by the newspaper-style renderer
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Clear => "☀",
            Self::Fog => "🌫",
            Self::Drizzle | Self::Rain | Self::RainShowers => "🌧",
            Self::Snow | Self::SnowShowers => "❄",
            Self::Thunderstorm => "⛈",
            Self::Cloudy | Self::Unknown(_) => "☁",
        }
    }
}

/// Human-readable description of a WMO code ("Moderate rain", "Fog", ...)
#[must_use]
pub fn describe_wmo_code(code: u8) -> String {
    let text = match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        other => return format!("Code {other}"),
    };
    text.to_owned()
}
