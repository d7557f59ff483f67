//! Grid-based weather data

pub mod weather_grid;

// Re-export main types
pub use weather_grid::*;
