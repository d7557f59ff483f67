//! Vector type alias for horizontal wind and displacement vectors.

use nalgebra::Vector2;

/// 2D vector as (east, north) components.
///
/// Alias for `nalgebra::Vector2<f64>`, used for wind velocities in m/s and
/// for displacements between grid points in degrees.
pub type Vec2 = Vector2<f64>;
