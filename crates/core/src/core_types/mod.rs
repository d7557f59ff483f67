//! Core types and utilities

pub mod units;
pub mod vec2;
pub mod weather;

pub use units::*;
pub use vec2::Vec2;
pub use weather::*;
