//! Physical constants for the default scene. SI units throughout.

// Earth
pub const EARTH_MASS: f64 = 5.97e24;
pub const EARTH_RADIUS: f64 = 6_371_000.0;
pub const EARTH_ATMOSPHERE_HEIGHT: f64 = 100_000.0;
pub const EARTH_DAY_LENGTH: f64 = 86_400.0;
pub const EARTH_AXIAL_TILT_DEGREES: f64 = 24.0;

// Sun, placed on the -Y axis of the scene
pub const SUN_MASS: f64 = 1.989e30;
pub const SUN_RADIUS: f64 = 696_000_000.0;
pub const SUN_DISTANCE: f64 = 150e9;
