//! The two-body orbit engine.
//!
//! - [KeplerianElements] is the immutable shape and orientation of an
//!   elliptical orbit, derived once from a burnout state at a point on the
//!   parent body.
//! - [DynamicState] is where the satellite is along that orbit at a given
//!   time, found by solving Kepler's equation.
//! - [OrbitMesh] is the orbit sampled into a closed polyline for drawing.

mod elements;
mod kepler;
mod trajectory;

// Newton's gravitational constant, in N m^2 / kg^2
pub const NEWTON_G: f64 = 6.673e-11;

pub use elements::{KeplerianElements, LaunchState};
pub use kepler::{perifocal, Anomalies, DynamicState, KEPLER_TOLERANCE};
pub use trajectory::{
    darker_shade, generate_orbit_polyline, Colour, OrbitMesh, OrbitSample, DEFAULT_ORBIT_SEGMENTS,
};

/// A trait indicating this object can be used in physical computations that
/// require a massive body.
pub trait HasMass {
    /// The mass of this object, in kg
    fn mass(&self) -> f64;

    /// The standard gravitational parameter of this object
    fn mu(&self) -> f64 {
        NEWTON_G * self.mass()
    }
}

/// A point mass with no other physical properties.
///
/// Useful for satisfying a [HasMass] trait bound.
#[derive(Debug, Clone, Copy)]
pub struct PointMass(f64);

impl PointMass {
    pub fn new(mass: f64) -> Self {
        Self(mass)
    }
}

impl HasMass for PointMass {
    fn mass(&self) -> f64 {
        self.0
    }
}

impl<T> HasMass for &T
where
    T: HasMass,
{
    fn mass(&self) -> f64 {
        (*self).mass()
    }
}
