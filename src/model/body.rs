use std::f64::consts::TAU;
use std::ops::{Index, IndexMut};

use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::astro::HasMass;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct BodyId(pub usize);

/// A massive body that satellites orbit. Spins about its own +Z axis.
#[derive(Debug, Clone)]
pub struct ParentBody {
    name: String,
    position: Point3<f64>,
    // body-fixed to world
    rotation: UnitQuaternion<f64>,
    mass: f64,
    radius: f64,
    day_length: f64,
    atmosphere_height: f64,
    colour: Point3<f32>,
}

impl ParentBody {
    pub fn new(name: impl Into<String>, mass: f64, radius: f64) -> Self {
        debug_assert!(mass > 0.0 && radius > 0.0);
        ParentBody {
            name: name.into(),
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
            mass,
            radius,
            day_length: 86_400.0,
            atmosphere_height: 0.0,
            colour: Point3::new(0.2, 0.4, 1.0),
        }
    }

    pub fn with_position(mut self, position: Point3<f64>) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: UnitQuaternion<f64>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_day_length(mut self, day_length: f64) -> Self {
        self.day_length = day_length;
        self
    }

    pub fn with_atmosphere_height(mut self, atmosphere_height: f64) -> Self {
        self.atmosphere_height = atmosphere_height;
        self
    }

    pub fn with_colour(mut self, colour: Point3<f32>) -> Self {
        self.colour = colour;
        self
    }

    /// Spins the body about its own pole by the fraction of a day that `dt`
    /// represents.
    pub fn rotate_about_axis(&mut self, dt: f64, day_length: f64) {
        if dt == 0.0 || day_length <= 0.0 {
            return;
        }
        let angle = TAU * dt / day_length;
        let spin = UnitQuaternion::from_axis_angle(&self.spin_axis(), angle);
        self.rotation = spin * self.rotation;
        // Thousands of these a second add up; keep the quaternion unit
        self.rotation.renormalize();
    }

    /// Rotates by `dt` of this body's own day.
    pub fn spin(&mut self, dt: f64) {
        self.rotate_about_axis(dt, self.day_length);
    }

    /// The body's +Z axis, in world space
    pub fn spin_axis(&self) -> nalgebra::Unit<Vector3<f64>> {
        nalgebra::Unit::new_normalize(self.rotation * Vector3::z())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    pub fn set_position(&mut self, position: Point3<f64>) {
        self.position = position;
    }

    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.rotation
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn day_length(&self) -> f64 {
        self.day_length
    }

    pub fn atmosphere_height(&self) -> f64 {
        self.atmosphere_height
    }

    pub fn colour(&self) -> Point3<f32> {
        self.colour
    }
}

impl HasMass for ParentBody {
    fn mass(&self) -> f64 {
        self.mass
    }
}

/// Lights the scene. Nothing orbits it.
#[derive(Debug, Clone)]
pub struct LightSource {
    pub name: String,
    pub position: Point3<f64>,
    pub radius: f64,
    pub mass: f64,
    pub colour: Point3<f32>,
}

/// Owns every parent body in the scene. Bodies are never removed, so a
/// [BodyId] stays valid for as long as the registry does.
#[derive(Debug, Clone, Default)]
pub struct BodyRegistry {
    bodies: Vec<ParentBody>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, body: ParentBody) -> BodyId {
        self.bodies.push(body);
        BodyId(self.bodies.len() - 1)
    }

    pub fn get(&self, id: BodyId) -> Option<&ParentBody> {
        self.bodies.get(id.0)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut ParentBody> {
        self.bodies.get_mut(id.0)
    }

    pub fn find_by_name(&self, name: &str) -> Option<BodyId> {
        self.bodies.iter().position(|b| b.name == name).map(BodyId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &ParentBody)> + '_ {
        self.bodies.iter().enumerate().map(|(i, b)| (BodyId(i), b))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ParentBody> + '_ {
        self.bodies.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl Index<BodyId> for BodyRegistry {
    type Output = ParentBody;

    fn index(&self, id: BodyId) -> &ParentBody {
        &self.bodies[id.0]
    }
}

impl IndexMut<BodyId> for BodyRegistry {
    fn index_mut(&mut self, id: BodyId) -> &mut ParentBody {
        &mut self.bodies[id.0]
    }
}
