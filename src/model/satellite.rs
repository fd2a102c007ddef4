use std::f64::consts::PI;

use nalgebra::{Point3, Vector4};

use crate::astro::{
    darker_shade, generate_orbit_polyline, Colour, DynamicState, HasMass, KeplerianElements,
    LaunchState, OrbitMesh, NEWTON_G,
};
use crate::error::{OrbitError, SimulationError};
use crate::math::frame::Transform;

use super::body::{BodyId, ParentBody};

pub const MAX_NAME_LENGTH: usize = 30;

/// Everything the launch panel asks for. Angles in radians, altitude in
/// meters above the parent's surface.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchParams {
    pub name: String,
    pub dry_mass: f64,
    pub fuel_mass: f64,
    /// RGB, each in [0, 1]
    pub colour: [f32; 3],
    pub parent: String,
    pub longitude: f64,
    pub latitude: f64,
    pub azimuth: f64,
    pub altitude: f64,
    pub velocity: f64,
    pub flight_path_angle: f64,
}

impl Default for LaunchParams {
    fn default() -> Self {
        LaunchParams {
            name: String::from("Satellite"),
            dry_mass: 1000.0,
            fuel_mass: 100.0,
            colour: [1.0, 1.0, 1.0],
            parent: String::from("Earth"),
            longitude: 0.0,
            latitude: 0.0,
            azimuth: 90f64.to_radians(),
            altitude: 200e3,
            velocity: 7784.34,
            flight_path_angle: 0.0,
        }
    }
}

impl LaunchParams {
    /// Takes angles in degrees and altitude in kilometers, the way they're
    /// typed into the launch panel. Masses, colour and parent are defaulted.
    pub fn from_degrees(
        name: impl Into<String>,
        longitude: f64,
        latitude: f64,
        azimuth: f64,
        altitude_km: f64,
        velocity: f64,
        flight_path_angle: f64,
    ) -> Self {
        LaunchParams {
            name: name.into(),
            longitude: longitude.to_radians(),
            latitude: latitude.to_radians(),
            azimuth: azimuth.to_radians(),
            altitude: altitude_km * 1000.0,
            velocity,
            flight_path_angle: flight_path_angle.to_radians(),
            ..Default::default()
        }
    }

    pub fn with_colour(mut self, colour: [f32; 3]) -> Self {
        self.colour = colour;
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = parent.into();
        self
    }

    pub fn with_masses(mut self, dry_mass: f64, fuel_mass: f64) -> Self {
        self.dry_mass = dry_mass;
        self.fuel_mass = fuel_mass;
        self
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        let invalid = |msg: String| Err(SimulationError::InvalidLaunch(msg));

        let name_length = self.name.chars().count();
        if self.name.trim().is_empty() {
            return invalid("name must not be empty".into());
        }
        if name_length > MAX_NAME_LENGTH {
            return invalid(format!(
                "name is {} characters long, at most {} allowed",
                name_length, MAX_NAME_LENGTH
            ));
        }

        let values = [
            ("dry mass", self.dry_mass),
            ("fuel mass", self.fuel_mass),
            ("longitude", self.longitude),
            ("latitude", self.latitude),
            ("azimuth", self.azimuth),
            ("altitude", self.altitude),
            ("velocity", self.velocity),
            ("flight path angle", self.flight_path_angle),
        ];
        if let Some((label, _)) = values.iter().find(|(_, x)| !x.is_finite()) {
            return invalid(format!("{} is not finite", label));
        }

        if self.dry_mass <= 0.0 {
            return invalid(format!("dry mass must be positive, got {}", self.dry_mass));
        }
        if self.fuel_mass < 0.0 {
            return invalid(format!("fuel mass must not be negative, got {}", self.fuel_mass));
        }
        if self.altitude <= 0.0 {
            return invalid(format!("altitude must be positive, got {}", self.altitude));
        }
        if self.velocity <= 0.0 {
            return invalid(format!("velocity must be positive, got {}", self.velocity));
        }
        if self.colour.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return invalid(format!("colour {:?} is outside [0, 1]", self.colour));
        }

        Ok(())
    }

    pub fn launch_state(&self) -> LaunchState {
        LaunchState {
            longitude: self.longitude,
            latitude: self.latitude,
            azimuth: self.azimuth,
            altitude: self.altitude,
            speed: self.velocity,
            flight_path_angle: self.flight_path_angle,
        }
    }
}

/// Everything the info panel shows about one satellite. Distances are
/// altitudes above the parent's surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteInfo {
    pub name: String,
    pub altitude: f64,
    pub velocity: f64,
    pub flight_path_angle: f64,
    pub apoapsis: f64,
    pub periapsis: f64,
    pub eccentricity: f64,
    pub semi_major_axis: f64,
    pub arg_periapsis: f64,
    pub inclination: f64,
    pub long_asc_node: f64,
    pub period: f64,
    pub selected: bool,
    pub hidden: bool,
}

/// A body in a fixed Keplerian orbit around a [ParentBody].
///
/// The orbit is worked out once at launch and never changes. Every tick, the
/// satellite's frame follows the parent's position (but not its spin) and the
/// state is re-evaluated from the elements.
#[derive(Debug)]
pub struct Satellite {
    name: String,
    dry_mass: f64,
    fuel_mass: f64,
    colour: Colour,
    parent: BodyId,
    parent_radius: f64,
    mu: f64,
    // Parent position, plus the parent's orientation when we were attached
    frame: Transform<f64>,
    elements: KeplerianElements,
    state: DynamicState,
    trajectory: OrbitMesh,
    // Relative to the parent, in its equatorial frame
    apoapsis_local: Point3<f64>,
    periapsis_local: Point3<f64>,
    selected: bool,
    hidden: bool,
}

impl Satellite {
    /// Puts a new satellite into orbit. Nothing is created if the parameters
    /// are invalid or the launch doesn't give a closed orbit.
    pub fn launch(
        params: &LaunchParams,
        parent_id: BodyId,
        parent: &ParentBody,
        time: f64,
        trajectory_segments: usize,
    ) -> Result<Self, SimulationError> {
        params.validate()?;

        let mu = NEWTON_G * (parent.mass() + params.dry_mass + params.fuel_mass);
        let elements =
            KeplerianElements::from_launch(mu, parent.radius(), &params.launch_state(), time)?;

        let [r, g, b] = params.colour;
        let colour = Vector4::new(r, g, b, 1.0);
        let trajectory = generate_orbit_polyline(
            trajectory_segments,
            elements.eccentricity(),
            elements.semi_major_axis(),
            elements.arg_periapsis(),
            elements.inclination(),
            elements.long_asc_node(),
            darker_shade(&colour),
        );

        let frame = Transform::from_pose(parent.position().coords, parent.rotation());
        let state = elements.state_at_time(time, &frame)?;

        log::debug!(
            "Launched {} around {}: e = {:.6}, a = {:.1} m, T = {:.1} s",
            params.name,
            parent.name(),
            elements.eccentricity(),
            elements.semi_major_axis(),
            elements.period()
        );

        Ok(Satellite {
            name: params.name.clone(),
            dry_mass: params.dry_mass,
            fuel_mass: params.fuel_mass,
            colour,
            parent: parent_id,
            parent_radius: parent.radius(),
            mu,
            frame,
            elements,
            state,
            trajectory,
            apoapsis_local: Point3::from(elements.position_at(PI)),
            periapsis_local: Point3::from(elements.position_at(0.0)),
            selected: false,
            hidden: false,
        })
    }

    /// Moves the satellite to where it is at `time`. On failure the previous
    /// state is kept.
    pub fn advance(&mut self, parent: &ParentBody, time: f64) -> Result<(), OrbitError> {
        let mut frame = self.frame;
        frame.set_translation(parent.position().coords);
        self.state = self.elements.state_at_time(time, &frame)?;
        self.frame = frame;
        Ok(())
    }

    /// Re-anchors the satellite to a different parent. The elements are kept
    /// as they are; only the frame and gravitational parameter change.
    pub fn change_parent_body(&mut self, parent_id: BodyId, parent: &ParentBody) {
        self.parent = parent_id;
        self.parent_radius = parent.radius();
        self.mu = NEWTON_G * (parent.mass() + self.dry_mass + self.fuel_mass);
        self.frame = Transform::from_pose(parent.position().coords, parent.rotation());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> BodyId {
        self.parent
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub fn dry_mass(&self) -> f64 {
        self.dry_mass
    }

    pub fn fuel_mass(&self) -> f64 {
        self.fuel_mass
    }

    pub fn colour(&self) -> Colour {
        self.colour
    }

    pub fn elements(&self) -> &KeplerianElements {
        &self.elements
    }

    pub fn state(&self) -> &DynamicState {
        &self.state
    }

    pub fn trajectory(&self) -> &OrbitMesh {
        &self.trajectory
    }

    pub fn frame(&self) -> &Transform<f64> {
        &self.frame
    }

    pub fn position(&self) -> Point3<f64> {
        self.state.position_world
    }

    pub fn altitude(&self) -> f64 {
        self.state.radius - self.parent_radius
    }

    pub fn speed(&self) -> f64 {
        self.state.speed
    }

    pub fn flight_path_angle(&self) -> f64 {
        self.state.flight_path_angle
    }

    pub fn true_anomaly(&self) -> f64 {
        self.state.anomalies.true_anomaly
    }

    pub fn apoapsis_altitude(&self) -> f64 {
        self.elements.apoapsis() - self.parent_radius
    }

    pub fn periapsis_altitude(&self) -> f64 {
        self.elements.periapsis() - self.parent_radius
    }

    pub fn apoapsis_marker(&self) -> Point3<f64> {
        self.frame.transform_point(&self.apoapsis_local)
    }

    pub fn periapsis_marker(&self) -> Point3<f64> {
        self.frame.transform_point(&self.periapsis_local)
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn info(&self) -> SatelliteInfo {
        SatelliteInfo {
            name: self.name.clone(),
            altitude: self.altitude(),
            velocity: self.speed(),
            flight_path_angle: self.flight_path_angle(),
            apoapsis: self.apoapsis_altitude(),
            periapsis: self.periapsis_altitude(),
            eccentricity: self.elements.eccentricity(),
            semi_major_axis: self.elements.semi_major_axis(),
            arg_periapsis: self.elements.arg_periapsis(),
            inclination: self.elements.inclination(),
            long_asc_node: self.elements.long_asc_node(),
            period: self.elements.period(),
            selected: self.selected,
            hidden: self.hidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::{UnitQuaternion, Vector3};

    use super::*;
    use crate::astro::DEFAULT_ORBIT_SEGMENTS;
    use crate::consts::{EARTH_MASS, EARTH_RADIUS};

    fn earth() -> ParentBody {
        ParentBody::new("Earth", EARTH_MASS, EARTH_RADIUS)
    }

    fn launch(params: &LaunchParams, parent: &ParentBody) -> Satellite {
        Satellite::launch(params, BodyId(0), parent, 0.0, DEFAULT_ORBIT_SEGMENTS).unwrap()
    }

    #[test]
    fn test_defaults() {
        let params = LaunchParams::default();
        assert!(params.validate().is_ok());
        assert_relative_eq!(params.azimuth, std::f64::consts::FRAC_PI_2);

        let from_deg = LaunchParams::from_degrees("Sat-A", 0.0, 0.0, 90.0, 200.0, 7784.34, 0.0);
        assert_eq!(
            from_deg,
            LaunchParams {
                name: "Sat-A".into(),
                ..params
            }
        );
    }

    #[test]
    fn test_validation() {
        let modified = |change: fn(&mut LaunchParams)| {
            let mut params = LaunchParams::default();
            change(&mut params);
            params
        };
        let bad = [
            modified(|p| p.name.clear()),
            modified(|p| p.name = "   ".into()),
            modified(|p| p.name = "x".repeat(31)),
            modified(|p| p.dry_mass = 0.0),
            modified(|p| p.fuel_mass = -1.0),
            modified(|p| p.altitude = 0.0),
            modified(|p| p.velocity = -10.0),
            modified(|p| p.latitude = f64::NAN),
            modified(|p| p.colour = [1.5, 0.0, 0.0]),
        ];
        for params in bad.iter() {
            assert!(
                matches!(params.validate(), Err(SimulationError::InvalidLaunch(_))),
                "{:?} was accepted",
                params
            );
        }

        let thirty = modified(|p| {
            p.name = "x".repeat(30);
            p.fuel_mass = 0.0;
        });
        assert!(thirty.validate().is_ok());
    }

    #[test]
    fn test_launch_state_and_markers() {
        let earth = earth();
        let satellite = launch(&LaunchParams::default(), &earth);

        // Sub-circular launch: we start at apoapsis
        assert_relative_eq!(satellite.altitude(), 200e3, max_relative = 1e-9);
        assert_relative_eq!(satellite.apoapsis_altitude(), 200e3, max_relative = 1e-9);
        assert!(satellite.periapsis_altitude() < 200e3);
        assert_relative_eq!(satellite.speed(), 7784.34, max_relative = 1e-9);
        assert_relative_eq!(satellite.position(), satellite.apoapsis_marker(), epsilon = 1e-3);
        assert_relative_eq!(
            satellite.periapsis_marker().coords.norm(),
            satellite.elements().periapsis(),
            max_relative = 1e-12
        );

        // The trajectory is drawn darker than the icon
        let vertex_colour = satellite.trajectory().vertices()[0].colour;
        assert!(vertex_colour.x < satellite.colour().x);
        assert_eq!(satellite.trajectory().segments(), DEFAULT_ORBIT_SEGMENTS);
    }

    #[test]
    fn test_mu_includes_satellite_mass() {
        let earth = earth();
        let satellite = launch(&LaunchParams::default(), &earth);
        assert_relative_eq!(satellite.mu(), NEWTON_G * (EARTH_MASS + 1100.0));
    }

    #[test]
    fn test_escape_launch_is_rejected() {
        let params = LaunchParams {
            velocity: 12_000.0,
            ..Default::default()
        };
        let result = Satellite::launch(&params, BodyId(0), &earth(), 0.0, 16);
        assert!(matches!(
            result,
            Err(SimulationError::DegenerateOrbit(OrbitError::HyperbolicOrbit { .. }))
        ));
    }

    #[test]
    fn test_advance_follows_parent_position_not_spin() {
        let mut earth = earth();
        let mut satellite = launch(&LaunchParams::default(), &earth);
        let period = satellite.elements().period();

        // One full period later, with the parent spun and moved
        earth.rotate_about_axis(period, 86_400.0);
        earth.set_position(Point3::new(1e9, 0.0, 0.0));
        let start = satellite.position();
        satellite.advance(&earth, period).unwrap();

        let shifted = start + Vector3::new(1e9, 0.0, 0.0);
        assert_relative_eq!(satellite.position(), shifted, max_relative = 1e-9);
        assert_relative_eq!(satellite.frame().rotation(), UnitQuaternion::identity());
    }

    #[test]
    fn test_failed_advance_keeps_previous_state() {
        let earth = earth();
        let mut satellite = launch(&LaunchParams::default(), &earth);
        satellite.advance(&earth, 60.0).unwrap();
        let state = *satellite.state();
        let position = satellite.position();

        assert_eq!(
            satellite.advance(&earth, f64::INFINITY),
            Err(OrbitError::NonFiniteInput)
        );
        assert_eq!(*satellite.state(), state);
        assert_eq!(satellite.position(), position);
    }

    #[test]
    fn test_change_parent_body() {
        let earth = earth();
        let moon = ParentBody::new("Moon", 7.35e22, 1.737e6)
            .with_position(Point3::new(3.84e8, 0.0, 0.0))
            .with_rotation(UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.3));
        let mut satellite = launch(&LaunchParams::default(), &earth);
        let elements = *satellite.elements();

        satellite.change_parent_body(BodyId(1), &moon);
        assert_eq!(satellite.parent(), BodyId(1));
        assert_eq!(satellite.elements(), &elements);
        assert_relative_eq!(satellite.mu(), NEWTON_G * (7.35e22 + 1100.0));
        assert_relative_eq!(satellite.frame().translation(), Vector3::new(3.84e8, 0.0, 0.0));
        assert_abs_diff_eq!(satellite.frame().rotation().angle(), 0.3, epsilon = 1e-12);

        satellite.advance(&moon, 10.0).unwrap();
        let offset = satellite.position() - moon.position();
        assert_relative_eq!(offset.norm(), satellite.state().radius, max_relative = 1e-12);
    }

    #[test]
    fn test_info() {
        let earth = earth();
        let mut satellite = launch(&LaunchParams::default(), &earth);
        satellite.set_selected(true);
        let info = satellite.info();

        assert_eq!(info.name, "Satellite");
        assert!(info.selected);
        assert!(!info.hidden);
        assert_relative_eq!(info.period, satellite.elements().period());
        assert_relative_eq!(info.apoapsis, satellite.apoapsis_altitude());
    }
}
