use std::f64::consts::TAU;

use nalgebra::Rotation3;

use crate::error::OrbitError;
use crate::math::angle::{perifocal_to_world, wrap_two_pi};
use crate::math::anomaly::{eccentric_to_mean, true_to_eccentric};

/// Burnout conditions at a point above the parent body. Angles are in
/// radians, distances in meters, measured in the parent's equatorial frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchState {
    pub longitude: f64,
    pub latitude: f64,
    /// Heading measured from north towards east
    pub azimuth: f64,
    /// Height above the parent's surface
    pub altitude: f64,
    pub speed: f64,
    /// Angle of the velocity above the local horizontal
    pub flight_path_angle: f64,
}

impl LaunchState {
    fn is_finite(&self) -> bool {
        [
            self.longitude,
            self.latitude,
            self.azimuth,
            self.altitude,
            self.speed,
            self.flight_path_angle,
        ]
        .iter()
        .all(|x| x.is_finite())
    }
}

/// The six classical elements of a bound orbit, plus the quantities that
/// follow directly from them. Never changes once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerianElements {
    mu: f64,
    eccentricity: f64,
    semi_major_axis: f64,
    arg_periapsis: f64,
    inclination: f64,
    long_asc_node: f64,
    time_of_periapsis: f64,
    // -- derived --
    period: f64,
    mean_motion: f64,
}

impl KeplerianElements {
    /// Builds an orbit from its elements directly. `mu` is the gravitational
    /// parameter of the two-body system.
    pub fn new(
        mu: f64,
        eccentricity: f64,
        semi_major_axis: f64,
        arg_periapsis: f64,
        inclination: f64,
        long_asc_node: f64,
        time_of_periapsis: f64,
    ) -> Result<Self, OrbitError> {
        let inputs = [
            mu,
            eccentricity,
            semi_major_axis,
            arg_periapsis,
            inclination,
            long_asc_node,
            time_of_periapsis,
        ];
        if inputs.iter().any(|x| !x.is_finite()) || mu <= 0.0 {
            return Err(OrbitError::NonFiniteInput);
        }
        if semi_major_axis <= 0.0 {
            return Err(OrbitError::HyperbolicOrbit { semi_major_axis });
        }
        if !(0.0..1.0).contains(&eccentricity) {
            return Err(OrbitError::DegenerateOrbit { eccentricity });
        }

        let period = TAU * (semi_major_axis.powi(3) / mu).sqrt();
        Ok(KeplerianElements {
            mu,
            eccentricity,
            semi_major_axis,
            arg_periapsis: wrap_two_pi(arg_periapsis),
            inclination: wrap_two_pi(inclination),
            long_asc_node: wrap_two_pi(long_asc_node),
            time_of_periapsis,
            period,
            mean_motion: TAU / period,
        })
    }

    /// Converts a burnout state at a geodetic point into an orbit in the
    /// parent's equatorial frame. `time` is the simulation time of burnout.
    pub fn from_launch(
        mu: f64,
        parent_radius: f64,
        launch: &LaunchState,
        time: f64,
    ) -> Result<Self, OrbitError> {
        if !launch.is_finite() || !parent_radius.is_finite() || !time.is_finite() {
            return Err(OrbitError::NonFiniteInput);
        }

        let r = launch.altitude + parent_radius;
        let v = launch.speed;
        let (sin_gamma, cos_gamma) = launch.flight_path_angle.sin_cos();

        // Shape of the orbit. `q` is twice the ratio of kinetic to potential
        // energy; 1 on a circular orbit, 2 at escape.
        let q = r * v * v / mu;
        let eccentricity = ((q - 1.0).powi(2) * cos_gamma.powi(2) + sin_gamma.powi(2)).sqrt();
        let semi_major_axis = 1.0 / (2.0 / r - v * v / mu);
        if !semi_major_axis.is_finite() || semi_major_axis <= 0.0 {
            return Err(OrbitError::HyperbolicOrbit { semi_major_axis });
        }
        if !(0.0..1.0).contains(&eccentricity) {
            return Err(OrbitError::DegenerateOrbit { eccentricity });
        }

        // Where along the orbit we are
        let true_anomaly =
            wrap_two_pi((q * cos_gamma * sin_gamma).atan2(q * cos_gamma.powi(2) - 1.0));
        let eccentric_anomaly = true_to_eccentric(true_anomaly, eccentricity);
        let mean_anomaly = eccentric_to_mean(eccentric_anomaly, eccentricity);

        // Orientation. The ascending node sits `delta_lan` west of the launch
        // longitude; `arg_latitude` is how far past the node the launch point is.
        let (sin_lat, cos_lat) = launch.latitude.sin_cos();
        let (sin_az, cos_az) = launch.azimuth.sin_cos();
        let delta_lan = (sin_lat * sin_az).atan2(cos_az);
        let long_asc_node = launch.longitude - delta_lan;
        let inclination = (cos_lat * sin_az).clamp(-1.0, 1.0).acos();
        let arg_latitude = launch.latitude.tan().atan2(cos_az);
        let arg_periapsis = arg_latitude - true_anomaly;

        let period = TAU * (semi_major_axis.powi(3) / mu).sqrt();
        let mean_motion = TAU / period;
        let time_of_periapsis = time - mean_anomaly / mean_motion;

        Ok(KeplerianElements {
            mu,
            eccentricity,
            semi_major_axis,
            arg_periapsis: wrap_two_pi(arg_periapsis),
            inclination: wrap_two_pi(inclination),
            long_asc_node: wrap_two_pi(long_asc_node),
            time_of_periapsis,
            period,
            mean_motion,
        })
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    pub fn semi_major_axis(&self) -> f64 {
        self.semi_major_axis
    }

    pub fn arg_periapsis(&self) -> f64 {
        self.arg_periapsis
    }

    pub fn inclination(&self) -> f64 {
        self.inclination
    }

    pub fn long_asc_node(&self) -> f64 {
        self.long_asc_node
    }

    pub fn time_of_periapsis(&self) -> f64 {
        self.time_of_periapsis
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn mean_motion(&self) -> f64 {
        self.mean_motion
    }

    /// Distance from the parent's center at the far end of the orbit
    pub fn apoapsis(&self) -> f64 {
        self.semi_major_axis * (1.0 + self.eccentricity)
    }

    /// Distance from the parent's center at closest approach
    pub fn periapsis(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity)
    }

    pub fn semilatus_rectum(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity * self.eccentricity)
    }

    /// Rotation from the perifocal frame into the parent's equatorial frame.
    pub fn rotation(&self) -> Rotation3<f64> {
        perifocal_to_world(self.long_asc_node, self.inclination, self.arg_periapsis)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;
    use crate::consts::{EARTH_MASS, EARTH_RADIUS};
    use crate::math::angle::angular_distance;

    fn earth_mu() -> f64 {
        crate::astro::NEWTON_G * EARTH_MASS
    }

    fn launch(azimuth: f64, latitude: f64, altitude: f64, speed: f64, fpa: f64) -> LaunchState {
        LaunchState {
            longitude: 0.0,
            latitude,
            azimuth,
            altitude,
            speed,
            flight_path_angle: fpa,
        }
    }

    #[test]
    fn test_sub_circular_launch_is_at_apoapsis() {
        // Slightly slower than circular: we're at the top of the ellipse
        let state = launch(FRAC_PI_2, 0.0, 200e3, 7784.34, 0.0);
        let orbit = KeplerianElements::from_launch(earth_mu(), EARTH_RADIUS, &state, 0.0).unwrap();

        assert!(orbit.eccentricity() < 1e-3);
        assert_relative_eq!(orbit.apoapsis(), EARTH_RADIUS + 200e3, max_relative = 1e-12);
        assert_abs_diff_eq!(orbit.inclination(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(orbit.long_asc_node(), 0.0, epsilon = 1e-12);
        // Periapsis is half a turn behind us
        assert!(angular_distance(orbit.arg_periapsis(), PI) < 1e-12);
        // And we launched half a period after periapsis
        assert_relative_eq!(
            orbit.time_of_periapsis(),
            -orbit.period() / 2.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_super_circular_launch_is_at_periapsis() {
        let state = launch(FRAC_PI_2, 0.0, 200e3, 10_000.0, 0.0);
        let orbit =
            KeplerianElements::from_launch(earth_mu(), EARTH_RADIUS, &state, 100.0).unwrap();

        assert_relative_eq!(orbit.periapsis(), EARTH_RADIUS + 200e3, max_relative = 1e-12);
        assert!(orbit.apoapsis() > orbit.periapsis());
        assert_abs_diff_eq!(orbit.arg_periapsis(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(orbit.time_of_periapsis(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_launch_geometry() {
        // Due north from the equator gives a polar orbit with the node at the launch site
        let orbit = KeplerianElements::from_launch(
            earth_mu(),
            EARTH_RADIUS,
            &launch(0.0, 0.0, 500e3, 7612.0, 0.0),
            0.0,
        )
        .unwrap();
        assert_relative_eq!(orbit.inclination(), FRAC_PI_2, max_relative = 1e-12);
        assert_abs_diff_eq!(orbit.long_asc_node(), 0.0, epsilon = 1e-12);

        // Due east from 30 degrees north: the launch site is the northernmost point,
        // so the inclination equals the latitude and the node is a quarter turn west
        let latitude = 30.0_f64.to_radians();
        let mut state = launch(FRAC_PI_2, latitude, 300e3, 7700.0, 0.0);
        state.longitude = 1.0;
        let orbit = KeplerianElements::from_launch(earth_mu(), EARTH_RADIUS, &state, 0.0).unwrap();
        assert_relative_eq!(orbit.inclination(), latitude, max_relative = 1e-12);
        assert!(angular_distance(orbit.long_asc_node(), 1.0 - FRAC_PI_2) < 1e-12);

        // The launch site must lie on the orbit: rotating the radial direction
        // at the launch true anomaly into the equatorial frame lands on it.
        let nu = wrap_two_pi(FRAC_PI_2 - orbit.arg_periapsis());
        let direction = orbit.rotation() * nalgebra::Vector3::new(nu.cos(), nu.sin(), 0.0);
        let expected = nalgebra::Vector3::new(
            latitude.cos() * 1.0_f64.cos(),
            latitude.cos() * 1.0_f64.sin(),
            latitude.sin(),
        );
        assert_relative_eq!(direction, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_escape_velocity_is_rejected() {
        let r = EARTH_RADIUS + 200e3;
        let escape = (2.0 * earth_mu() / r).sqrt();
        let result = KeplerianElements::from_launch(
            earth_mu(),
            EARTH_RADIUS,
            &launch(FRAC_PI_2, 0.0, 200e3, escape * 1.01, 0.0),
            0.0,
        );
        assert!(matches!(result, Err(OrbitError::HyperbolicOrbit { .. })));
    }

    #[test]
    fn test_radial_launch_is_degenerate() {
        let result = KeplerianElements::from_launch(
            earth_mu(),
            EARTH_RADIUS,
            &launch(FRAC_PI_2, 0.0, 200e3, 5000.0, FRAC_PI_2),
            0.0,
        );
        assert!(matches!(result, Err(OrbitError::DegenerateOrbit { .. })));
    }

    #[test]
    fn test_non_finite_inputs_are_rejected() {
        let result = KeplerianElements::from_launch(
            earth_mu(),
            EARTH_RADIUS,
            &launch(f64::NAN, 0.0, 200e3, 7000.0, 0.0),
            0.0,
        );
        assert_eq!(result, Err(OrbitError::NonFiniteInput));
    }

    #[test]
    fn test_direct_constructor() {
        let orbit = KeplerianElements::new(earth_mu(), 0.6, 10e6, -0.5, 0.3, 7.0, 42.0).unwrap();
        assert_relative_eq!(orbit.periapsis(), 4e6, max_relative = 1e-15);
        assert_relative_eq!(orbit.apoapsis(), 16e6, max_relative = 1e-15);
        assert_relative_eq!(orbit.semilatus_rectum(), 6.4e6, max_relative = 1e-15);
        assert_relative_eq!(orbit.arg_periapsis(), TAU - 0.5, max_relative = 1e-15);
        assert_relative_eq!(orbit.long_asc_node(), 7.0 - TAU, max_relative = 1e-14);
        assert_relative_eq!(orbit.mean_motion() * orbit.period(), TAU, max_relative = 1e-15);

        assert!(KeplerianElements::new(earth_mu(), 1.0, 10e6, 0.0, 0.0, 0.0, 0.0).is_err());
        assert!(KeplerianElements::new(earth_mu(), 0.1, -1.0, 0.0, 0.0, 0.0, 0.0).is_err());
    }
}
