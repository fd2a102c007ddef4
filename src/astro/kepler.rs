use nalgebra::{Point3, Vector3};

use crate::error::OrbitError;
use crate::math::angle::wrap_two_pi;
use crate::math::anomaly::{eccentric_to_true, solve_kepler, KEPLER_ITERATIONS};
use crate::math::frame::Transform;

use super::KeplerianElements;

/// Largest |E - e sin E - M| we accept from the Kepler solver.
pub const KEPLER_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anomalies {
    pub mean: f64,
    pub eccentric: f64,
    pub true_anomaly: f64,
}

/// Where a satellite is along its orbit at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicState {
    pub time: f64,
    pub anomalies: Anomalies,
    pub radius: f64,
    pub speed: f64,
    pub flight_path_angle: f64,
    pub position_perifocal: Vector3<f64>,
    pub position_world: Point3<f64>,
}

/// Position in the perifocal frame at true anomaly `theta` and distance `r`.
pub fn perifocal(theta: f64, r: f64) -> Vector3<f64> {
    let (sin, cos) = theta.sin_cos();
    Vector3::new(r * cos, r * sin, 0.0)
}

impl KeplerianElements {
    pub fn mean_anomaly_at_time(&self, time: f64) -> f64 {
        wrap_two_pi(self.mean_motion() * (time - self.time_of_periapsis()))
    }

    /// Solves for all three anomalies at the given simulation time.
    pub fn anomalies_at_time(&self, time: f64) -> Result<Anomalies, OrbitError> {
        if !time.is_finite() {
            return Err(OrbitError::NonFiniteInput);
        }

        let mean = self.mean_anomaly_at_time(time);
        let ecc = self.eccentricity();
        let solution = solve_kepler(mean, ecc, KEPLER_ITERATIONS);
        if !(solution.residual <= KEPLER_TOLERANCE) {
            return Err(OrbitError::NumericNonConvergence {
                mean_anomaly: mean,
                eccentricity: ecc,
                residual: solution.residual,
            });
        }

        Ok(Anomalies {
            mean,
            eccentric: solution.eccentric_anomaly,
            true_anomaly: eccentric_to_true(solution.eccentric_anomaly, ecc),
        })
    }

    pub fn radius_at(&self, theta: f64) -> f64 {
        self.semilatus_rectum() / (1.0 + self.eccentricity() * theta.cos())
    }

    /// Speed from the vis-viva equation.
    pub fn speed_at(&self, theta: f64) -> f64 {
        let r = self.radius_at(theta);
        (self.mu() * (2.0 / r - 1.0 / self.semi_major_axis())).sqrt()
    }

    /// Angle between the velocity and the local horizontal. Positive while
    /// climbing from periapsis to apoapsis.
    pub fn flight_path_angle_at(&self, theta: f64) -> f64 {
        let ecc = self.eccentricity();
        (ecc * theta.sin() / (1.0 + ecc * theta.cos())).atan()
    }

    /// Position relative to the parent's center, in the parent's equatorial
    /// frame.
    pub fn position_at(&self, theta: f64) -> Vector3<f64> {
        self.rotation() * perifocal(theta, self.radius_at(theta))
    }

    /// Full state at `time`. `frame` carries the equatorial frame into world
    /// space: the parent's position plus whatever orientation the orbit was
    /// anchored with.
    pub fn state_at_time(
        &self,
        time: f64,
        frame: &Transform<f64>,
    ) -> Result<DynamicState, OrbitError> {
        let anomalies = self.anomalies_at_time(time)?;
        let theta = anomalies.true_anomaly;
        let radius = self.radius_at(theta);
        let position_perifocal = perifocal(theta, radius);
        let local = Point3::from(self.rotation() * position_perifocal);

        Ok(DynamicState {
            time,
            anomalies,
            radius,
            speed: self.speed_at(theta),
            flight_path_angle: self.flight_path_angle_at(theta),
            position_perifocal,
            position_world: frame.transform_point(&local),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::UnitQuaternion;

    use super::*;
    use crate::astro::{LaunchState, NEWTON_G};
    use crate::consts::{EARTH_MASS, EARTH_RADIUS};
    use crate::math::angle::angular_distance;

    fn orbit_from_speed(speed: f64, time: f64) -> KeplerianElements {
        let launch = LaunchState {
            longitude: 0.3,
            latitude: 0.2,
            azimuth: 1.1,
            altitude: 200e3,
            speed,
            flight_path_angle: 0.05,
        };
        KeplerianElements::from_launch(NEWTON_G * EARTH_MASS, EARTH_RADIUS, &launch, time)
            .unwrap()
    }

    #[test]
    fn test_launch_radius_is_reproduced() {
        for speed in [7000.0, 7784.34, 8500.0, 10_000.0].iter() {
            let launch = LaunchState {
                longitude: 0.0,
                latitude: 0.0,
                azimuth: FRAC_PI_2,
                altitude: 200e3,
                speed: *speed,
                flight_path_angle: 0.1,
            };
            let orbit =
                KeplerianElements::from_launch(NEWTON_G * EARTH_MASS, EARTH_RADIUS, &launch, 0.0)
                    .unwrap();

            // At the launch time, the orbit puts us back at the launch radius
            // and flight path angle
            let anomalies = orbit.anomalies_at_time(0.0).unwrap();
            let r = EARTH_RADIUS + 200e3;
            assert_relative_eq!(orbit.radius_at(anomalies.true_anomaly), r, max_relative = 1e-9);
            assert_relative_eq!(
                orbit.flight_path_angle_at(anomalies.true_anomaly),
                0.1,
                max_relative = 1e-9
            );
            assert_relative_eq!(
                orbit.speed_at(anomalies.true_anomaly),
                *speed,
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn test_periapsis_recurs_every_period() {
        for speed in [7784.34, 9000.0, 10_000.0].iter() {
            let orbit = orbit_from_speed(*speed, 123.0);
            for k in -3..=10 {
                let t = orbit.time_of_periapsis() + k as f64 * orbit.period();
                let theta = orbit.anomalies_at_time(t).unwrap().true_anomaly;
                assert!(
                    angular_distance(theta, 0.0) < 1e-10,
                    "v = {}, k = {}: theta = {}",
                    speed,
                    k,
                    theta
                );
            }
        }
    }

    #[test]
    fn test_half_period_is_apoapsis() {
        let orbit = orbit_from_speed(10_000.0, 0.0);
        let t = orbit.time_of_periapsis() + 2.5 * orbit.period();
        let state = orbit.state_at_time(t, &Transform::identity()).unwrap();

        assert!(angular_distance(state.anomalies.true_anomaly, PI) < 1e-9);
        assert_relative_eq!(state.radius, orbit.apoapsis(), max_relative = 1e-12);
        assert_abs_diff_eq!(state.flight_path_angle, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(state.position_perifocal.z, 0.0);
    }

    #[test]
    fn test_period_matches_integrated_motion() {
        // dt = r dtheta / (v cos gamma), since v cos gamma is the transverse speed
        for speed in [7784.34, 9000.0, 10_000.0].iter() {
            let orbit = orbit_from_speed(*speed, 0.0);
            let dt_dtheta = |theta: f64| {
                orbit.radius_at(theta)
                    / (orbit.speed_at(theta) * orbit.flight_path_angle_at(theta).cos())
            };

            // Simpson's rule over one revolution
            let n = 20_000;
            let h = TAU / n as f64;
            let mut total = dt_dtheta(0.0) + dt_dtheta(TAU);
            for j in 1..n {
                let weight = if j % 2 == 1 { 4.0 } else { 2.0 };
                total += weight * dt_dtheta(j as f64 * h);
            }
            let integrated = total * h / 3.0;

            assert_relative_eq!(integrated, orbit.period(), max_relative = 1e-6);
        }
    }

    #[test]
    fn test_world_position_uses_frame() {
        let orbit = orbit_from_speed(8000.0, 0.0);
        let frame = Transform::from_pose(
            Vector3::new(1e9, -2e9, 3e8),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.4),
        );

        let state = orbit.state_at_time(1000.0, &frame).unwrap();
        let local = orbit.position_at(state.anomalies.true_anomaly);
        let expected = Point3::from(frame.translation()) + frame.rotation() * local;
        assert_relative_eq!(state.position_world, expected, max_relative = 1e-12);
        assert_relative_eq!(
            (state.position_world - Point3::from(frame.translation())).norm(),
            state.radius,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_non_finite_time_is_rejected() {
        let orbit = orbit_from_speed(8000.0, 0.0);
        assert_eq!(
            orbit.anomalies_at_time(f64::INFINITY),
            Err(OrbitError::NonFiniteInput)
        );
    }
}
