//! Conversions between the mean, eccentric and true anomalies of an
//! elliptical orbit. Every output is wrapped into [0, 2pi).

use crate::math::angle::wrap_two_pi;
use crate::math::root_finding::halley;

/// Number of Halley updates allowed when solving Kepler's equation. Far more
/// than needed: for e < 0.95 the guess settles in well under ten.
pub const KEPLER_ITERATIONS: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct KeplerSolution {
    pub eccentric_anomaly: f64,
    pub iterations: usize,
    /// |E - e sin E - M| at the returned E (before wrapping)
    pub residual: f64,
}

/// Solves Kepler's equation E - e sin E = M for E.
///
/// Starts from E = M + e sin M and applies Halley's method for at most
/// `max_iterations` steps.
pub fn solve_kepler(mean_anomaly: f64, e: f64, max_iterations: usize) -> KeplerSolution {
    debug_assert!((0.0..1.0).contains(&e), "eccentricity {} is not elliptic", e);

    let kepler = |x: f64| {
        let (sin_x, cos_x) = x.sin_cos();
        (x - e * sin_x - mean_anomaly, 1.0 - e * cos_x, e * sin_x)
    };

    let initial_guess = mean_anomaly + e * mean_anomaly.sin();
    let result = halley(kepler, initial_guess, max_iterations);
    let residual = kepler(result.root).0.abs();

    KeplerSolution {
        eccentric_anomaly: wrap_two_pi(result.root),
        iterations: result.iterations,
        residual,
    }
}

pub fn mean_to_eccentric(mean_anomaly: f64, e: f64) -> f64 {
    solve_kepler(wrap_two_pi(mean_anomaly), e, KEPLER_ITERATIONS).eccentric_anomaly
}

pub fn eccentric_to_mean(eccentric_anomaly: f64, e: f64) -> f64 {
    wrap_two_pi(eccentric_anomaly - e * eccentric_anomaly.sin())
}

pub fn eccentric_to_true(eccentric_anomaly: f64, e: f64) -> f64 {
    // tan(theta/2) = sqrt((1+e)/(1-e)) tan(E/2)
    // Near E = pi the tangent blows up, but atan folds it back to +-pi/2,
    // and the wrap takes care of the sign.
    let tan_half_theta = ((1.0 + e) / (1.0 - e)).sqrt() * (eccentric_anomaly / 2.0).tan();
    wrap_two_pi(2.0 * tan_half_theta.atan())
}

pub fn true_to_eccentric(true_anomaly: f64, e: f64) -> f64 {
    // atan2 keeps us in the right quadrant, unlike the half-angle formula
    let (sin_theta, cos_theta) = true_anomaly.sin_cos();
    wrap_two_pi(((1.0 - e * e).sqrt() * sin_theta).atan2(e + cos_theta))
}

pub fn mean_to_true(mean_anomaly: f64, e: f64) -> f64 {
    eccentric_to_true(mean_to_eccentric(mean_anomaly, e), e)
}

pub fn true_to_mean(true_anomaly: f64, e: f64) -> f64 {
    eccentric_to_mean(true_to_eccentric(true_anomaly, e), e)
}
