use std::f64::consts::TAU;

use nalgebra::{Rotation3, Vector3};

/// Wraps an angle into [0, 2pi).
///
/// Negative inputs are shifted up by a full turn, so the output is always
/// non-negative.
pub fn wrap_two_pi(angle: f64) -> f64 {
    let wrapped = angle % TAU;
    let wrapped = if wrapped < 0.0 { wrapped + TAU } else { wrapped };

    // Adding TAU to a tiny negative number can round up to exactly TAU
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Smallest unsigned distance between two angles, taking the wrap at 2pi
/// into account. Always in [0, pi].
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = wrap_two_pi(a - b);
    d.min(TAU - d)
}

/// Returns the rotation that carries the perifocal frame (x towards periapsis,
/// z along the angular momentum) into the parent's equatorial frame.
///
/// The order is R_z(lan) * R_x(incl) * R_z(argp): the orbit is first turned
/// in its own plane until the periapsis is `argp` past the node line, then
/// tilted about the node line, then swung around the pole.
pub fn perifocal_to_world(lan: f64, incl: f64, argp: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), lan)
        * Rotation3::from_axis_angle(&Vector3::x_axis(), incl)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), argp)
}

/// Returns the angle between u and v, measured as a positive angle around
/// `up`. In [0, 2pi).
pub fn directed_angle(u: &Vector3<f64>, v: &Vector3<f64>, up: &Vector3<f64>) -> f64 {
    let theta = u.angle(v);
    if u.cross(v).dot(up) >= 0.0 {
        theta
    } else {
        wrap_two_pi(TAU - theta)
    }
}
