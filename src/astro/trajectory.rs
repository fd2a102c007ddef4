use std::f64::consts::TAU;

use nalgebra::{Point3, Vector4};

use crate::math::angle::perifocal_to_world;

use super::perifocal;

/// RGBA, each channel in [0, 1].
pub type Colour = Vector4<f32>;

pub const DEFAULT_ORBIT_SEGMENTS: usize = 1024;
const MIN_ORBIT_SEGMENTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitSample {
    /// Relative to the parent's center, in the parent's equatorial frame
    pub position: Point3<f64>,
    pub colour: Colour,
}

/// A closed polyline tracing one revolution of an orbit.
///
/// There are `segments + 1` vertices; the last one is a copy of the first, so
/// drawing the indices as a line strip closes the loop. Each satellite owns
/// exactly one of these for its whole lifetime, so it is not `Clone`.
#[derive(Debug)]
pub struct OrbitMesh {
    vertices: Vec<OrbitSample>,
    indices: Vec<u32>,
}

impl OrbitMesh {
    pub fn vertices(&self) -> &[OrbitSample] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn segments(&self) -> usize {
        self.vertices.len() - 1
    }

    /// Consecutive vertex pairs, in index order.
    pub fn line_segments(&self) -> impl Iterator<Item = (&OrbitSample, &OrbitSample)> + '_ {
        self.indices
            .windows(2)
            .map(move |w| (&self.vertices[w[0] as usize], &self.vertices[w[1] as usize]))
    }
}

/// Samples the orbit at evenly spaced true anomalies. Fewer than three
/// segments is bumped up to three.
pub fn generate_orbit_polyline(
    segments: usize,
    ecc: f64,
    a: f64,
    argp: f64,
    incl: f64,
    lan: f64,
    colour: Colour,
) -> OrbitMesh {
    let segments = segments.max(MIN_ORBIT_SEGMENTS);
    let rotation = perifocal_to_world(lan, incl, argp);
    let p = a * (1.0 - ecc * ecc);

    let mut vertices = Vec::with_capacity(segments + 1);
    for k in 0..segments {
        let theta = TAU * k as f64 / segments as f64;
        let r = p / (1.0 + ecc * theta.cos());
        vertices.push(OrbitSample {
            position: Point3::from(rotation * perifocal(theta, r)),
            colour,
        });
    }
    // Close the loop with an exact copy rather than re-evaluating at 2pi
    vertices.push(vertices[0]);

    let indices = (0..=segments as u32).collect();
    OrbitMesh { vertices, indices }
}

/// The shade trajectories are drawn in: a bit darker than the icon.
pub fn darker_shade(colour: &Colour) -> Colour {
    Vector4::new(colour.x * 0.8, colour.y * 0.8, colour.z * 0.8, colour.w)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_polyline_is_closed() {
        let mesh = generate_orbit_polyline(1024, 0.3, 1e7, 0.4, 0.2, 1.0, Colour::repeat(1.0));
        assert_eq!(mesh.vertices().len(), 1025);
        assert_eq!(mesh.indices().len(), 1025);
        assert_eq!(mesh.segments(), 1024);
        assert_eq!(mesh.vertices()[0], mesh.vertices()[1024]);
        assert_eq!(mesh.line_segments().count(), 1024);
    }

    #[test]
    fn test_vertices_are_on_the_orbit() {
        let (ecc, a) = (0.6, 2e7);
        let mesh = generate_orbit_polyline(64, ecc, a, 1.0, 0.5, 2.0, Colour::repeat(1.0));

        // Vertex 0 is periapsis, the middle vertex apoapsis
        assert_relative_eq!(
            mesh.vertices()[0].position.coords.norm(),
            a * (1.0 - ecc),
            max_relative = 1e-12
        );
        assert_relative_eq!(
            mesh.vertices()[32].position.coords.norm(),
            a * (1.0 + ecc),
            max_relative = 1e-12
        );

        // Everything lies in the plane given by the rotated z axis
        let normal = perifocal_to_world(2.0, 0.5, 1.0) * nalgebra::Vector3::z();
        for v in mesh.vertices() {
            assert!(v.position.coords.dot(&normal).abs() < 1e-6 * a);
        }
    }

    #[test]
    fn test_circular_chord_error() {
        let a = 6.571e6;
        let mesh = generate_orbit_polyline(
            DEFAULT_ORBIT_SEGMENTS,
            0.0,
            a,
            0.0,
            0.0,
            0.0,
            Colour::repeat(1.0),
        );
        for (p, q) in mesh.line_segments() {
            let midpoint = nalgebra::center(&p.position, &q.position);
            let error = (a - midpoint.coords.norm()) / a;
            assert!(error < 0.004);
        }
        // Equatorial orbit with no rotation starts on +x
        assert_relative_eq!(
            mesh.vertices()[0].position,
            Point3::new(a, 0.0, 0.0),
            max_relative = 1e-12
        );
        assert_relative_eq!(
            mesh.vertices()[DEFAULT_ORBIT_SEGMENTS / 4]
                .position
                .coords
                .angle(&nalgebra::Vector3::x()),
            PI / 2.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_degenerate_segment_count() {
        let mesh = generate_orbit_polyline(0, 0.1, 1e7, 0.0, 0.0, 0.0, Colour::repeat(1.0));
        assert_eq!(mesh.segments(), MIN_ORBIT_SEGMENTS);
    }

    #[test]
    fn test_darker_shade() {
        let shade = darker_shade(&Vector4::new(1.0, 0.5, 0.0, 1.0));
        assert_relative_eq!(shade, Vector4::new(0.8, 0.4, 0.0, 1.0), epsilon = 1e-6);
    }
}
