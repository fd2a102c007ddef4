use kiss3d::camera::Camera;
use kiss3d::renderer::Renderer;
use nalgebra::{Matrix4, Point3};

use self::marker_renderer::MarkerRenderer;
use self::orbit_renderer::OrbitRenderer;
use self::sphere_renderer::SphereRenderer;
use crate::astro::OrbitMesh;
use crate::model::IconShape;

mod marker_renderer;
mod orbit_renderer;
mod sphere_renderer;

/// Everything kiss3d's scene graph doesn't draw for us: trajectories,
/// atmosphere halos and icons.
pub struct CompoundRenderer {
    sphere_renderer: SphereRenderer,
    orbit_renderer: OrbitRenderer,
    marker_renderer: MarkerRenderer,
}

impl CompoundRenderer {
    pub fn new() -> Self {
        CompoundRenderer {
            sphere_renderer: SphereRenderer::new(),
            orbit_renderer: OrbitRenderer::new(),
            marker_renderer: MarkerRenderer::new(),
        }
    }

    pub fn draw_atmosphere(&mut self, center: Point3<f32>, radius: f32, color: Point3<f32>) {
        self.sphere_renderer.add_halo(center, radius, color);
    }

    pub fn draw_orbit(&mut self, key: &str, mesh: &OrbitMesh, transform: Matrix4<f32>) {
        self.orbit_renderer.add_orbit(key, mesh, transform);
    }

    pub fn draw_marker(
        &mut self,
        shape: IconShape,
        center: Point3<f32>,
        height: f32,
        color: Point3<f32>,
    ) {
        self.marker_renderer.add_marker(shape, center, height, color);
    }
}

impl Renderer for CompoundRenderer {
    fn render(&mut self, pass: usize, camera: &mut dyn Camera) {
        self.sphere_renderer.render(pass, camera);
        self.orbit_renderer.render(pass, camera);
        self.marker_renderer.render(pass, camera);
    }
}
