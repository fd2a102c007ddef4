use kiss3d::camera::Camera;
use kiss3d::renderer::{LineRenderer, Renderer};
use nalgebra::{Point3, Vector3};

const HALO_SEGMENTS: usize = 100;

struct HaloData {
    center: Point3<f32>,
    radius: f32,
    color: Point3<f32>,
}

/// Outlines a sphere with a circle that always faces the camera. Used for
/// atmospheres, which would hide the body if drawn solid.
pub struct SphereRenderer {
    line_renderer: LineRenderer,
    halos: Vec<HaloData>,
}

impl SphereRenderer {
    pub fn new() -> Self {
        SphereRenderer {
            line_renderer: LineRenderer::new(),
            halos: vec![],
        }
    }

    pub fn add_halo(&mut self, center: Point3<f32>, radius: f32, color: Point3<f32>) {
        self.halos.push(HaloData {
            center,
            radius,
            color,
        });
    }

    fn load_halo_into_renderer(
        line_renderer: &mut LineRenderer,
        camera: &dyn Camera,
        halo: &HaloData,
    ) {
        // Screen x and y, in focus space
        let camera_transform = camera.view_transform().inverse();
        let x_vec = camera_transform.transform_vector(&Vector3::x()).normalize();
        let y_vec = camera_transform.transform_vector(&Vector3::y()).normalize();

        let point_at = |i: usize| {
            let theta = std::f32::consts::TAU * i as f32 / HALO_SEGMENTS as f32;
            halo.center + halo.radius * (x_vec * theta.cos() + y_vec * theta.sin())
        };
        for i in 0..HALO_SEGMENTS {
            line_renderer.draw_line(point_at(i), point_at(i + 1), halo.color);
        }
    }
}

impl Renderer for SphereRenderer {
    fn render(&mut self, pass: usize, camera: &mut dyn Camera) {
        for halo in self.halos.iter() {
            SphereRenderer::load_halo_into_renderer(&mut self.line_renderer, camera, halo);
        }
        self.line_renderer.render(pass, camera);
        self.halos.clear();
    }
}
