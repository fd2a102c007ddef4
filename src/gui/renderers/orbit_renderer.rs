use std::collections::HashMap;

use kiss3d::camera::Camera;
use kiss3d::context::Context;
use kiss3d::renderer::Renderer;
use kiss3d::resource::{
    AllocationType, BufferType, Effect, GPUVec, ShaderAttribute, ShaderUniform,
};
use nalgebra::{Matrix4, Point3};

use crate::astro::OrbitMesh;

struct CachedOrbit {
    // Trajectory, stored as (pt, color, pt, color), relative to the parent
    orbit_lines: GPUVec<Point3<f32>>,
    // Used to spot a mesh that was replaced under the same key
    first_vertex: Point3<f64>,
    vertex_count: usize,
    // Model matrix for this frame, or None if it wasn't drawn
    transform: Option<Matrix4<f32>>,
}

/// Draws trajectory polylines. The vertex data for each satellite is uploaded
/// once and kept until the satellite stops being drawn.
pub struct OrbitRenderer {
    // OpenGL stuff
    shader: Effect,
    pos: ShaderAttribute<Point3<f32>>,
    color: ShaderAttribute<Point3<f32>>,
    model: ShaderUniform<Matrix4<f32>>,
    view: ShaderUniform<Matrix4<f32>>,
    proj: ShaderUniform<Matrix4<f32>>,
    line_width: f32,
    // Data storage
    orbits: HashMap<String, CachedOrbit>,
}

impl OrbitRenderer {
    pub fn new() -> Self {
        let mut shader = Effect::new_from_str(VERTEX_SRC, FRAGMENT_SRC);

        shader.use_program();

        OrbitRenderer {
            pos: shader
                .get_attrib::<Point3<f32>>("position")
                .expect("Failed to get shader attribute."),
            color: shader
                .get_attrib::<Point3<f32>>("color")
                .expect("Failed to get shader attribute."),
            model: shader
                .get_uniform::<Matrix4<f32>>("model")
                .expect("Failed to get shader uniform."),
            view: shader
                .get_uniform::<Matrix4<f32>>("view")
                .expect("Failed to get shader uniform."),
            proj: shader
                .get_uniform::<Matrix4<f32>>("proj")
                .expect("Failed to get shader uniform."),
            shader,
            line_width: 1.0,
            orbits: HashMap::new(),
        }
    }

    /// Queues `mesh` for this frame. `transform` takes the mesh from its
    /// parent's space into camera focus space.
    pub fn add_orbit(&mut self, key: &str, mesh: &OrbitMesh, transform: Matrix4<f32>) {
        let first_vertex = match mesh.vertices().first() {
            Some(v) => v.position,
            None => return,
        };
        let vertex_count = mesh.vertices().len();

        let stale = match self.orbits.get(key) {
            Some(cached) => {
                cached.first_vertex != first_vertex || cached.vertex_count != vertex_count
            }
            None => true,
        };
        if stale {
            log::trace!("Uploading trajectory for {}", key);
            self.orbits.insert(
                key.to_owned(),
                CachedOrbit {
                    orbit_lines: Self::upload_mesh(mesh),
                    first_vertex,
                    vertex_count,
                    transform: None,
                },
            );
        }

        if let Some(cached) = self.orbits.get_mut(key) {
            cached.transform = Some(transform);
        }
    }

    fn upload_mesh(mesh: &OrbitMesh) -> GPUVec<Point3<f32>> {
        let mut data: Vec<Point3<f32>> = Vec::with_capacity(4 * mesh.segments());
        for (start, end) in mesh.line_segments() {
            data.push(nalgebra::convert(start.position));
            data.push(Point3::new(start.colour.x, start.colour.y, start.colour.z));
            data.push(nalgebra::convert(end.position));
            data.push(Point3::new(end.colour.x, end.colour.y, end.colour.z));
        }
        GPUVec::new(data, BufferType::Array, AllocationType::StaticDraw)
    }
}

impl Renderer for OrbitRenderer {
    fn render(&mut self, pass: usize, camera: &mut dyn Camera) {
        // Anything not drawn this frame has been removed or hidden
        self.orbits.retain(|_, orbit| orbit.transform.is_some());
        if self.orbits.is_empty() {
            return;
        }

        self.shader.use_program();
        self.pos.enable();
        self.color.enable();

        camera.upload(pass, &mut self.proj, &mut self.view);

        for orbit in self.orbits.values_mut() {
            let transform = match orbit.transform.take() {
                Some(t) => t,
                None => continue,
            };
            self.pos.bind_sub_buffer(&mut orbit.orbit_lines, 1, 0);
            self.color.bind_sub_buffer(&mut orbit.orbit_lines, 1, 1);

            self.model.upload(&transform);

            let ctxt = Context::get();
            ctxt.draw_arrays(Context::LINES, 0, (orbit.orbit_lines.len() / 2) as i32);
            ctxt.line_width(self.line_width);
        }

        self.pos.disable();
        self.color.disable();
    }
}

static VERTEX_SRC: &str = "#version 100
    attribute vec3 position;
    attribute vec3 color;
    varying   vec3 vColor;
    uniform   mat4 model;
    uniform   mat4 proj;
    uniform   mat4 view;
    void main() {
        gl_Position = proj * view * model * vec4(position, 1.0);
        vColor = color;
    }";

static FRAGMENT_SRC: &str = "#version 100
#ifdef GL_FRAGMENT_PRECISION_HIGH
   precision highp float;
#else
   precision mediump float;
#endif

    varying vec3 vColor;
    void main() {
        gl_FragColor = vec4(vColor, 1.0);
    }";
