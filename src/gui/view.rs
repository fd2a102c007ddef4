use std::collections::HashMap;

use kiss3d::camera::Camera;
use kiss3d::light::Light;
use kiss3d::planar_camera::PlanarCamera;
use kiss3d::post_processing::PostProcessingEffect;
use kiss3d::renderer::Renderer;
use kiss3d::scene::SceneNode;
use kiss3d::text::Font;
use kiss3d::window::Window;
use nalgebra::{Point2, Point3, Translation3, UnitQuaternion, Vector2};

use super::camera::OrbitCamera;
use super::controller::{Controller, KEY_HELP};
use super::renderers::CompoundRenderer;
use crate::astro::{Colour, OrbitMesh};
use crate::math::frame::Transform;
use crate::model::{BodyId, IconShape, ParentBody, SceneRenderer, SimInfo, Simulation};

// These sizes are in pixels
const MARKER_SIZE: f32 = 18.0;
const FONT_SIZE: f32 = 60.0;
const RIGHT_PANEL_WIDTH: f32 = 600.0;
const LABEL_OFFSET: f32 = 24.0;

const TEXT_COLOR: [f32; 3] = [1.0, 1.0, 1.0];
const STATUS_COLOR: [f32; 3] = [1.0, 0.5, 0.3];

struct Label {
    position: Point3<f32>,
    text: String,
    color: Point3<f32>,
}

/// Draws a [Simulation] with kiss3d. Bodies are scene nodes; trajectories and
/// icons go through a [CompoundRenderer].
///
/// Everything is drawn relative to the first body, so the f32 coordinates
/// the GPU sees stay small near it.
pub struct View {
    body_spheres: HashMap<BodyId, SceneNode>,
    light_sphere: Option<SceneNode>,
    focus: Point3<f64>,
    camera: OrbitCamera,
    renderer: CompoundRenderer,
    labels: Vec<Label>,
    status: Option<String>,
}

impl View {
    pub fn new(simulation: &Simulation, window: &mut Window) -> Self {
        let focus = Self::focus_of(simulation);

        // Create objects for bodies
        let mut body_spheres = HashMap::new();
        for (id, body) in simulation.bodies().iter() {
            body_spheres.insert(id, Self::create_body_object(window, body));
        }

        let light_sphere = simulation.light().map(|light| {
            let position: Point3<f32> = nalgebra::convert(light.position - focus.coords);
            window.set_light(Light::Absolute(position));

            let mut sphere = window.add_sphere(light.radius as f32);
            sphere.set_color(light.colour.x, light.colour.y, light.colour.z);
            sphere.set_local_translation(Translation3::from(position.coords));
            sphere
        });

        let mut camera = OrbitCamera::new();
        if let Some((_, body)) = simulation.bodies().iter().next() {
            camera.frame_body(body.radius() as f32);
        }

        Self {
            body_spheres,
            light_sphere,
            focus,
            camera,
            renderer: CompoundRenderer::new(),
            labels: vec![],
            status: None,
        }
    }

    fn focus_of(simulation: &Simulation) -> Point3<f64> {
        simulation
            .bodies()
            .get(BodyId(0))
            .map_or_else(Point3::origin, ParentBody::position)
    }

    fn create_body_object(window: &mut Window, body: &ParentBody) -> SceneNode {
        let mut sphere = window.add_sphere(body.radius() as f32);
        let color = body.colour();
        sphere.set_color(color.x, color.y, color.z);
        sphere
    }

    fn to_focus_space(&self, position: &Point3<f64>) -> Point3<f32> {
        nalgebra::convert(position - self.focus.coords)
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
    }

    /// Shows `message` at the bottom of the screen until the next one.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    // the big boy
    pub fn prerender_scene(
        &mut self,
        window: &mut Window,
        simulation: &Simulation,
        controller: &Controller,
    ) {
        self.focus = Self::focus_of(simulation);
        if let (Some(sphere), Some(light)) = (self.light_sphere.as_mut(), simulation.light()) {
            let position: Point3<f32> = nalgebra::convert(light.position - self.focus.coords);
            sphere.set_local_translation(Translation3::from(position.coords));
        }

        simulation.render(self);

        let font = Font::default();
        let text_color = Point3::from(TEXT_COLOR);
        let (width, height) = (self.camera.width() as f32, self.camera.height() as f32);
        for label in self.labels.drain(..) {
            // Projected coordinates have their origin at the bottom left
            let screen = self.camera.project(&label.position, &Vector2::new(width, height));
            window.draw_text(
                &label.text,
                &Point2::new(screen.x + LABEL_OFFSET, height - screen.y),
                FONT_SIZE * 0.6,
                &font,
                &label.color,
            );
        }

        window.draw_text(
            &Self::satellite_text(simulation),
            &Point2::origin(),
            FONT_SIZE,
            &font,
            &text_color,
        );
        window.draw_text(
            &Self::sim_info_text(&simulation.info(), controller),
            &Point2::new(width - RIGHT_PANEL_WIDTH, 0.0),
            FONT_SIZE,
            &font,
            &text_color,
        );

        let mut footer = String::from(KEY_HELP);
        if let Some(status) = &self.status {
            footer = format!("{}\n{}", status, footer);
        }
        let footer_lines = footer.lines().count() as f32;
        window.draw_text(
            &footer,
            &Point2::new(0.0, height - footer_lines * FONT_SIZE * 0.6),
            FONT_SIZE * 0.5,
            &font,
            &Point3::from(STATUS_COLOR),
        );
    }

    fn satellite_text(simulation: &Simulation) -> String {
        let satellite = match simulation.selected() {
            Some(s) => s,
            None => {
                return format!(
                    "No satellite selected\n{} in orbit",
                    simulation.satellites().len()
                )
            }
        };
        let info = satellite.info();
        let parent = simulation.bodies()[satellite.parent()].name();

        // Indentation is intentional
        format!(
            "{}{}
Orbiting: {}
    Altitude: {:.1} km
    Speed: {:.1} m/s
    Flight path angle: {:.2}
    Apoapsis: {:.1} km
    Periapsis: {:.1} km
    Period: {}
Elements:
    SMA: {:.0}
    Eccentricity: {:.5}
    Inclination: {:.3}
    LAN: {:.1}
    Arg PE: {:.1}",
            info.name,
            if info.hidden { " (hidden)" } else { "" },
            parent,
            info.altitude / 1000.0,
            info.velocity,
            info.flight_path_angle.to_degrees(),
            info.apoapsis / 1000.0,
            info.periapsis / 1000.0,
            format_seconds(info.period),
            info.semi_major_axis,
            info.eccentricity,
            info.inclination.to_degrees(),
            info.long_asc_node.to_degrees(),
            info.arg_periapsis.to_degrees(),
        )
    }

    fn sim_info_text(info: &SimInfo, controller: &Controller) -> String {
        format!(
            "Sim rate: {}x{}
Sim time: {}
Delta T: {} s
Run time: {}
FPS: {:.0} (avg {:.0})",
            info.sim_rate,
            if info.paused { " (paused)" } else { "" },
            format_seconds(info.sim_time),
            info.delta_time,
            format_seconds(info.run_time),
            controller.fps(),
            controller.average_fps(),
        )
    }

    pub fn cameras_and_effect_and_renderer(
        &mut self,
    ) -> (
        Option<&mut dyn Camera>,
        Option<&mut dyn PlanarCamera>,
        Option<&mut dyn Renderer>,
        Option<&mut dyn PostProcessingEffect>,
    ) {
        (Some(&mut self.camera), None, Some(&mut self.renderer), None)
    }
}

impl SceneRenderer for View {
    fn draw_body(&mut self, id: BodyId, body: &ParentBody) {
        let center = self.to_focus_space(&body.position());
        if let Some(sphere) = self.body_spheres.get_mut(&id) {
            let rotation: UnitQuaternion<f32> = nalgebra::convert(body.rotation());
            sphere.set_local_translation(Translation3::from(center.coords));
            sphere.set_local_rotation(rotation);
        }

        if body.atmosphere_height() > 0.0 {
            let radius = (body.radius() + body.atmosphere_height()) as f32;
            let color = Point3::from(body.colour().coords * 0.6);
            self.renderer.draw_atmosphere(center, radius, color);
        }
    }

    fn draw_trajectory(&mut self, key: &str, mesh: &OrbitMesh, frame: &Transform<f64>) {
        let mut frame = *frame;
        frame.set_translation(frame.translation() - self.focus.coords);
        let frame: Transform<f32> = nalgebra::convert(frame);
        self.renderer.draw_orbit(key, mesh, frame.to_homogeneous());
    }

    fn draw_icon(
        &mut self,
        shape: IconShape,
        position: &Point3<f64>,
        colour: &Colour,
        label: &str,
    ) {
        // Markers are sized in NDC, which spans 2 units across the screen height
        let pixel_size_ndc = 2.0 / self.camera.height() as f32;
        let center = self.to_focus_space(position);
        let color = Point3::new(colour.x, colour.y, colour.z);

        self.renderer
            .draw_marker(shape, center, MARKER_SIZE * pixel_size_ndc, color);
        if self.camera.is_in_front(&center) {
            self.labels.push(Label {
                position: center,
                text: label.to_owned(),
                color,
            });
        }
    }
}

fn format_seconds(seconds: f64) -> String {
    let mut total_seconds = seconds as u64;
    let n_minutes = 60;
    let n_hours = n_minutes * 60;
    let n_days = n_hours * 24;
    let n_years = 365 * n_days;

    macro_rules! count_and_remainder {
        ($variable:ident, $divisor:expr) => {
            let $variable = total_seconds / $divisor;
            total_seconds %= $divisor;
        };
    }

    count_and_remainder!(years, n_years);
    count_and_remainder!(days, n_days);
    count_and_remainder!(hours, n_hours);
    count_and_remainder!(minutes, n_minutes);

    format!(
        "{}y, {}d, {:02}:{:02}:{:02}",
        years, days, hours, minutes, total_seconds
    )
}
