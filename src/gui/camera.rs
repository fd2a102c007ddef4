use std::f32::consts::PI;

use kiss3d::camera::Camera;
use kiss3d::event::{Action, Key, MouseButton, WindowEvent};
use kiss3d::resource::ShaderUniform;
use kiss3d::window::Canvas;
use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Vector2, Vector3};

const FOVY: f32 = PI / 4.0;

// Radians per pixel of drag, and per key press
const DRAG_TURN: f32 = 0.005;
const KEY_TURN: f32 = 0.1;

const SCROLL_ZOOM: f32 = 1.5;
const KEY_ZOOM: f32 = 1.2;

// Keeps look_at away from the degenerate straight-down view
const POLE_MARGIN: f32 = 0.001;
// Out past the Sun
const MAX_DISTANCE: f32 = 2.5e11;

// Clip planes, as fractions of the distance to the focus
const NEAR_FRACTION: f32 = 0.1;
const FAR_FRACTION: f32 = 1024.0;

/// How many body radii away the home view sits.
const HOME_RADII: f32 = 4.0;
/// Closest approach, in body radii.
const MIN_RADII: f32 = 1.1;

enum Motion {
    Turn(f32, f32),
    Zoom(f32),
}

fn key_motion(key: Key) -> Option<Motion> {
    match key {
        Key::W => Some(Motion::Turn(0.0, -KEY_TURN)),
        Key::S => Some(Motion::Turn(0.0, KEY_TURN)),
        Key::A => Some(Motion::Turn(-KEY_TURN, 0.0)),
        Key::D => Some(Motion::Turn(KEY_TURN, 0.0)),
        Key::Equals => Some(Motion::Zoom(KEY_ZOOM.recip())),
        Key::Minus => Some(Motion::Zoom(KEY_ZOOM)),
        _ => None,
    }
}

/// Camera position around the focus, in spherical coordinates with +Z up.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pose {
    azimuth: f32,
    inclination: f32,
    distance: f32,
}

impl Pose {
    // Looking at the equator from a little above it, from -Y
    const HOME_AZIMUTH: f32 = -PI / 2.0;
    const HOME_INCLINATION: f32 = 3.0 * PI / 8.0;

    fn home(distance: f32) -> Self {
        Pose {
            azimuth: Self::HOME_AZIMUTH,
            inclination: Self::HOME_INCLINATION,
            distance,
        }
    }

    fn eye(&self) -> Point3<f32> {
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let (sin_inc, cos_inc) = self.inclination.sin_cos();
        Point3::from(self.distance * Vector3::new(cos_az * sin_inc, sin_az * sin_inc, cos_inc))
    }
}

/// Orbits the focus body, which the view keeps at the origin. Drag or WASD
/// to turn; scroll or =/- to zoom. The clip planes follow the zoom, since
/// the scene runs from low orbit out to the Sun.
pub struct OrbitCamera {
    pose: Pose,
    home_distance: f32,
    min_distance: f32,
    // Framebuffer size, in pixels
    width: u32,
    height: u32,
    last_cursor: Option<Vector2<f32>>,
}

impl OrbitCamera {
    pub fn new() -> Self {
        OrbitCamera {
            pose: Pose::home(1.0),
            home_distance: 1.0,
            min_distance: 1.0,
            width: 800,
            height: 600,
            last_cursor: None,
        }
    }

    /// Frames a body of the given radius, and makes that the view
    /// [reset](Self::reset) goes back to.
    pub fn frame_body(&mut self, body_radius: f32) {
        self.min_distance = body_radius * MIN_RADII;
        self.home_distance = body_radius * HOME_RADII;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.pose = Pose::home(self.clamp_distance(self.home_distance));
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether a point (relative to the focus) is in front of the eye. Points
    /// behind it project to mirrored screen positions.
    pub fn is_in_front(&self, point: &Point3<f32>) -> bool {
        self.view_transform().transform_point(point).z < 0.0
    }

    fn clamp_distance(&self, distance: f32) -> f32 {
        nalgebra::clamp(distance, self.min_distance, MAX_DISTANCE)
    }

    fn turn(&mut self, d_azimuth: f32, d_inclination: f32) {
        self.pose.azimuth = (self.pose.azimuth + d_azimuth) % (2.0 * PI);
        self.pose.inclination = nalgebra::clamp(
            self.pose.inclination + d_inclination,
            POLE_MARGIN,
            PI - POLE_MARGIN,
        );
    }

    fn zoom(&mut self, factor: f32) {
        self.pose.distance = self.clamp_distance(self.pose.distance * factor);
    }

    fn apply(&mut self, motion: Motion) {
        match motion {
            Motion::Turn(d_azimuth, d_inclination) => self.turn(d_azimuth, d_inclination),
            Motion::Zoom(factor) => self.zoom(factor),
        }
    }

    fn projection(&self) -> Perspective3<f32> {
        Perspective3::new(
            self.width as f32 / self.height as f32,
            FOVY,
            self.pose.distance * NEAR_FRACTION,
            self.pose.distance * FAR_FRACTION,
        )
    }

    fn view_matrix(&self) -> Matrix4<f32> {
        self.view_transform().to_homogeneous()
    }
}

impl Camera for OrbitCamera {
    fn handle_event(&mut self, canvas: &Canvas, event: &WindowEvent) {
        match *event {
            WindowEvent::CursorPos(x, y, _) => {
                let cursor = Vector2::new(x as f32, y as f32);
                let dragging = canvas.get_mouse_button(MouseButton::Button1) == Action::Press;
                if let (true, Some(last)) = (dragging, self.last_cursor) {
                    // The scene follows the mouse, so the camera goes the other way
                    let delta = cursor - last;
                    self.turn(-delta.x * DRAG_TURN, -delta.y * DRAG_TURN);
                }
                self.last_cursor = Some(cursor);
            }
            WindowEvent::Scroll(_, off, _) => {
                if off > 0.0 {
                    self.zoom(SCROLL_ZOOM.recip());
                } else if off < 0.0 {
                    self.zoom(SCROLL_ZOOM);
                }
            }
            WindowEvent::FramebufferSize(w, h) => {
                self.width = w;
                self.height = h;
            }
            WindowEvent::Key(key, Action::Press, _) => {
                if let Some(motion) = key_motion(key) {
                    self.apply(motion);
                }
            }
            _ => {}
        }
    }

    fn eye(&self) -> Point3<f32> {
        self.pose.eye()
    }

    fn view_transform(&self) -> Isometry3<f32> {
        Isometry3::look_at_rh(&self.eye(), &Point3::origin(), &Vector3::z())
    }

    fn transformation(&self) -> Matrix4<f32> {
        self.projection().into_inner() * self.view_matrix()
    }

    fn inverse_transformation(&self) -> Matrix4<f32> {
        self.transformation()
            .try_inverse()
            .unwrap_or_else(Matrix4::identity)
    }

    fn clip_planes(&self) -> (f32, f32) {
        let projection = self.projection();
        (projection.znear(), projection.zfar())
    }

    fn update(&mut self, canvas: &Canvas) {
        let (width, height) = canvas.size();
        self.width = width;
        self.height = height;
    }

    fn upload(
        &self,
        _: usize,
        proj: &mut ShaderUniform<Matrix4<f32>>,
        view: &mut ShaderUniform<Matrix4<f32>>,
    ) {
        proj.upload(&self.projection().into_inner());
        view.upload(&self.view_matrix());
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_home_view_frames_the_body() {
        let mut camera = OrbitCamera::new();
        camera.frame_body(6.371e6);

        let eye = camera.eye();
        assert_relative_eq!(eye.coords.norm(), 4.0 * 6.371e6, max_relative = 1e-6);
        // South of the Y axis and above the equator
        assert!(eye.y < 0.0 && eye.z > 0.0);
        assert_relative_eq!(eye.x, 0.0, epsilon = 10.0);
    }

    #[test]
    fn test_zoom_stays_outside_the_body() {
        let mut camera = OrbitCamera::new();
        camera.frame_body(100.0);
        for _ in 0..50 {
            camera.zoom(0.5);
        }
        assert_relative_eq!(camera.eye().coords.norm(), 110.0, max_relative = 1e-5);

        camera.turn(1.0, 10.0);
        camera.reset();
        assert_eq!(camera.pose, Pose::home(400.0));
    }

    #[test]
    fn test_turning_stops_short_of_the_pole() {
        let mut camera = OrbitCamera::new();
        camera.turn(0.0, -10.0);
        assert_eq!(camera.pose.inclination, POLE_MARGIN);
        camera.turn(0.0, 20.0);
        assert_eq!(camera.pose.inclination, PI - POLE_MARGIN);
    }

    #[test]
    fn test_is_in_front() {
        let mut camera = OrbitCamera::new();
        camera.frame_body(1.0);
        let eye = camera.eye();

        assert!(camera.is_in_front(&Point3::origin()));
        // Twice as far out as the eye, on the same side
        assert!(!camera.is_in_front(&Point3::from(eye.coords * 2.0)));
    }
}
