use nalgebra::Point3;

use crate::astro::{Colour, OrbitMesh};
use crate::math::frame::Transform;

use super::body::{BodyId, ParentBody};

/// The shapes a screen-space icon can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconShape {
    /// A satellite's current position
    Circle,
    /// An apsis marker
    Triangle,
}

/// Whatever draws the scene. The simulation calls these once per frame, in
/// order: bodies first, then each visible satellite.
///
/// Positions are in world space, in meters; projection is the renderer's
/// business.
pub trait SceneRenderer {
    fn draw_body(&mut self, id: BodyId, body: &ParentBody);

    /// `mesh` is relative to the parent's center; `frame` places it in the
    /// world. `key` identifies the satellite the mesh belongs to, so the
    /// renderer can cache per-mesh GPU state.
    fn draw_trajectory(&mut self, key: &str, mesh: &OrbitMesh, frame: &Transform<f64>);

    fn draw_icon(&mut self, shape: IconShape, position: &Point3<f64>, colour: &Colour, label: &str);
}

/// What a [RecordingRenderer] saw.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Body(BodyId),
    Trajectory { key: String, vertices: usize },
    Icon {
        shape: IconShape,
        position: Point3<f64>,
        label: String,
    },
}

/// Draws nothing; writes down every call instead. Handy when there's no
/// window, and for checking what a frame would have drawn.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub calls: Vec<DrawCall>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn icons(&self, shape: IconShape) -> impl Iterator<Item = &DrawCall> + '_ {
        self.calls
            .iter()
            .filter(move |c| matches!(c, DrawCall::Icon { shape: s, .. } if *s == shape))
    }
}

impl SceneRenderer for RecordingRenderer {
    fn draw_body(&mut self, id: BodyId, _body: &ParentBody) {
        self.calls.push(DrawCall::Body(id));
    }

    fn draw_trajectory(&mut self, key: &str, mesh: &OrbitMesh, _frame: &Transform<f64>) {
        self.calls.push(DrawCall::Trajectory {
            key: key.to_owned(),
            vertices: mesh.vertices().len(),
        });
    }

    fn draw_icon(
        &mut self,
        shape: IconShape,
        position: &Point3<f64>,
        _colour: &Colour,
        label: &str,
    ) {
        self.calls.push(DrawCall::Icon {
            shape,
            position: *position,
            label: label.to_owned(),
        });
    }
}
