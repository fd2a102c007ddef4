//! The simulated scene and the loop that drives it.

mod body;
mod clock;
mod registry;
mod render;
mod satellite;
mod simulation;

pub use body::{BodyId, BodyRegistry, LightSource, ParentBody};
pub use clock::{Clock, ManualClock, SimInfo, SimulationClock, SystemClock, Tick};
pub use registry::SatelliteRegistry;
pub use render::{DrawCall, IconShape, RecordingRenderer, SceneRenderer};
pub use satellite::{LaunchParams, Satellite, SatelliteInfo, MAX_NAME_LENGTH};
pub use simulation::{Command, FrameReport, Simulation, TickFailure};
