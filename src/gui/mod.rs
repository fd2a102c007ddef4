//! Interactive front end, on kiss3d.

use kiss3d::camera::Camera;
use kiss3d::event::EventManager;
use kiss3d::planar_camera::PlanarCamera;
use kiss3d::post_processing::PostProcessingEffect;
use kiss3d::renderer::Renderer;
use kiss3d::window::{State, Window};

use self::controller::{Controller, Input};
use self::view::View;
use crate::model::{Simulation, SystemClock};

mod camera;
mod controller;
mod renderers;
mod view;

/// One window's worth of simulation. Each frame applies the user's input,
/// catches the physics up with the wall clock, and redraws.
pub struct App {
    simulation: Simulation,
    wall_clock: SystemClock,
    view: View,
    controller: Controller,
}

impl App {
    pub fn new(simulation: Simulation, window: &mut Window) -> Self {
        Self {
            view: View::new(&simulation, window),
            simulation,
            wall_clock: SystemClock::new(),
            controller: Controller::new(),
        }
    }

    fn process_user_input(&mut self, mut events: EventManager) {
        for event in events.iter() {
            match self.controller.process_event(event, &self.simulation) {
                Some(Input::Simulation(command)) => {
                    if let Err(e) = self.simulation.apply(command) {
                        self.view.set_status(e.to_string());
                    }
                }
                Some(Input::ResetCamera) => self.view.reset_camera(),
                None => {}
            }
        }
    }
}

impl State for App {
    fn cameras_and_effect_and_renderer(
        &mut self,
    ) -> (
        Option<&mut dyn Camera>,
        Option<&mut dyn PlanarCamera>,
        Option<&mut dyn Renderer>,
        Option<&mut dyn PostProcessingEffect>,
    ) {
        self.view.cameras_and_effect_and_renderer()
    }

    fn step(&mut self, window: &mut Window) {
        self.process_user_input(window.events());

        let report = self.simulation.step_frame(&self.wall_clock);
        if let Some(failure) = report.failures.last() {
            self.view.set_status(format!(
                "{} stuck at t = {:.0}: {}",
                failure.satellite, failure.sim_time, failure.error
            ));
        }

        self.view
            .prerender_scene(window, &self.simulation, &self.controller);
        self.controller.record_frame(report.frame_delta);
    }
}
