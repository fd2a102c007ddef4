use crate::config::SimulationConfig;
use crate::error::{OrbitError, SimulationError};

use super::body::{BodyId, BodyRegistry, LightSource};
use super::clock::{Clock, SimInfo, SimulationClock, Tick};
use super::registry::SatelliteRegistry;
use super::render::{IconShape, SceneRenderer};
use super::satellite::{LaunchParams, Satellite};

/// A user action. Each one is applied in full or not at all.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Launch(LaunchParams),
    Remove(String),
    Select(String),
    Deselect,
    SelectNext,
    ToggleHidden(String),
    SetSimRate(f64),
    RateUp,
    RateDown,
    ResetRate,
    TogglePause,
}

/// A satellite whose state couldn't be updated on some tick. It keeps its
/// previous state.
#[derive(Debug, Clone, PartialEq)]
pub struct TickFailure {
    pub satellite: String,
    pub sim_time: f64,
    pub error: OrbitError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Wall time since the previous frame
    pub frame_delta: f64,
    /// Physics ticks run this frame
    pub ticks: usize,
    pub failures: Vec<TickFailure>,
}

/// The whole simulated scene: bodies, satellites and the clock that moves
/// them.
///
/// Each frame is: apply commands, then [step_frame](Self::step_frame) to
/// catch the physics up with the wall clock, then [render](Self::render).
#[derive(Debug)]
pub struct Simulation {
    bodies: BodyRegistry,
    light: Option<LightSource>,
    satellites: SatelliteRegistry,
    clock: SimulationClock,
    trajectory_segments: usize,
}

impl Simulation {
    pub fn new(bodies: BodyRegistry, clock: SimulationClock, trajectory_segments: usize) -> Self {
        Simulation {
            bodies,
            light: None,
            satellites: SatelliteRegistry::new(),
            clock,
            trajectory_segments,
        }
    }

    pub fn with_light(mut self, light: LightSource) -> Self {
        self.light = Some(light);
        self
    }

    /// Builds the scene a config describes and performs its launches.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, SimulationError> {
        config
            .validate()
            .map_err(|e| SimulationError::InvalidConfig(e.to_string()))?;

        let mut bodies = BodyRegistry::new();
        for body in &config.scene.bodies {
            bodies.add(body.to_body());
        }

        let mut clock = SimulationClock::new(config.clock.delta_time)?;
        clock.set_sim_rate(config.clock.initial_sim_rate)?;
        if config.clock.start_paused && !clock.is_paused() {
            clock.toggle_pause();
        }

        let mut simulation = Simulation::new(bodies, clock, config.trajectory_segments)
            .with_light(config.scene.light.to_light());
        for launch in &config.launches {
            simulation.add_satellite(&launch.to_params())?;
        }
        Ok(simulation)
    }

    pub fn bodies(&self) -> &BodyRegistry {
        &self.bodies
    }

    pub fn light(&self) -> Option<&LightSource> {
        self.light.as_ref()
    }

    pub fn satellites(&self) -> &SatelliteRegistry {
        &self.satellites
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn sim_time(&self) -> f64 {
        self.clock.sim_time()
    }

    pub fn info(&self) -> SimInfo {
        self.clock.info()
    }

    pub fn selected(&self) -> Option<&Satellite> {
        self.satellites.iter().find(|s| s.is_selected())
    }

    /// Launches a satellite at the current simulation time.
    pub fn add_satellite(&mut self, params: &LaunchParams) -> Result<(), SimulationError> {
        if self.satellites.contains(&params.name) {
            return Err(SimulationError::DuplicateName(params.name.clone()));
        }
        let parent_id = self
            .bodies
            .find_by_name(&params.parent)
            .ok_or_else(|| SimulationError::UnknownParent(params.parent.clone()))?;

        let satellite = Satellite::launch(
            params,
            parent_id,
            &self.bodies[parent_id],
            self.clock.sim_time(),
            self.trajectory_segments,
        )?;
        self.satellites.add(satellite)
    }

    pub fn remove_satellite(&mut self, name: &str) -> Result<Satellite, SimulationError> {
        let satellite = self.satellites.remove_by_name(name)?;
        log::debug!("Removed {}", name);
        Ok(satellite)
    }

    /// Makes `name` the only selected satellite.
    pub fn select(&mut self, name: &str) -> Result<(), SimulationError> {
        if !self.satellites.contains(name) {
            return Err(SimulationError::UnknownSatellite(name.to_owned()));
        }
        for satellite in self.satellites.iter_mut() {
            let selected = satellite.name() == name;
            satellite.set_selected(selected);
        }
        Ok(())
    }

    pub fn deselect(&mut self) {
        for satellite in self.satellites.iter_mut() {
            satellite.set_selected(false);
        }
    }

    /// Moves the selection to the next satellite in launch order, wrapping
    /// around. Selects the first one if nothing is selected.
    pub fn select_next(&mut self) {
        let count = self.satellites.len();
        if count == 0 {
            return;
        }
        let next = match self.satellites.iter().position(|s| s.is_selected()) {
            Some(idx) => (idx + 1) % count,
            None => 0,
        };
        for (idx, satellite) in self.satellites.iter_mut().enumerate() {
            satellite.set_selected(idx == next);
        }
    }

    pub fn toggle_hidden(&mut self, name: &str) -> Result<(), SimulationError> {
        let satellite = self
            .satellites
            .get_mut(name)
            .ok_or_else(|| SimulationError::UnknownSatellite(name.to_owned()))?;
        let hidden = !satellite.is_hidden();
        satellite.set_hidden(hidden);
        Ok(())
    }

    pub fn apply(&mut self, command: Command) -> Result<(), SimulationError> {
        let changes_rate = matches!(
            command,
            Command::SetSimRate(_)
                | Command::RateUp
                | Command::RateDown
                | Command::ResetRate
                | Command::TogglePause
        );
        let result = match command {
            Command::Launch(params) => self.add_satellite(&params),
            Command::Remove(name) => self.remove_satellite(&name).map(|_| ()),
            Command::Select(name) => self.select(&name),
            Command::Deselect => {
                self.deselect();
                Ok(())
            }
            Command::SelectNext => {
                self.select_next();
                Ok(())
            }
            Command::ToggleHidden(name) => self.toggle_hidden(&name),
            Command::SetSimRate(rate) => self.clock.set_sim_rate(rate),
            Command::RateUp => {
                self.clock.rate_up();
                Ok(())
            }
            Command::RateDown => {
                self.clock.rate_down();
                Ok(())
            }
            Command::ResetRate => {
                self.clock.reset_rate();
                Ok(())
            }
            Command::TogglePause => {
                self.clock.toggle_pause();
                Ok(())
            }
        };

        match &result {
            Ok(()) if changes_rate => log::info!("Sim rate is now {}x", self.clock.sim_rate()),
            Ok(()) => {}
            Err(e) => log::warn!("Rejected command: {}", e),
        }
        result
    }

    /// Runs as many physics ticks as the wall time since the last frame
    /// allows.
    pub fn step_frame(&mut self, wall_clock: &impl Clock) -> FrameReport {
        let frame_delta = self.clock.begin_frame(wall_clock.now());
        let mut report = FrameReport {
            frame_delta,
            ..Default::default()
        };

        while let Some(tick) = self.clock.next_tick() {
            report.failures.extend(self.physics_tick(tick));
            report.ticks += 1;
        }
        report
    }

    /// Spins every body, then moves every satellite to the tick's time.
    pub fn physics_tick(&mut self, tick: Tick) -> Vec<TickFailure> {
        for body in self.bodies.iter_mut() {
            body.spin(tick.sim_dt);
        }

        let mut failures = Vec::new();
        for satellite in self.satellites.iter_mut() {
            let parent = &self.bodies[satellite.parent()];
            if let Err(error) = satellite.advance(parent, tick.sim_time) {
                log::warn!(
                    "Couldn't advance {} to t = {}: {}",
                    satellite.name(),
                    tick.sim_time,
                    error
                );
                failures.push(TickFailure {
                    satellite: satellite.name().to_owned(),
                    sim_time: tick.sim_time,
                    error,
                });
            }
        }
        failures
    }

    /// Re-anchors a satellite to another body. Its elements are left alone.
    pub fn change_parent_body(&mut self, name: &str, parent: &str) -> Result<(), SimulationError> {
        let parent_id: BodyId = self
            .bodies
            .find_by_name(parent)
            .ok_or_else(|| SimulationError::UnknownParent(parent.to_owned()))?;
        let satellite = self
            .satellites
            .get_mut(name)
            .ok_or_else(|| SimulationError::UnknownSatellite(name.to_owned()))?;
        satellite.change_parent_body(parent_id, &self.bodies[parent_id]);
        Ok(())
    }

    /// Hands the scene to `renderer`: bodies first, then each visible
    /// satellite's trajectory and icon, and apsis markers for the selected
    /// one.
    pub fn render(&self, renderer: &mut impl SceneRenderer) {
        for (id, body) in self.bodies.iter() {
            renderer.draw_body(id, body);
        }

        for satellite in self.satellites.iter().filter(|s| !s.is_hidden()) {
            let colour = satellite.colour();
            renderer.draw_trajectory(satellite.name(), satellite.trajectory(), satellite.frame());
            renderer.draw_icon(
                IconShape::Circle,
                &satellite.position(),
                &colour,
                satellite.name(),
            );

            if satellite.is_selected() {
                renderer.draw_icon(
                    IconShape::Triangle,
                    &satellite.apoapsis_marker(),
                    &colour,
                    "Apoapsis",
                );
                renderer.draw_icon(
                    IconShape::Triangle,
                    &satellite.periapsis_marker(),
                    &colour,
                    "Periapsis",
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::model::clock::ManualClock;
    use crate::model::render::{DrawCall, RecordingRenderer};

    fn default_simulation() -> Simulation {
        Simulation::from_config(&SimulationConfig::default()).unwrap()
    }

    fn launch(name: &str) -> Command {
        Command::Launch(LaunchParams {
            name: name.to_owned(),
            ..Default::default()
        })
    }

    #[test]
    fn test_from_config() {
        let mut config = SimulationConfig::default();
        config.clock.start_paused = true;
        config.launches.push(Default::default());
        let simulation = Simulation::from_config(&config).unwrap();

        assert_eq!(simulation.bodies().len(), 1);
        assert_eq!(simulation.satellites().len(), 1);
        assert!(simulation.info().paused);
        assert_eq!(simulation.info().sim_rate, 0.0);
        assert_eq!(simulation.light().map(|l| l.name.as_str()), Some("Sun"));
    }

    #[test]
    fn test_zero_step_from_command_line_is_rejected() {
        use clap::Parser;

        let mut config = SimulationConfig::default();
        let args = crate::cli::CliArgs::parse_from(["rust-orbit-sim", "--delta-time", "0"]);
        config.apply_cli_overrides(&args);

        assert!(matches!(
            Simulation::from_config(&config),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_pause_then_reset_rate_runs_time() {
        let wall = ManualClock::new(0.0);
        let mut simulation = default_simulation();
        simulation.apply(Command::TogglePause).unwrap();
        simulation.apply(Command::ResetRate).unwrap();
        assert!(!simulation.info().paused);

        simulation.step_frame(&wall);
        wall.advance(1.0);
        simulation.step_frame(&wall);
        assert_relative_eq!(simulation.sim_time(), 1.0, max_relative = 1e-9);
    }

    #[test]
    fn test_launch_errors_leave_no_trace() {
        let mut simulation = default_simulation();
        simulation.apply(launch("Sat-A")).unwrap();

        assert_eq!(
            simulation.apply(launch("Sat-A")),
            Err(SimulationError::DuplicateName("Sat-A".into()))
        );

        let params = LaunchParams {
            name: "Sat-B".into(),
            parent: "Mars".into(),
            ..Default::default()
        };
        assert_eq!(
            simulation.apply(Command::Launch(params)),
            Err(SimulationError::UnknownParent("Mars".into()))
        );

        let params = LaunchParams {
            name: "Sat-C".into(),
            velocity: 20_000.0,
            ..Default::default()
        };
        assert!(matches!(
            simulation.apply(Command::Launch(params)),
            Err(SimulationError::DegenerateOrbit(_))
        ));

        assert_eq!(simulation.satellites().len(), 1);
    }

    #[test]
    fn test_selection() {
        let mut simulation = default_simulation();
        for name in ["A", "B", "C"].iter() {
            simulation.apply(launch(name)).unwrap();
        }
        assert!(simulation.selected().is_none());

        simulation.apply(Command::SelectNext).unwrap();
        assert_eq!(simulation.selected().map(Satellite::name), Some("A"));
        simulation.apply(Command::Select("C".into())).unwrap();
        simulation.apply(Command::SelectNext).unwrap();
        assert_eq!(simulation.selected().map(Satellite::name), Some("A"));

        assert_eq!(
            simulation.apply(Command::Select("Z".into())),
            Err(SimulationError::UnknownSatellite("Z".into()))
        );
        assert_eq!(simulation.selected().map(Satellite::name), Some("A"));

        simulation.apply(Command::Deselect).unwrap();
        assert!(simulation.selected().is_none());
    }

    #[test]
    fn test_render_pass() {
        let mut simulation = default_simulation();
        for name in ["A", "B", "C"].iter() {
            simulation.apply(launch(name)).unwrap();
        }
        simulation.apply(Command::ToggleHidden("B".into())).unwrap();
        simulation.apply(Command::Select("C".into())).unwrap();

        let mut renderer = RecordingRenderer::new();
        simulation.render(&mut renderer);

        assert_eq!(renderer.calls[0], DrawCall::Body(BodyId(0)));
        let trajectories: Vec<_> = renderer
            .calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Trajectory { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(trajectories, vec!["A", "C"]);
        assert_eq!(renderer.icons(IconShape::Circle).count(), 2);
        assert_eq!(renderer.icons(IconShape::Triangle).count(), 2);
    }

    #[test]
    fn test_hidden_satellites_still_move() {
        let wall = ManualClock::new(0.0);
        let mut simulation = default_simulation();
        simulation.apply(launch("A")).unwrap();
        simulation.apply(Command::ToggleHidden("A".into())).unwrap();
        let start = simulation.satellites().get("A").unwrap().position();

        simulation.step_frame(&wall);
        wall.advance(0.25);
        let report = simulation.step_frame(&wall);

        assert_eq!(report.ticks, 250);
        assert!(report.failures.is_empty());
        let end = simulation.satellites().get("A").unwrap().position();
        assert!((end - start).norm() > 1000.0);
    }

    #[test]
    fn test_failed_tick_is_reported_and_skipped() {
        let mut simulation = default_simulation();
        simulation.apply(launch("A")).unwrap();
        let position = simulation.satellites().get("A").unwrap().position();

        let failures = simulation.physics_tick(Tick {
            sim_time: f64::INFINITY,
            sim_dt: 0.001,
        });

        assert_eq!(
            failures,
            vec![TickFailure {
                satellite: "A".into(),
                sim_time: f64::INFINITY,
                error: OrbitError::NonFiniteInput,
            }]
        );
        assert_eq!(simulation.satellites().get("A").unwrap().position(), position);
    }

    #[test]
    fn test_rate_commands() {
        let mut simulation = default_simulation();
        simulation.apply(Command::RateUp).unwrap();
        simulation.apply(Command::RateUp).unwrap();
        assert_eq!(simulation.info().sim_rate, 4.0);
        simulation.apply(Command::RateDown).unwrap();
        assert_eq!(simulation.info().sim_rate, 2.0);
        simulation.apply(Command::ResetRate).unwrap();
        assert_eq!(simulation.info().sim_rate, 1.0);
        assert_eq!(
            simulation.apply(Command::SetSimRate(-2.0)),
            Err(SimulationError::NegativeSimRate(-2.0))
        );
        simulation.apply(Command::TogglePause).unwrap();
        assert_eq!(simulation.info().sim_rate, 0.0);
    }

    #[test]
    fn test_earth_spins_with_sim_time() {
        let wall = ManualClock::new(0.0);
        let mut simulation = default_simulation();
        simulation.apply(Command::SetSimRate(21_600.0)).unwrap();
        let start = simulation.bodies()[BodyId(0)].rotation();

        simulation.step_frame(&wall);
        wall.advance(1.0);
        simulation.step_frame(&wall);

        // A quarter of a day
        assert_relative_eq!(simulation.sim_time(), 21_600.0, max_relative = 1e-9);
        let turned = start.angle_to(&simulation.bodies()[BodyId(0)].rotation());
        assert_relative_eq!(turned, std::f64::consts::FRAC_PI_2, max_relative = 1e-6);
    }

    #[test]
    fn test_change_parent_body() {
        let mut config = SimulationConfig::default();
        config.scene.bodies.push(crate::config::BodyConfig {
            name: "Moon".into(),
            mass: 7.35e22,
            radius: 1.737e6,
            position: [3.84e8, 0.0, 0.0],
            ..Default::default()
        });
        let mut simulation = Simulation::from_config(&config).unwrap();
        simulation.apply(launch("A")).unwrap();

        simulation.change_parent_body("A", "Moon").unwrap();
        let satellite = simulation.satellites().get("A").unwrap();
        assert_eq!(satellite.parent(), BodyId(1));
        assert_eq!(
            simulation.change_parent_body("A", "Pluto"),
            Err(SimulationError::UnknownParent("Pluto".into()))
        );
    }
}
