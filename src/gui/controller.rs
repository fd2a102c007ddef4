use std::collections::VecDeque;

use kiss3d::event::{Action, Event, Key, WindowEvent};

use crate::model::{Command, LaunchParams, Simulation};

// Key config, all in one place
const KEY_RATE_UP: Key = Key::Up;
const KEY_RATE_DOWN: Key = Key::Down;
const KEY_RESET_RATE: Key = Key::Home;
const KEY_TOGGLE_PAUSE: Key = Key::Pause;
const KEY_TOGGLE_PAUSE_ALT: Key = Key::Space;
const KEY_CAMERA_RESET: Key = Key::C;
const KEY_LAUNCH: Key = Key::L;
const KEY_SELECT_NEXT: Key = Key::Tab;
const KEY_DESELECT: Key = Key::X;
const KEY_REMOVE: Key = Key::Delete;
const KEY_TOGGLE_HIDDEN: Key = Key::H;

pub const KEY_HELP: &str = "L launch  Tab select  X deselect  H hide  Del remove
Up/Down rate  Home 1x  Space pause  C camera  WASD/=/- view";

// Launch azimuths and colours for quick launches, cycled through in order
const QUICK_LAUNCH_AZIMUTHS: [f64; 4] = [90.0, 45.0, 0.0, 135.0];
const QUICK_LAUNCH_COLOURS: [[f32; 3]; 5] = [
    [1.0, 1.0, 1.0],
    [1.0, 0.4, 0.4],
    [0.4, 1.0, 0.4],
    [1.0, 0.8, 0.2],
    [0.8, 0.4, 1.0],
];

/// What a key press asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Simulation(Command),
    ResetCamera,
}

pub struct Controller {
    launches: usize,
    fps_counter: FpsCounter,
}

/// Frames per second, from frame times. The displayed values only change
/// every [DISPLAY_INTERVAL](Self::DISPLAY_INTERVAL) so they can be read.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    samples: VecDeque<f64>,
    since_display: f64,
    displayed: (f64, f64),
}

impl FpsCounter {
    pub const WINDOW: usize = 30;
    pub const DISPLAY_INTERVAL: f64 = 1.0 / 30.0;

    pub fn new() -> Self {
        FpsCounter {
            samples: VecDeque::with_capacity(Self::WINDOW),
            since_display: 0.0,
            displayed: (0.0, 0.0),
        }
    }

    pub fn record(&mut self, frame_time: f64) {
        if !(frame_time > 0.0) {
            return;
        }
        if self.samples.len() == Self::WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(frame_time.recip());

        self.since_display += frame_time;
        if self.since_display >= Self::DISPLAY_INTERVAL {
            self.since_display = 0.0;
            self.displayed = (frame_time.recip(), self.average());
        }
    }

    fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Rate of the last displayed frame
    pub fn value(&self) -> f64 {
        self.displayed.0
    }

    /// Average over the last [WINDOW](Self::WINDOW) frames
    pub fn average_value(&self) -> f64 {
        self.displayed.1
    }
}

impl Controller {
    pub fn new() -> Self {
        Controller {
            launches: 0,
            fps_counter: FpsCounter::new(),
        }
    }

    pub fn process_event(&mut self, event: Event, simulation: &Simulation) -> Option<Input> {
        let command = match event.value {
            WindowEvent::Key(KEY_RATE_UP, Action::Press, _) => Command::RateUp,
            WindowEvent::Key(KEY_RATE_DOWN, Action::Press, _) => Command::RateDown,
            WindowEvent::Key(KEY_RESET_RATE, Action::Press, _) => Command::ResetRate,
            WindowEvent::Key(KEY_TOGGLE_PAUSE | KEY_TOGGLE_PAUSE_ALT, Action::Press, _) => {
                Command::TogglePause
            }
            WindowEvent::Key(KEY_CAMERA_RESET, Action::Press, _) => {
                return Some(Input::ResetCamera);
            }
            WindowEvent::Key(KEY_LAUNCH, Action::Press, _) => {
                Command::Launch(self.next_quick_launch())
            }
            WindowEvent::Key(KEY_SELECT_NEXT, Action::Press, _) => Command::SelectNext,
            WindowEvent::Key(KEY_DESELECT, Action::Press, _) => Command::Deselect,
            WindowEvent::Key(KEY_REMOVE, Action::Press, _) => {
                Command::Remove(simulation.selected()?.name().to_owned())
            }
            WindowEvent::Key(KEY_TOGGLE_HIDDEN, Action::Press, _) => {
                Command::ToggleHidden(simulation.selected()?.name().to_owned())
            }
            _ => return None,
        };
        Some(Input::Simulation(command))
    }

    /// Default launch parameters, with a fresh name, and azimuth and colour
    /// picked so successive launches are easy to tell apart.
    fn next_quick_launch(&mut self) -> LaunchParams {
        let n = self.launches;
        self.launches += 1;

        let defaults = LaunchParams::default();
        LaunchParams {
            name: format!("{}-{}", defaults.name, n + 1),
            azimuth: QUICK_LAUNCH_AZIMUTHS[n % QUICK_LAUNCH_AZIMUTHS.len()].to_radians(),
            ..defaults
        }
        .with_colour(QUICK_LAUNCH_COLOURS[n % QUICK_LAUNCH_COLOURS.len()])
    }

    pub fn fps(&self) -> f64 {
        self.fps_counter.value()
    }

    pub fn average_fps(&self) -> f64 {
        self.fps_counter.average_value()
    }

    pub fn record_frame(&mut self, frame_time: f64) {
        self.fps_counter.record(frame_time)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_fps_average_window() {
        let mut counter = FpsCounter::new();
        for _ in 0..FpsCounter::WINDOW {
            counter.record(1.0 / 20.0);
        }
        assert_relative_eq!(counter.value(), 20.0, max_relative = 1e-12);
        assert_relative_eq!(counter.average_value(), 20.0, max_relative = 1e-12);

        // Refreshes every other frame at 60 fps
        for _ in 0..16 {
            counter.record(1.0 / 60.0);
        }
        let expected = (14.0 * 20.0 + 16.0 * 60.0) / 30.0;
        assert_relative_eq!(counter.value(), 60.0, max_relative = 1e-9);
        assert_relative_eq!(counter.average_value(), expected, max_relative = 1e-9);
    }

    #[test]
    fn test_fps_display_throttled() {
        let mut counter = FpsCounter::new();
        counter.record(1.0 / 10.0);
        assert_relative_eq!(counter.value(), 10.0, max_relative = 1e-12);

        // Too soon to refresh
        counter.record(1.0 / 1000.0);
        assert_relative_eq!(counter.value(), 10.0, max_relative = 1e-12);

        counter.record(0.0);
        counter.record(f64::NAN);
        assert_eq!(counter.samples.len(), 2);
    }

    #[test]
    fn test_quick_launches_are_distinct() {
        let mut controller = Controller::new();
        let first = controller.next_quick_launch();
        let second = controller.next_quick_launch();

        assert_eq!(first.name, "Satellite-1");
        assert_eq!(second.name, "Satellite-2");
        assert_ne!(first.azimuth, second.azimuth);
        assert_ne!(first.colour, second.colour);
        assert!(first.validate().is_ok());
        assert!(second.validate().is_ok());
    }
}
