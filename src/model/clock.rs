use std::cell::Cell;
use std::time::Instant;

use crate::error::SimulationError;

/// A source of wall-clock time, in seconds from some fixed origin.
pub trait Clock {
    fn now(&self) -> f64;
}

/// The real thing.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        ManualClock {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, dt: f64) {
        self.now.set(self.now.get() + dt);
    }

    pub fn set(&self, now: f64) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// One fixed physics step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Simulation time after this step
    pub sim_time: f64,
    /// Simulated seconds covered by this step
    pub sim_dt: f64,
}

/// Snapshot for the sim info panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimInfo {
    pub sim_rate: f64,
    pub sim_time: f64,
    pub delta_time: f64,
    pub run_time: f64,
    pub paused: bool,
}

/// Fixed-step accumulator that turns wall time into simulation time.
///
/// Each frame, the wall time since the last frame goes into the accumulator,
/// and [next_tick](Self::next_tick) drains it `delta_time` at a time. Every
/// drained step moves simulation time forward by `delta_time * sim_rate`.
///
/// Invariants: `0 <= accumulator < delta_time` once a frame's ticks have been
/// drained, and `sim_time` never decreases.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    sim_time: f64,
    sim_rate: f64,
    accumulator: f64,
    delta_time: f64,
    run_time: f64,
    last_now: Option<f64>,
}

impl SimulationClock {
    /// Rate steps stop doubling here, at about 34 years per second.
    pub const MAX_SIM_RATE: f64 = 1_073_741_824.0;

    pub fn new(delta_time: f64) -> Result<Self, SimulationError> {
        // A zero step would never drain the accumulator
        if !(delta_time.is_finite() && delta_time > 0.0) {
            return Err(SimulationError::InvalidDeltaTime(delta_time));
        }
        Ok(SimulationClock {
            sim_time: 0.0,
            sim_rate: 1.0,
            accumulator: 0.0,
            delta_time,
            run_time: 0.0,
            last_now: None,
        })
    }

    /// Feeds in the wall time at the start of a frame. Returns the wall time
    /// elapsed since the previous frame; zero on the first call.
    pub fn begin_frame(&mut self, now: f64) -> f64 {
        let frame_delta = match self.last_now {
            Some(last) => (now - last).max(0.0),
            None => 0.0,
        };
        self.last_now = Some(now);
        self.accumulator += frame_delta;
        self.run_time += frame_delta;
        frame_delta
    }

    /// Takes one step out of the accumulator, if a whole one is left.
    pub fn next_tick(&mut self) -> Option<Tick> {
        // Repeated subtraction of a non-representable delta_time drifts by an
        // ulp or so; don't let that eat the last tick of a frame.
        let slack = self.delta_time * 1e-9;
        if self.accumulator + slack < self.delta_time {
            return None;
        }

        self.accumulator = (self.accumulator - self.delta_time).max(0.0);
        let sim_dt = self.delta_time * self.sim_rate;
        self.sim_time += sim_dt;
        Some(Tick {
            sim_time: self.sim_time,
            sim_dt,
        })
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn sim_rate(&self) -> f64 {
        self.sim_rate
    }

    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    pub fn run_time(&self) -> f64 {
        self.run_time
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// A rate of zero is what paused means, however it got there.
    pub fn is_paused(&self) -> bool {
        self.sim_rate == 0.0
    }

    pub fn set_sim_rate(&mut self, rate: f64) -> Result<(), SimulationError> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(SimulationError::NegativeSimRate(rate));
        }
        self.sim_rate = rate;
        Ok(())
    }

    pub fn rate_up(&mut self) {
        let doubled = self.sim_rate * 2.0;
        if doubled <= Self::MAX_SIM_RATE {
            self.sim_rate = doubled;
        }
    }

    pub fn rate_down(&mut self) {
        self.sim_rate /= 2.0;
    }

    pub fn reset_rate(&mut self) {
        self.sim_rate = 1.0;
    }

    /// Pausing stops time outright; unpausing always comes back at 1x.
    pub fn toggle_pause(&mut self) {
        self.sim_rate = if self.is_paused() { 1.0 } else { 0.0 };
    }

    pub fn info(&self) -> SimInfo {
        SimInfo {
            sim_rate: self.sim_rate,
            sim_time: self.sim_time,
            delta_time: self.delta_time,
            run_time: self.run_time,
            paused: self.is_paused(),
        }
    }
}
