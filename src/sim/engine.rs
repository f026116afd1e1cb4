//! Simulation core: fixed-step driver around `tick`
//!
//! The host calls `advance` from its display callback with a wall-clock
//! timestamp in milliseconds. Elapsed time is measured from the priming
//! call, and the driver runs however many whole 1/120 s steps that time
//! covers. Counting from a fixed origin (instead of summing per-frame
//! deltas) makes the step count depend only on total elapsed time, never on
//! how the host sliced it into frames.

use std::rc::Rc;

use super::level::Level;
use super::state::{SimEvent, SimState};
use super::tick::{StepOutcome, TickContext, TickInput, tick};
use crate::consts::{PHYSICS_TPS, SIM_DT_SECS};
use crate::tuning::Tuning;

/// Absorbs float error when converting elapsed milliseconds to steps
const STEP_EPSILON: f64 = 1e-6;

/// Undrained events kept; older ones are dropped first
pub const MAX_PENDING_EVENTS: usize = 1024;

type Callback = Box<dyn FnMut()>;

/// The simulation core for one level
pub struct Engine {
    level: Rc<Level>,
    tuning: Tuning,
    finish_x: f32,
    state: SimState,
    input: TickInput,
    /// Timestamp of the priming `advance` call
    origin_ms: Option<f64>,
    /// Latest timestamp seen
    last_ms: f64,
    events: Vec<SimEvent>,
    attempt: u32,
    on_death: Callback,
    on_complete: Callback,
}

impl Engine {
    /// Create an engine with default tuning
    pub fn new(
        level: impl Into<Rc<Level>>,
        on_death: impl FnMut() + 'static,
        on_complete: impl FnMut() + 'static,
    ) -> Self {
        Self::with_tuning(level, Tuning::default(), on_death, on_complete)
    }

    pub fn with_tuning(
        level: impl Into<Rc<Level>>,
        tuning: Tuning,
        on_death: impl FnMut() + 'static,
        on_complete: impl FnMut() + 'static,
    ) -> Self {
        let level = level.into();
        let finish_x = level.finish_line(&tuning);
        log::info!(
            "Attempt 1 on '{}' (finish line at x={:.1})",
            level.metadata.name,
            finish_x
        );
        Self {
            level,
            tuning,
            finish_x,
            state: SimState::default(),
            input: TickInput::default(),
            origin_ms: None,
            last_ms: 0.0,
            events: Vec::new(),
            attempt: 1,
            on_death: Box::new(on_death),
            on_complete: Box::new(on_complete),
        }
    }

    /// Latch the logical button. Level-triggered: read every step.
    pub fn set_input(&mut self, active: bool) {
        self.input.pressed = active;
    }

    pub fn input(&self) -> bool {
        self.input.pressed
    }

    /// Run every fixed step that fits in the time elapsed since priming
    ///
    /// The first call only records the timestamp. No-op once the attempt
    /// is dead or completed.
    pub fn advance(&mut self, host_timestamp_ms: f64) {
        if self.state.is_terminal() {
            return;
        }
        let Some(origin) = self.origin_ms else {
            self.origin_ms = Some(host_timestamp_ms);
            self.last_ms = host_timestamp_ms;
            return;
        };
        // A clock that steps backwards does not rewind simulated time
        self.last_ms = self.last_ms.max(host_timestamp_ms);

        let due = steps_covering(self.last_ms - origin);
        let ctx = TickContext {
            level: &self.level,
            tuning: &self.tuning,
            finish_x: self.finish_x,
        };

        while self.state.steps < due {
            match tick(&mut self.state, &ctx, &self.input, &mut self.events) {
                StepOutcome::Running => {}
                StepOutcome::Died(cause) => {
                    log::info!(
                        "Attempt {} died ({:?}) at {}% (x={:.2})",
                        self.attempt,
                        cause,
                        self.state.percent,
                        self.state.x
                    );
                    (self.on_death)();
                    break;
                }
                StepOutcome::Completed => {
                    log::info!(
                        "Attempt {} completed '{}' in {} steps",
                        self.attempt,
                        self.level.metadata.name,
                        self.state.steps
                    );
                    (self.on_complete)();
                    break;
                }
                StepOutcome::Frozen => break,
            }
        }

        if self.events.len() > MAX_PENDING_EVENTS {
            let excess = self.events.len() - MAX_PENDING_EVENTS;
            self.events.drain(..excess);
            log::debug!("Dropped {} undrained events", excess);
        }
    }

    /// Throw the current attempt away and start a fresh one
    ///
    /// The next `advance` primes the clock again.
    pub fn restart(&mut self) {
        self.attempt += 1;
        self.state = SimState::default();
        self.input = TickInput::default();
        self.origin_ms = None;
        self.last_ms = 0.0;
        self.events.clear();
        log::info!("Attempt {} on '{}'", self.attempt, self.level.metadata.name);
    }

    /// Read-only snapshot for presentation
    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn finish_x(&self) -> f32 {
        self.finish_x
    }

    /// 1-based attempt counter
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Unconsumed wall-clock time in seconds (less than one step)
    pub fn accumulator(&self) -> f64 {
        match self.origin_ms {
            Some(origin) => {
                let elapsed = (self.last_ms - origin) / 1000.0;
                (elapsed - self.state.steps as f64 * SIM_DT_SECS).max(0.0)
            }
            None => 0.0,
        }
    }

    /// Take the events raised since the last drain
    ///
    /// Hosts should drain every frame. At most `MAX_PENDING_EVENTS` of
    /// the most recent events are kept between drains.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Number of whole fixed steps in `elapsed_ms`
fn steps_covering(elapsed_ms: f64) -> u64 {
    (elapsed_ms * PHYSICS_TPS as f64 / 1000.0 + STEP_EPSILON).floor() as u64
}
