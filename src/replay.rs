//! Input trace recording and deterministic replay
//!
//! A trace is the list of button changes with their time since the attempt
//! started. Because the driver's step count depends only on elapsed time,
//! replaying a trace against the same level reproduces the attempt exactly,
//! whatever frame rate the replaying host runs at.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::sim::{Engine, Level, SimEvent, SimState};
use crate::tuning::Tuning;

/// One button change, relative to the attempt's first `advance`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputChange {
    pub at_ms: f64,
    pub active: bool,
}

/// Ordered button changes for one attempt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputTrace {
    pub changes: Vec<InputChange>,
}

impl InputTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change. Repeats of the current state and out-of-order
    /// timestamps are dropped.
    pub fn record(&mut self, at_ms: f64, active: bool) {
        match self.changes.last() {
            Some(last) if last.active == active || at_ms < last.at_ms => {}
            None if !active => {}
            _ => self.changes.push(InputChange { at_ms, active }),
        }
    }

    /// Press held from `from_ms` for `hold_ms`
    pub fn tap(mut self, from_ms: f64, hold_ms: f64) -> Self {
        self.record(from_ms, true);
        self.record(from_ms + hold_ms, false);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// How a replayed attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayOutcome {
    Died,
    Completed,
    /// Still alive when the time limit ran out
    TimedOut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayResult {
    pub outcome: ReplayOutcome,
    pub state: SimState,
    pub events: Vec<SimEvent>,
    /// Host time consumed, relative to the attempt start
    pub elapsed_ms: f64,
}

impl ReplayResult {
    pub fn jumps(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SimEvent::Jumped | SimEvent::OrbBoost))
            .count()
    }
}

/// Replay `trace` on a fresh engine, calling `advance` every `frame_ms`
/// until the attempt ends or `max_ms` passes
pub fn replay(
    level: impl Into<Rc<Level>>,
    trace: &InputTrace,
    tuning: &Tuning,
    frame_ms: f64,
    max_ms: f64,
) -> ReplayResult {
    let ended = Rc::new(Cell::new(None));
    let (on_death, on_complete) = (ended.clone(), ended.clone());
    let mut engine = Engine::with_tuning(
        level,
        tuning.clone(),
        move || on_death.set(Some(ReplayOutcome::Died)),
        move || on_complete.set(Some(ReplayOutcome::Completed)),
    );

    let frame_ms = frame_ms.max(1.0);
    let mut events = Vec::new();
    let mut pending = trace.changes.iter().peekable();
    let mut now = 0.0;
    engine.advance(now);

    while ended.get().is_none() && now < max_ms {
        now = (now + frame_ms).min(max_ms);
        // Apply changes at their own timestamps, not the frame boundary
        while let Some(change) = pending.next_if(|c| c.at_ms <= now) {
            engine.advance(change.at_ms);
            engine.set_input(change.active);
        }
        engine.advance(now);
        events.extend(engine.drain_events());
    }

    ReplayResult {
        outcome: ended.get().unwrap_or(ReplayOutcome::TimedOut),
        state: engine.state().clone(),
        events,
        elapsed_ms: now,
    }
}
