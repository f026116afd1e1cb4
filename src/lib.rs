//! Rhythm Grid - A side-scrolling rhythm platformer simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (fixed-step driver, physics, collisions)
//! - `input`: Input latch combining keyboard/mouse/touch into one button
//! - `tuning`: Data-driven physics constants
//! - `levels`: Built-in level catalogue and quick-play generator
//! - `replay`: Input trace recording and deterministic replay
//! - `settings` / `progress`: Host-side records (LocalStorage on web)

pub mod error;
pub mod input;
pub mod levels;
pub mod progress;
pub mod replay;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use error::LoadError;
pub use input::{InputLatch, InputSource};
pub use progress::ProgressState;
pub use settings::Settings;
pub use sim::{Engine, GameMode, Level, SimEvent, SimState};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Physics ticks per simulated second
    pub const PHYSICS_TPS: u32 = 120;
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / PHYSICS_TPS as f32;
    /// Fixed timestep in host (millisecond-derived) seconds
    pub const SIM_DT_SECS: f64 = 1.0 / PHYSICS_TPS as f64;

    /// Spawn point (grid units). Spawns above the floor, airborne.
    pub const SPAWN_X: f32 = 0.0;
    pub const SPAWN_Y: f32 = 5.0;
}

/// Snap an angle to the nearest multiple of `step`
#[inline]
pub fn snap_angle(angle: f32, step: f32) -> f32 {
    (angle / step).round() * step
}
