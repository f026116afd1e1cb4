//! Simulation state and events
//!
//! One `SimState` lives for exactly one attempt. It is created at the spawn
//! point, mutated only by `tick`, and thrown away when the attempt ends.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::level::PortalKind;
use crate::consts::{SPAWN_X, SPAWN_Y};

/// Movement mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Gravity plus a discrete jump from the ground
    #[default]
    Run,
    /// Continuous thrust while pressed
    Fly,
}

/// What killed the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    /// Ran into a platform's left face
    SideHit,
    /// Overlapped a platform away from any landing face
    Crushed,
    Hazard,
    /// Left the playable band above or below the world
    OutOfBounds,
}

/// Discrete things that happened during a step, for audio/FX hosts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimEvent {
    Jumped,
    OrbBoost,
    /// A portal changed mode, gravity or speed
    PortalEntered(PortalKind),
    Died(DeathCause),
    Completed,
}

/// Mutable per-attempt state (read-only to presentation)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimState {
    /// Horizontal position (left edge of the hitbox)
    pub x: f32,
    /// Vertical position (top edge of the hitbox, y grows downward)
    pub y: f32,
    pub vel_y: f32,
    /// Radians
    pub rotation: f32,
    pub dead: bool,
    pub completed: bool,
    pub grounded: bool,
    pub mode: GameMode,
    pub gravity_inverted: bool,
    pub speed_multiplier: f32,
    /// 0..=100, non-decreasing within an attempt
    pub percent: u8,
    /// Derived: `x` minus the camera lead
    pub camera_x: f32,
    /// Physics steps taken this attempt
    pub steps: u64,
}

impl Default for SimState {
    fn default() -> Self {
        Self::spawn(Vec2::new(SPAWN_X, SPAWN_Y))
    }
}

impl SimState {
    /// Fresh state at `pos`: run mode, airborne, alive
    pub fn spawn(pos: Vec2) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            vel_y: 0.0,
            rotation: 0.0,
            dead: false,
            completed: false,
            grounded: false,
            mode: GameMode::Run,
            gravity_inverted: false,
            speed_multiplier: 1.0,
            percent: 0,
            camera_x: 0.0,
            steps: 0,
        }
    }

    /// Dead or completed: no further steps run
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.dead || self.completed
    }

    /// +1 when gravity pulls down the screen, -1 when inverted
    #[inline]
    pub fn gravity_sign(&self) -> f32 {
        if self.gravity_inverted { -1.0 } else { 1.0 }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Player hitbox for a given side length
    #[inline]
    pub fn hitbox(&self, size: f32) -> Aabb {
        Aabb::square(self.position(), size)
    }
}
