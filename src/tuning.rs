//! Data-driven physics constants
//!
//! Defaults reproduce the shipped game feel. Every field can be overridden
//! from a partial JSON object; missing fields keep their default.

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Physics and world tuning (grid units, seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Gravity acceleration magnitude (u/s²)
    pub gravity: f32,
    /// Jump impulse magnitude (u/s), applied against gravity
    pub jump_velocity: f32,
    /// Fly-mode thrust acceleration while pressed (u/s²)
    pub fly_thrust: f32,
    /// Fraction of gravity applied in fly mode while released
    pub fly_gravity_factor: f32,
    /// Symmetric vertical speed cap in fly mode (u/s)
    pub fly_max_speed: f32,
    /// Horizontal speed at multiplier 1.0 (u/s)
    pub base_speed: f32,
    /// Side of the square player hitbox
    pub player_size: f32,
    /// Orb boost as a fraction of the jump impulse
    pub orb_boost_factor: f32,

    /// From-left penetration below this is a head-on hit
    pub side_hit_threshold: f32,
    /// From-top/from-bottom penetration below this is a landing
    pub landing_threshold: f32,
    /// Inward hitbox shrink applied to hazards on all sides
    pub hazard_margin: f32,
    /// Horizontal gap beyond which objects are skipped
    pub culling_radius: f32,

    /// Camera offset behind the player
    pub camera_lead: f32,
    /// Airborne spin in run mode (rad/s)
    pub spin_rate: f32,
    /// Fly-mode tilt as a fraction of the climb angle
    pub fly_tilt_factor: f32,

    /// Implicit floor line (normal gravity)
    pub floor_y: f32,
    /// Implicit ceiling line (inverted gravity / fly mode)
    pub ceiling_y: f32,
    /// Falling below this y is lethal
    pub fall_death_y: f32,
    /// Rising above this y is lethal
    pub escape_death_y: f32,

    /// Finish line distance past the furthest object
    pub finish_margin: f32,
    /// Furthest extent assumed for a level without objects
    pub fallback_extent: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 32.0,
            jump_velocity: 12.5,
            // 1.2 u/s per 1/120 s step
            fly_thrust: 144.0,
            fly_gravity_factor: 0.9,
            fly_max_speed: 15.0,
            base_speed: 10.4,
            player_size: 0.8,
            orb_boost_factor: 0.85,

            side_hit_threshold: 0.2,
            landing_threshold: 0.4,
            hazard_margin: 0.25,
            culling_radius: 12.0,

            camera_lead: 5.0,
            spin_rate: 8.0,
            fly_tilt_factor: 0.7,

            floor_y: 10.0,
            ceiling_y: 0.0,
            fall_death_y: 30.0,
            escape_death_y: -20.0,

            finish_margin: 10.0,
            fallback_extent: 100.0,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides; absent fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Orb boost magnitude (u/s)
    #[inline]
    pub fn orb_velocity(&self) -> f32 {
        self.jump_velocity.abs() * self.orb_boost_factor
    }
}
