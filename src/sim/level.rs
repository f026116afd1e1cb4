//! Level geometry store
//!
//! A level is immutable metadata plus an ordered list of axis-aligned
//! objects in grid units. The order is kept as authored: collision scans
//! it front to back, so later objects can override earlier ones within
//! a single step.

use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::state::GameMode;
use crate::error::LoadError;
use crate::tuning::Tuning;

/// Object categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Solid block, landable from the gravity side only
    Platform,
    /// Spike: any overlap past the margin is lethal
    #[serde(rename = "spike", alias = "hazard")]
    Hazard,
    /// Mid-air boost while pressed
    Orb,
    /// Mode/gravity/speed switch
    Portal,
    /// Parsed and kept, no interaction
    Pad,
    Checkpoint,
    Deco,
}

/// What a portal switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortalKind {
    #[serde(rename = "mode_run")]
    ModeRun,
    #[serde(rename = "mode_fly")]
    ModeFly,
    #[serde(rename = "gravity_inv")]
    GravityInverted,
    #[serde(rename = "gravity_norm")]
    GravityNormal,
    #[serde(rename = "speed_075")]
    Speed075,
    #[serde(rename = "speed_100")]
    Speed100,
    #[serde(rename = "speed_125")]
    Speed125,
    #[serde(rename = "speed_150")]
    Speed150,
}

impl PortalKind {
    /// Target mode for mode portals
    pub fn mode(self) -> Option<GameMode> {
        match self {
            PortalKind::ModeRun => Some(GameMode::Run),
            PortalKind::ModeFly => Some(GameMode::Fly),
            _ => None,
        }
    }

    /// Target gravity flag for gravity portals
    pub fn gravity_inverted(self) -> Option<bool> {
        match self {
            PortalKind::GravityInverted => Some(true),
            PortalKind::GravityNormal => Some(false),
            _ => None,
        }
    }

    /// Target multiplier for speed portals
    pub fn speed_multiplier(self) -> Option<f32> {
        match self {
            PortalKind::Speed075 => Some(0.75),
            PortalKind::Speed100 => Some(1.0),
            PortalKind::Speed125 => Some(1.25),
            PortalKind::Speed150 => Some(1.5),
            _ => None,
        }
    }
}

/// A single static object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelObject {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Degrees, cosmetic only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portal_type: Option<PortalKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_lock: Option<bool>,
}

impl LevelObject {
    pub fn new(id: impl Into<String>, kind: ObjectKind, x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            id: id.into(),
            kind,
            x,
            y,
            w,
            h,
            rotation: None,
            color: None,
            portal_type: None,
            time_lock: None,
        }
    }

    pub fn portal(id: impl Into<String>, portal: PortalKind, x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            portal_type: Some(portal),
            ..Self::new(id, ObjectKind::Portal, x, y, w, h)
        }
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = Some(degrees);
        self
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.w, self.h)
    }

    /// Right edge
    #[inline]
    pub fn extent(&self) -> f32 {
        self.x + self.w
    }
}

/// Level metadata (display and audio sync only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelMetadata {
    pub id: String,
    pub name: String,
    pub author: String,
    /// Tempo in beats per minute
    pub bpm: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song_url: Option<String>,
    #[serde(default)]
    pub song_offset_ms: f32,
    /// 1 (easiest) to 10
    pub difficulty: u8,
}

/// A complete level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub metadata: LevelMetadata,
    #[serde(default)]
    pub objects: Vec<LevelObject>,
}

impl Level {
    pub fn new(metadata: LevelMetadata, objects: Vec<LevelObject>) -> Self {
        Self { metadata, objects }
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let level: Level = serde_json::from_str(json)?;
        log::debug!(
            "Loaded level '{}' ({} objects)",
            level.metadata.id,
            level.objects.len()
        );
        Ok(level)
    }

    pub fn to_json(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Right edge of the furthest object, if any
    pub fn furthest_extent(&self) -> Option<f32> {
        self.objects.iter().map(LevelObject::extent).reduce(f32::max)
    }

    /// X coordinate at which the level counts as complete
    pub fn finish_line(&self, tuning: &Tuning) -> f32 {
        self.furthest_extent().unwrap_or(tuning.fallback_extent) + tuning.finish_margin
    }

    /// Objects whose x-interval lies within `radius` of `probe`, in stored order
    pub fn nearby<'a>(&'a self, probe: &'a Aabb, radius: f32) -> impl Iterator<Item = &'a LevelObject> {
        self.objects
            .iter()
            .filter(move |obj| probe.horizontal_gap(&obj.bounds()) <= radius)
    }
}
