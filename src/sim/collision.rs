//! Axis-aligned collision tests and platform contact classification
//!
//! Everything in the level is a rectangle in grid space (y grows downward).
//! The player is a square. Platforms are only safe when touched on the
//! face that matches the current gravity direction; every other overlap
//! is lethal.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + w, y + h),
        }
    }

    /// Square box with its top-left corner at `pos`
    pub fn square(pos: Vec2, size: f32) -> Self {
        Self {
            min: pos,
            max: pos + Vec2::splat(size),
        }
    }

    /// Shrink inward by `margin` on all four sides
    pub fn shrink(&self, margin: f32) -> Self {
        Self {
            min: self.min + Vec2::splat(margin),
            max: self.max - Vec2::splat(margin),
        }
    }

    /// Positive width and height
    #[inline]
    pub fn has_area(&self) -> bool {
        self.max.x > self.min.x && self.max.y > self.min.y
    }

    /// Strict overlap: touching edges do not count. Degenerate (zero or
    /// negative size) boxes never overlap anything.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.has_area()
            && other.has_area()
            && self.max.x > other.min.x
            && self.min.x < other.max.x
            && self.max.y > other.min.y
            && self.min.y < other.max.y
    }

    /// Horizontal gap between the two x-intervals (0 when they overlap)
    #[inline]
    pub fn horizontal_gap(&self, other: &Aabb) -> f32 {
        (other.min.x - self.max.x).max(self.min.x - other.max.x).max(0.0)
    }
}

/// Hazard test: the player's box shrinks by `margin` on every side, so the
/// effective contact gap between the two boxes is `margin` all around
#[inline]
pub fn hazard_overlap(player: &Aabb, hazard: &Aabb, margin: f32) -> bool {
    player.shrink(margin).overlaps(hazard)
}

/// Penetration depths of the player into a platform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    /// Player bottom below the platform top
    pub from_top: f32,
    /// Player top above the platform bottom
    pub from_bottom: f32,
    /// Player right edge past the platform left face
    pub from_left: f32,
}

impl Penetration {
    pub fn between(player: &Aabb, platform: &Aabb) -> Self {
        Self {
            from_top: player.max.y - platform.min.y,
            from_bottom: platform.max.y - player.min.y,
            from_left: player.max.x - platform.min.x,
        }
    }
}

/// How an overlapping platform resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformContact {
    /// Ran into the left face
    SideHit,
    /// Standing on top (normal gravity)
    Land,
    /// Hanging from the bottom (inverted gravity)
    Hang,
    /// Deep overlap not matching a landing face
    Crush,
}

/// Classify an overlap in priority order: side face, top, bottom, crush
pub fn classify_platform(
    pen: Penetration,
    gravity_inverted: bool,
    side_threshold: f32,
    landing_threshold: f32,
) -> PlatformContact {
    if pen.from_left < side_threshold {
        PlatformContact::SideHit
    } else if pen.from_top < landing_threshold && !gravity_inverted {
        PlatformContact::Land
    } else if pen.from_bottom < landing_threshold && gravity_inverted {
        PlatformContact::Hang
    } else {
        PlatformContact::Crush
    }
}
