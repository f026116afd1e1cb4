//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (level object order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod engine;
pub mod level;
pub mod state;
pub mod tick;

pub use collision::{Aabb, Penetration, PlatformContact, classify_platform, hazard_overlap};
pub use engine::Engine;
pub use level::{Level, LevelMetadata, LevelObject, ObjectKind, PortalKind};
pub use state::{DeathCause, GameMode, SimEvent, SimState};
pub use tick::{StepOutcome, TickContext, TickInput, tick};
