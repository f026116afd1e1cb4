//! Fixed timestep simulation tick
//!
//! One call advances the attempt by exactly `SIM_DT`. Order within a step:
//! horizontal advance, vertical integration, collision scan, world clamp,
//! jump, rotation, bounds death, progress.

use std::f32::consts::FRAC_PI_2;

use super::collision::{PlatformContact, Penetration, classify_platform, hazard_overlap};
use super::level::{Level, LevelObject, ObjectKind};
use super::state::{DeathCause, GameMode, SimEvent, SimState};
use crate::consts::SIM_DT;
use crate::snap_angle;
use crate::tuning::Tuning;

/// Input for a single tick (level-triggered)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Button currently held
    pub pressed: bool,
}

/// Read-only world a tick runs against
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub level: &'a Level,
    pub tuning: &'a Tuning,
    /// Precomputed from the level once per attempt
    pub finish_x: f32,
}

impl<'a> TickContext<'a> {
    pub fn new(level: &'a Level, tuning: &'a Tuning) -> Self {
        Self {
            level,
            tuning,
            finish_x: level.finish_line(tuning),
        }
    }
}

/// Result of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Running,
    /// State was already dead or completed; nothing changed
    Frozen,
    Died(DeathCause),
    Completed,
}

/// Advance the attempt by one fixed timestep
///
/// Terminal states are frozen: ticking a dead or completed state returns
/// `Frozen` without touching it.
pub fn tick(
    state: &mut SimState,
    ctx: &TickContext,
    input: &TickInput,
    events: &mut Vec<SimEvent>,
) -> StepOutcome {
    if state.is_terminal() {
        return StepOutcome::Frozen;
    }

    let t = ctx.tuning;
    let dt = SIM_DT;
    // Sampled before collisions; portals take effect for integration next step
    let gravity_sign = state.gravity_sign();

    state.steps += 1;
    state.grounded = false;

    // Horizontal
    state.x += t.base_speed * state.speed_multiplier * dt;
    state.camera_x = state.x - t.camera_lead;

    // Vertical
    match state.mode {
        GameMode::Run => {
            state.vel_y += t.gravity * gravity_sign * dt;
        }
        GameMode::Fly => {
            if input.pressed {
                state.vel_y -= t.fly_thrust * gravity_sign * dt;
            } else {
                state.vel_y += t.gravity * gravity_sign * dt * t.fly_gravity_factor;
            }
            state.vel_y = state.vel_y.clamp(-t.fly_max_speed, t.fly_max_speed);
        }
    }
    state.y += state.vel_y * dt;

    if let Err(cause) = resolve_collisions(state, ctx.level, t, input, events) {
        return kill(state, cause, events);
    }

    clamp_to_world(state, t);

    // Jump (run mode only; fly thrust is continuous)
    if state.mode == GameMode::Run && input.pressed && state.grounded {
        state.vel_y = -gravity_sign * t.jump_velocity.abs();
        state.grounded = false;
        events.push(SimEvent::Jumped);
    }

    update_rotation(state, t);

    if state.y > t.fall_death_y || state.y < t.escape_death_y {
        return kill(state, DeathCause::OutOfBounds, events);
    }

    // Progress
    let percent = (100.0 * state.x / ctx.finish_x).floor().clamp(0.0, 100.0) as u8;
    state.percent = state.percent.max(percent);
    if state.percent >= 100 {
        state.completed = true;
        events.push(SimEvent::Completed);
        return StepOutcome::Completed;
    }

    StepOutcome::Running
}

/// Scan nearby objects in level order; the first lethal contact ends the scan
fn resolve_collisions(
    state: &mut SimState,
    level: &Level,
    t: &Tuning,
    input: &TickInput,
    events: &mut Vec<SimEvent>,
) -> Result<(), DeathCause> {
    let size = t.player_size;
    // Culling probe is taken once; resolution may move the player vertically only
    let probe = state.hitbox(size);

    for obj in level.nearby(&probe, t.culling_radius) {
        let player = state.hitbox(size);
        let bounds = obj.bounds();

        match obj.kind {
            ObjectKind::Platform => {
                if !player.overlaps(&bounds) {
                    continue;
                }
                let pen = Penetration::between(&player, &bounds);
                match classify_platform(
                    pen,
                    state.gravity_inverted,
                    t.side_hit_threshold,
                    t.landing_threshold,
                ) {
                    PlatformContact::SideHit => return Err(DeathCause::SideHit),
                    PlatformContact::Land => {
                        state.y = bounds.min.y - size;
                        state.vel_y = 0.0;
                        state.grounded = true;
                    }
                    PlatformContact::Hang => {
                        state.y = bounds.max.y;
                        state.vel_y = 0.0;
                        state.grounded = true;
                    }
                    PlatformContact::Crush => return Err(DeathCause::Crushed),
                }
            }
            ObjectKind::Hazard => {
                if hazard_overlap(&player, &bounds, t.hazard_margin) {
                    return Err(DeathCause::Hazard);
                }
            }
            ObjectKind::Orb => {
                // Fires every step while held inside the orb
                if input.pressed && player.overlaps(&bounds) {
                    state.vel_y = -state.gravity_sign() * t.orb_velocity();
                    events.push(SimEvent::OrbBoost);
                }
            }
            ObjectKind::Portal => {
                if player.overlaps(&bounds) {
                    apply_portal(state, obj, events);
                }
            }
            ObjectKind::Pad | ObjectKind::Checkpoint | ObjectKind::Deco => {}
        }
    }

    Ok(())
}

/// Idempotent flag assignment; an event is raised only on change
fn apply_portal(state: &mut SimState, obj: &LevelObject, events: &mut Vec<SimEvent>) {
    let Some(kind) = obj.portal_type else {
        return;
    };

    let changed = if let Some(mode) = kind.mode() {
        std::mem::replace(&mut state.mode, mode) != mode
    } else if let Some(inverted) = kind.gravity_inverted() {
        std::mem::replace(&mut state.gravity_inverted, inverted) != inverted
    } else if let Some(multiplier) = kind.speed_multiplier() {
        std::mem::replace(&mut state.speed_multiplier, multiplier) != multiplier
    } else {
        false
    };

    if changed {
        log::debug!("Portal '{}' ({:?}) at x={:.2}", obj.id, kind, state.x);
        events.push(SimEvent::PortalEntered(kind));
    }
}

/// Implicit floor (normal gravity), ceiling (inverted gravity) and the
/// fly-mode roof
fn clamp_to_world(state: &mut SimState, t: &Tuning) {
    let size = t.player_size;
    if !state.gravity_inverted {
        if state.y + size >= t.floor_y {
            state.y = t.floor_y - size;
            state.vel_y = 0.0;
            state.grounded = true;
        }
    } else if state.y <= t.ceiling_y {
        state.y = t.ceiling_y;
        state.vel_y = 0.0;
        state.grounded = true;
    }

    if state.mode == GameMode::Fly && state.y < t.ceiling_y {
        state.y = t.ceiling_y;
        state.vel_y = 0.0;
    }
}

/// Spin follows the gravity in effect after this step's portals
fn update_rotation(state: &mut SimState, t: &Tuning) {
    match state.mode {
        GameMode::Run => {
            if state.grounded {
                state.rotation = snap_angle(state.rotation, FRAC_PI_2);
            } else {
                state.rotation += state.gravity_sign() * t.spin_rate * SIM_DT;
            }
        }
        GameMode::Fly => {
            state.rotation = state.vel_y.atan2(t.base_speed) * t.fly_tilt_factor;
        }
    }
}

fn kill(state: &mut SimState, cause: DeathCause, events: &mut Vec<SimEvent>) -> StepOutcome {
    state.dead = true;
    events.push(SimEvent::Died(cause));
    StepOutcome::Died(cause)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{LevelMetadata, PortalKind};

    fn level(objects: Vec<LevelObject>) -> Level {
        Level::new(
            LevelMetadata {
                id: "tick-test".into(),
                name: "TICK TEST".into(),
                author: "SYSTEM".into(),
                bpm: 120.0,
                song_url: None,
                song_offset_ms: 0.0,
                difficulty: 1,
            },
            objects,
        )
    }

    fn run(
        state: &mut SimState,
        level: &Level,
        pressed: bool,
        steps: usize,
        events: &mut Vec<SimEvent>,
    ) -> StepOutcome {
        let tuning = Tuning::default();
        let ctx = TickContext::new(level, &tuning);
        let input = TickInput { pressed };
        let mut outcome = StepOutcome::Running;
        for _ in 0..steps {
            outcome = tick(state, &ctx, &input, events);
            if outcome != StepOutcome::Running {
                break;
            }
        }
        outcome
    }

    fn standing_at(x: f32) -> SimState {
        let mut state = SimState::default();
        state.x = x;
        state.y = 9.2;
        state.grounded = true;
        state
    }

    #[test]
    fn test_horizontal_speed_one_second() {
        let level = level(Vec::new());
        let mut state = SimState::default();
        let mut events = Vec::new();
        assert_eq!(run(&mut state, &level, false, 120, &mut events), StepOutcome::Running);
        assert_eq!(state.steps, 120);
        assert!((state.x - 10.4).abs() < 1e-3, "x = {}", state.x);
        assert!((state.camera_x - 5.4).abs() < 1e-3);
    }

    #[test]
    fn test_falls_and_lands_on_floor_platform() {
        let level = level(vec![LevelObject::new(
            "floor",
            ObjectKind::Platform,
            0.0,
            10.0,
            200.0,
            2.0,
        )]);
        let mut state = SimState::default();
        assert!(!state.grounded);
        let mut events = Vec::new();
        assert_eq!(run(&mut state, &level, false, 90, &mut events), StepOutcome::Running);
        assert!(state.grounded);
        assert_eq!(state.vel_y, 0.0);
        assert!((state.y - 9.2).abs() < 1e-5);
        assert!(!state.dead);
    }

    #[test]
    fn test_lands_on_raised_platform() {
        let level = level(vec![LevelObject::new(
            "ledge",
            ObjectKind::Platform,
            0.0,
            7.0,
            50.0,
            1.0,
        )]);
        let mut state = SimState::default();
        let mut events = Vec::new();
        run(&mut state, &level, false, 90, &mut events);
        assert!(state.grounded);
        assert_eq!(state.vel_y, 0.0);
        assert!((state.y - 6.2).abs() < 1e-5, "y = {}", state.y);
    }

    #[test]
    fn test_side_hit_is_lethal_while_rising() {
        let level = level(vec![LevelObject::new(
            "wall",
            ObjectKind::Platform,
            3.0,
            8.0,
            1.0,
            2.0,
        )]);
        let mut state = standing_at(2.15);
        state.y = 9.0;
        state.vel_y = -5.0;
        state.grounded = false;
        let mut events = Vec::new();
        let outcome = run(&mut state, &level, false, 1, &mut events);
        assert_eq!(outcome, StepOutcome::Died(DeathCause::SideHit));
        assert!(state.dead);
        assert_eq!(events, [SimEvent::Died(DeathCause::SideHit)]);
    }

    #[test]
    fn test_side_hit_is_lethal_while_falling() {
        let level = level(vec![LevelObject::new(
            "wall",
            ObjectKind::Platform,
            3.0,
            5.0,
            1.0,
            5.0,
        )]);
        let mut state = standing_at(2.15);
        state.y = 7.0;
        state.vel_y = 5.0;
        state.grounded = false;
        let mut events = Vec::new();
        let outcome = run(&mut state, &level, false, 1, &mut events);
        assert_eq!(outcome, StepOutcome::Died(DeathCause::SideHit));
    }

    #[test]
    fn test_deep_overlap_is_crush() {
        let level = level(vec![LevelObject::new(
            "block",
            ObjectKind::Platform,
            0.0,
            4.0,
            10.0,
            4.0,
        )]);
        let mut state = standing_at(3.0);
        state.y = 5.5;
        state.grounded = false;
        let mut events = Vec::new();
        let outcome = run(&mut state, &level, false, 1, &mut events);
        assert_eq!(outcome, StepOutcome::Died(DeathCause::Crushed));
    }

    #[test]
    fn test_stationary_hazard_overlap_is_lethal() {
        let level = level(vec![LevelObject::new(
            "spike",
            ObjectKind::Hazard,
            0.0,
            9.0,
            3.0,
            1.0,
        )]);
        let mut state = standing_at(1.0);
        let mut events = Vec::new();
        let outcome = run(&mut state, &level, false, 1, &mut events);
        assert_eq!(outcome, StepOutcome::Died(DeathCause::Hazard));
    }

    #[test]
    fn test_death_freezes_state() {
        let level = level(vec![LevelObject::new(
            "spike",
            ObjectKind::Hazard,
            0.0,
            9.0,
            3.0,
            1.0,
        )]);
        let mut state = standing_at(1.0);
        let mut events = Vec::new();
        run(&mut state, &level, false, 1, &mut events);
        let frozen = state.clone();
        assert_eq!(run(&mut state, &level, true, 10, &mut events), StepOutcome::Frozen);
        assert_eq!(state, frozen);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_jump_from_ground() {
        let level = level(Vec::new());
        let mut state = standing_at(0.0);
        let mut events = Vec::new();
        run(&mut state, &level, true, 1, &mut events);
        assert!(!state.grounded);
        assert_eq!(state.vel_y, -12.5);
        assert_eq!(events, [SimEvent::Jumped]);
    }

    #[test]
    fn test_orb_retriggers_every_step_while_held() {
        let level = level(vec![LevelObject::new(
            "orb",
            ObjectKind::Orb,
            0.0,
            0.0,
            20.0,
            9.0,
        )]);
        let mut state = SimState::default();
        let mut events = Vec::new();
        run(&mut state, &level, true, 3, &mut events);
        assert!((state.vel_y + 10.625).abs() < 1e-5);
        let boosts = events.iter().filter(|e| **e == SimEvent::OrbBoost).count();
        assert_eq!(boosts, 3);

        // Released inside the orb: plain gravity, no boost
        events.clear();
        run(&mut state, &level, false, 1, &mut events);
        assert!(events.is_empty());
        assert!(state.vel_y > -10.625);
    }

    #[test]
    fn test_orb_ignored_without_press() {
        let level = level(vec![LevelObject::new(
            "orb",
            ObjectKind::Orb,
            0.0,
            0.0,
            20.0,
            9.0,
        )]);
        let mut state = SimState::default();
        let mut events = Vec::new();
        run(&mut state, &level, false, 5, &mut events);
        assert!(state.vel_y > 0.0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_orb_boosts_downward_when_inverted() {
        let level = level(vec![LevelObject::new(
            "orb",
            ObjectKind::Orb,
            0.0,
            0.0,
            20.0,
            9.0,
        )]);
        let mut state = SimState::default();
        state.gravity_inverted = true;
        let mut events = Vec::new();
        run(&mut state, &level, true, 1, &mut events);
        assert!((state.vel_y - 10.625).abs() < 1e-5);
    }

    #[test]
    fn test_fly_portal_is_idempotent() {
        let level = level(vec![LevelObject::portal(
            "fly",
            PortalKind::ModeFly,
            0.0,
            0.0,
            5.0,
            10.0,
        )]);
        let mut state = SimState::default();
        let mut events = Vec::new();
        run(&mut state, &level, false, 10, &mut events);
        assert_eq!(state.mode, GameMode::Fly);
        let entered: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, SimEvent::PortalEntered(_)))
            .collect();
        assert_eq!(entered, [&SimEvent::PortalEntered(PortalKind::ModeFly)]);
    }

    #[test]
    fn test_run_portal_restores_jumping() {
        let level = level(vec![
            LevelObject::portal("fly", PortalKind::ModeFly, 0.0, 0.0, 1.0, 10.0),
            LevelObject::portal("run", PortalKind::ModeRun, 2.0, 0.0, 1.0, 10.0),
        ]);
        let mut state = standing_at(0.0);
        let mut events = Vec::new();
        run(&mut state, &level, false, 1, &mut events);
        assert_eq!(state.mode, GameMode::Fly);
        // Walk into the run portal along the floor
        run(&mut state, &level, false, 20, &mut events);
        assert_eq!(state.mode, GameMode::Run);
        assert!(state.grounded);
        events.clear();
        run(&mut state, &level, true, 1, &mut events);
        assert_eq!(events, [SimEvent::Jumped]);
    }

    #[test]
    fn test_fly_thrust_is_capped() {
        let level = level(Vec::new());
        let mut state = SimState::default();
        state.mode = GameMode::Fly;
        let mut events = Vec::new();
        run(&mut state, &level, true, 30, &mut events);
        assert_eq!(state.vel_y, -15.0);
        assert!(state.rotation < 0.0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_fly_roof_clamp() {
        let level = level(Vec::new());
        let mut state = SimState::default();
        state.mode = GameMode::Fly;
        let mut events = Vec::new();
        assert_eq!(run(&mut state, &level, true, 240, &mut events), StepOutcome::Running);
        assert_eq!(state.y, 0.0);
        assert_eq!(state.vel_y, 0.0);
    }

    #[test]
    fn test_inverted_gravity_hangs_from_ceiling() {
        let level = level(vec![LevelObject::portal(
            "inv",
            PortalKind::GravityInverted,
            0.0,
            0.0,
            2.0,
            10.0,
        )]);
        let mut state = SimState::default();
        let mut events = Vec::new();
        run(&mut state, &level, false, 180, &mut events);
        assert!(state.gravity_inverted);
        assert!(state.grounded);
        assert_eq!(state.y, 0.0);
    }

    #[test]
    fn test_hang_under_platform_when_inverted() {
        let level = level(vec![LevelObject::new(
            "roof",
            ObjectKind::Platform,
            0.0,
            2.0,
            50.0,
            1.0,
        )]);
        let mut state = SimState::default();
        state.gravity_inverted = true;
        let mut events = Vec::new();
        run(&mut state, &level, false, 120, &mut events);
        assert!(!state.dead);
        assert!(state.grounded);
        assert!((state.y - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_speed_portal() {
        let level = level(vec![LevelObject::portal(
            "fast",
            PortalKind::Speed150,
            0.0,
            0.0,
            1.0,
            10.0,
        )]);
        let mut state = SimState::default();
        let mut events = Vec::new();
        run(&mut state, &level, false, 1, &mut events);
        assert_eq!(state.speed_multiplier, 1.5);
        let x = state.x;
        run(&mut state, &level, false, 1, &mut events);
        assert!((state.x - x - 10.4 * 1.5 / 120.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_snaps_on_landing() {
        let level = level(Vec::new());
        let mut state = SimState::default();
        let mut events = Vec::new();
        run(&mut state, &level, false, 20, &mut events);
        assert!(state.rotation > 0.0);
        run(&mut state, &level, false, 100, &mut events);
        assert!(state.grounded);
        let quarter = state.rotation / FRAC_PI_2;
        assert!((quarter - quarter.round()).abs() < 1e-5);
    }

    #[test]
    fn test_spin_follows_gravity_portal_on_same_step() {
        let level = level(vec![LevelObject::portal(
            "inv",
            PortalKind::GravityInverted,
            0.0,
            0.0,
            2.0,
            10.0,
        )]);
        let mut state = SimState::default();
        let mut events = Vec::new();
        run(&mut state, &level, false, 1, &mut events);
        assert!(state.gravity_inverted);
        assert!(!state.grounded);
        assert!((state.rotation + 8.0 / 120.0).abs() < 1e-6, "rotation = {}", state.rotation);
    }

    #[test]
    fn test_zero_width_hazard_is_harmless() {
        let level = level(vec![LevelObject::new(
            "sliver",
            ObjectKind::Hazard,
            100.0,
            9.0,
            0.0,
            1.0,
        )]);
        let mut state = standing_at(99.5);
        let mut events = Vec::new();
        assert_eq!(run(&mut state, &level, false, 12, &mut events), StepOutcome::Running);
        assert!(!state.dead);
        assert!(state.x > 100.5);
    }

    #[test]
    fn test_escape_below_world_is_lethal() {
        let level = level(Vec::new());
        let mut state = SimState::default();
        state.gravity_inverted = true;
        state.y = 31.0;
        let mut events = Vec::new();
        assert_eq!(
            run(&mut state, &level, false, 1, &mut events),
            StepOutcome::Died(DeathCause::OutOfBounds)
        );
    }

    #[test]
    fn test_completion_at_finish_line() {
        let level = level(vec![LevelObject::new(
            "end",
            ObjectKind::Hazard,
            100.0,
            9.0,
            0.0,
            1.0,
        )]);
        let mut state = standing_at(109.95);
        state.percent = 99;
        let mut events = Vec::new();
        assert_eq!(run(&mut state, &level, false, 5, &mut events), StepOutcome::Completed);
        assert_eq!(state.percent, 100);
        assert!(state.completed);
        assert_eq!(events, [SimEvent::Completed]);
        assert_eq!(run(&mut state, &level, false, 5, &mut events), StepOutcome::Frozen);
        assert_eq!(events.len(), 1);
    }
}
