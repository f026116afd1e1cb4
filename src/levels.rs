//! Built-in level catalogue
//!
//! Four hand-authored tracks, each followed by a long tail of repeating
//! segments, plus a seeded quick-play generator that draws the same
//! segments in random order.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::error::LoadError;
use crate::sim::{Level, LevelMetadata, LevelObject, ObjectKind, PortalKind};

const SONG: &str = "/audio/A Lonely Cherry Tree 🌸 - Pix.mp3";

/// Number of distinct tail segment patterns
pub const SEGMENT_PATTERNS: u32 = 6;

fn platform(id: impl Into<String>, x: f32, y: f32, w: f32, h: f32) -> LevelObject {
    LevelObject::new(id, ObjectKind::Platform, x, y, w, h)
}

/// 1x1 spike
fn spike(id: impl Into<String>, x: f32, y: f32) -> LevelObject {
    LevelObject::new(id, ObjectKind::Hazard, x, y, 1.0, 1.0)
}

/// Ceiling spike, drawn upside down
fn ceiling_spike(id: impl Into<String>, x: f32, y: f32) -> LevelObject {
    spike(id, x, y).with_rotation(180.0)
}

fn orb(id: impl Into<String>, x: f32, y: f32) -> LevelObject {
    LevelObject::new(id, ObjectKind::Orb, x, y, 1.0, 1.0)
}

/// Standard 1x4 portal standing on the floor line
fn portal(id: impl Into<String>, kind: PortalKind, x: f32) -> LevelObject {
    LevelObject::portal(id, kind, x, 7.0, 1.0, 4.0)
}

fn metadata(id: &str, name: &str, bpm: f32, difficulty: u8) -> LevelMetadata {
    LevelMetadata {
        id: id.to_string(),
        name: name.to_string(),
        author: "SYSTEM".to_string(),
        bpm,
        song_url: Some(SONG.to_string()),
        song_offset_ms: 0.0,
        difficulty,
    }
}

/// Append one tail segment starting at `x`; returns where the next begins
fn push_segment(
    objs: &mut Vec<LevelObject>,
    pid: &str,
    x: f32,
    pattern: u32,
    width: f32,
    difficulty: u8,
) -> f32 {
    objs.push(platform(format!("{pid}-floor"), x, 10.0, width, 2.0));

    match pattern {
        0 => {
            objs.push(spike(format!("{pid}-s1"), x + 7.0, 9.0));
            objs.push(spike(format!("{pid}-s2"), x + 8.0, 9.0));
            if difficulty >= 5 {
                objs.push(spike(format!("{pid}-s3"), x + 14.0, 9.0));
            }
            objs.push(platform(format!("{pid}-b1"), x + width - 7.0, 7.0, 5.0, 1.0));
        }
        1 => {
            objs.push(platform(format!("{pid}-step1"), x + 6.0, 8.0, 4.0, 1.0));
            objs.push(platform(format!("{pid}-step2"), x + 13.0, 6.0, 4.0, 1.0));
            objs.push(orb(format!("{pid}-orb"), x + 11.0, 7.0));
            if difficulty >= 8 {
                objs.push(spike(format!("{pid}-s1"), x + 18.0, 9.0));
            }
        }
        2 => {
            objs.push(platform(format!("{pid}-archL"), x + 8.0, 5.0, 2.0, 5.0));
            objs.push(platform(format!("{pid}-archR"), x + 15.0, 5.0, 2.0, 5.0));
            objs.push(spike(format!("{pid}-s1"), x + 11.0, 9.0));
            objs.push(spike(format!("{pid}-s2"), x + 12.0, 9.0));
            if difficulty >= 5 {
                objs.push(platform(format!("{pid}-top"), x + 10.0, 4.0, 5.0, 1.0));
            }
        }
        3 if difficulty >= 4 => {
            // Fly corridor replaces the regular segment width
            let fly_len = 30.0 + if difficulty >= 8 { 8.0 } else { 0.0 };
            objs.push(portal(format!("{pid}-flyIn"), PortalKind::ModeFly, x + 4.0));
            objs.push(platform(format!("{pid}-flyFloor"), x + 4.0, 13.0, fly_len, 1.0));
            objs.push(platform(format!("{pid}-flyCeil"), x + 4.0, 0.0, fly_len, 1.0));
            let mut sx = x + 8.0;
            while sx < x + fly_len {
                objs.push(ceiling_spike(format!("{pid}-ceilSpike-{sx}"), sx, 1.0));
                sx += 4.0;
            }
            objs.push(platform(format!("{pid}-flyP1"), x + 12.0, 3.0, 2.0, 7.0));
            objs.push(platform(format!("{pid}-flyP2"), x + 20.0, 6.0, 2.0, 4.0));
            if difficulty >= 8 {
                objs.push(platform(format!("{pid}-flyP3"), x + 28.0, 4.0, 2.0, 6.0));
            }
            objs.push(portal(format!("{pid}-flyOut"), PortalKind::ModeRun, x + fly_len + 2.0));
            objs.push(platform(format!("{pid}-land"), x + fly_len + 2.0, 10.0, 12.0, 2.0));
            return x + fly_len + 10.0;
        }
        4 => {
            objs.push(spike(format!("{pid}-s1"), x + 6.0, 9.0));
            objs.push(spike(format!("{pid}-s2"), x + 10.0, 9.0));
            objs.push(spike(format!("{pid}-s3"), x + 14.0, 9.0));
            if difficulty >= 5 {
                objs.push(spike(format!("{pid}-s4"), x + 15.0, 9.0));
            }
            objs.push(platform(format!("{pid}-lift"), x + width - 8.0, 7.0, 6.0, 1.0));
        }
        // Orb run (also stands in for the fly corridor on easy tracks)
        _ => {
            let high = if difficulty >= 8 { 6.0 } else { 7.0 };
            objs.push(orb(format!("{pid}-orb1"), x + 8.0, 7.0));
            objs.push(orb(format!("{pid}-orb2"), x + 15.0, high));
            objs.push(platform(format!("{pid}-b1"), x + 18.0, 6.0, 5.0, 1.0));
            objs.push(spike(format!("{pid}-s1"), x + width - 5.0, 9.0));
        }
    }

    x + width + 6.0
}

/// Repeating tail: patterns cycle 0..6, widths cycle 24/30/36
pub fn long_tail(prefix: &str, start_x: f32, segments: u32, difficulty: u8) -> Vec<LevelObject> {
    let mut objs = Vec::new();
    let mut x = start_x;
    for i in 0..segments {
        let width = 24.0 + ((i + difficulty as u32) % 3) as f32 * 6.0;
        x = push_segment(
            &mut objs,
            &format!("{prefix}-{i}"),
            x,
            i % SEGMENT_PATTERNS,
            width,
            difficulty,
        );
    }
    objs
}

/// Seeded level built from randomly drawn tail segments
///
/// The same seed and difficulty always produce the same level.
pub fn quick_play(seed: u64, difficulty: u8) -> Level {
    let difficulty = difficulty.clamp(1, 10);
    let mut rng = Pcg32::seed_from_u64(seed);
    let segments = 12 + difficulty as u32;

    // Flat run-up before the first segment
    let mut objs = vec![platform("q-start", 0.0, 10.0, 30.0, 2.0)];
    let mut x = 36.0;
    for i in 0..segments {
        let pattern = rng.random_range(0..SEGMENT_PATTERNS);
        let width = 24.0 + rng.random_range(0..3u32) as f32 * 6.0;
        x = push_segment(&mut objs, &format!("q-{i}"), x, pattern, width, difficulty);
    }

    log::debug!(
        "Quick play seed={} difficulty={} -> {} objects",
        seed,
        difficulty,
        objs.len()
    );

    Level::new(
        LevelMetadata {
            id: format!("quick-{seed:016x}"),
            name: "QUICK PLAY".to_string(),
            author: "GENERATOR".to_string(),
            bpm: 120.0 + difficulty as f32 * 4.0,
            song_url: Some(SONG.to_string()),
            song_offset_ms: 0.0,
            difficulty,
        },
        objs,
    )
}

fn stereo_madness() -> Level {
    let mut objs = vec![
        // Starting straight
        platform("f1", 0.0, 10.0, 50.0, 2.0),
        spike("s1", 18.0, 9.0),
        spike("s2", 28.0, 9.0),
        spike("s3", 29.0, 9.0),
        // First blocks
        platform("b1", 40.0, 8.0, 3.0, 1.0),
        platform("b2", 46.0, 6.0, 3.0, 1.0),
        // Gap
        platform("f2", 55.0, 10.0, 40.0, 2.0),
        spike("s4", 60.0, 9.0),
        spike("s5", 61.0, 9.0),
        // Higher path
        platform("b3", 70.0, 7.0, 10.0, 1.0),
        spike("s6", 75.0, 6.0),
        // Orb jump
        platform("f3", 100.0, 10.0, 50.0, 2.0),
        orb("o1", 105.0, 7.0),
        platform("b4", 112.0, 5.0, 5.0, 1.0),
        // Ship section
        portal("p1", PortalKind::ModeFly, 130.0),
        platform("floor", 130.0, 13.0, 100.0, 1.0),
        platform("ceil", 130.0, 0.0, 100.0, 1.0),
    ];
    for (i, x) in (138..=194).step_by(8).enumerate() {
        objs.push(ceiling_spike(format!("cs{}", i + 1), x as f32, 1.0));
    }
    objs.extend([
        platform("h1", 150.0, 4.0, 2.0, 6.0),
        platform("h2", 170.0, 6.0, 2.0, 4.0),
        platform("h3", 190.0, 3.0, 2.0, 7.0),
        // Exit ship
        portal("p2", PortalKind::ModeRun, 210.0),
        platform("f4", 210.0, 10.0, 50.0, 2.0),
        // End sequence
        spike("s7", 230.0, 9.0),
        spike("s8", 231.0, 9.0),
        spike("s9", 232.0, 9.0),
        platform("f5", 260.0, 10.0, 10.0, 2.0),
    ]);
    objs.extend(long_tail("t", 280.0, 18, 1));

    Level::new(metadata("track-01", "STEREO MADNESS", 128.0, 1), objs)
}

fn neon_path() -> Level {
    let mut objs = vec![
        platform("e-f1", 0.0, 10.0, 60.0, 2.0),
        spike("e-s1", 22.0, 9.0),
        spike("e-s2", 36.0, 9.0),
        platform("e-b1", 55.0, 8.0, 6.0, 1.0),
        platform("e-f2", 70.0, 10.0, 50.0, 2.0),
        orb("e-o1", 80.0, 7.0),
        platform("e-b2", 88.0, 6.0, 6.0, 1.0),
        spike("e-s3", 98.0, 9.0),
        platform("e-f3", 110.0, 10.0, 45.0, 2.0),
        platform("e-b3", 125.0, 7.0, 6.0, 1.0),
        spike("e-s4", 135.0, 9.0),
        platform("e-f4", 150.0, 10.0, 40.0, 2.0),
        spike("e-s5", 165.0, 9.0),
        platform("e-f5", 180.0, 10.0, 30.0, 2.0),
    ];
    objs.extend(long_tail("e", 220.0, 20, 2));

    Level::new(metadata("track-02", "NEON PATH", 120.0, 2), objs)
}

fn pulse_drive() -> Level {
    let mut objs = vec![
        platform("n-f1", 0.0, 10.0, 45.0, 2.0),
        spike("n-s1", 18.0, 9.0),
        spike("n-s2", 26.0, 9.0),
        platform("n-b1", 40.0, 7.0, 6.0, 1.0),
        platform("n-f2", 52.0, 10.0, 35.0, 2.0),
        orb("n-o1", 60.0, 7.0),
        platform("n-b2", 70.0, 6.0, 5.0, 1.0),
        spike("n-s3", 80.0, 9.0),
        portal("n-p1", PortalKind::ModeFly, 90.0),
        platform("n-floor", 90.0, 13.0, 60.0, 1.0),
        platform("n-ceil", 90.0, 0.0, 60.0, 1.0),
    ];
    for (i, x) in (98..=138).step_by(8).enumerate() {
        objs.push(ceiling_spike(format!("n-cs{}", i + 1), x as f32, 1.0));
    }
    objs.extend([
        platform("n-h1", 104.0, 4.0, 2.0, 6.0),
        platform("n-h2", 118.0, 7.0, 2.0, 4.0),
        platform("n-h3", 132.0, 3.0, 2.0, 7.0),
        portal("n-p2", PortalKind::ModeRun, 150.0),
        platform("n-f3", 150.0, 10.0, 40.0, 2.0),
        spike("n-s4", 165.0, 9.0),
        spike("n-s5", 172.0, 9.0),
        platform("n-f4", 185.0, 10.0, 35.0, 2.0),
    ]);
    objs.extend(long_tail("n", 230.0, 20, 5));

    Level::new(metadata("track-03", "PULSE DRIVE", 140.0, 5), objs)
}

fn edge_shift() -> Level {
    let mut objs = vec![
        platform("h-f1", 0.0, 10.0, 35.0, 2.0),
        spike("h-s1", 12.0, 9.0),
        spike("h-s2", 13.0, 9.0),
        spike("h-s3", 20.0, 9.0),
        platform("h-b1", 28.0, 6.0, 5.0, 1.0),
        orb("h-o1", 32.0, 5.0),
        platform("h-b2", 40.0, 7.0, 5.0, 1.0),
        platform("h-f2", 52.0, 10.0, 30.0, 2.0),
        spike("h-s4", 60.0, 9.0),
        spike("h-s5", 61.0, 9.0),
        portal("h-p1", PortalKind::ModeFly, 70.0),
        platform("h-floor", 70.0, 13.0, 80.0, 1.0),
        platform("h-ceil", 70.0, 0.0, 80.0, 1.0),
    ];
    for (i, x) in (78..=132).step_by(6).enumerate() {
        objs.push(ceiling_spike(format!("h-cs{}", i + 1), x as f32, 1.0));
    }
    objs.extend([
        platform("h-h1", 86.0, 2.0, 2.0, 9.0),
        platform("h-h2", 100.0, 6.0, 2.0, 5.0),
        platform("h-h3", 114.0, 3.0, 2.0, 8.0),
        platform("h-h4", 128.0, 5.0, 2.0, 6.0),
        portal("h-p2", PortalKind::ModeRun, 150.0),
        platform("h-f3", 150.0, 10.0, 40.0, 2.0),
        spike("h-s6", 162.0, 9.0),
        spike("h-s7", 170.0, 9.0),
        spike("h-s8", 178.0, 9.0),
        platform("h-f4", 190.0, 10.0, 30.0, 2.0),
    ]);
    objs.extend(long_tail("h", 230.0, 22, 8));

    Level::new(metadata("track-04", "EDGE SHIFT", 160.0, 8), objs)
}

/// All built-in levels, easiest first
pub fn builtin() -> Vec<Level> {
    vec![stereo_madness(), neon_path(), pulse_drive(), edge_shift()]
}

/// Look up a built-in level by metadata id
pub fn by_id(id: &str) -> Result<Level, LoadError> {
    builtin()
        .into_iter()
        .find(|level| level.metadata.id == id)
        .ok_or_else(|| LoadError::UnknownLevel(id.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::tuning::Tuning;

    #[test]
    fn test_catalogue() {
        let levels = builtin();
        let ids: Vec<_> = levels.iter().map(|l| l.metadata.id.as_str()).collect();
        assert_eq!(ids, ["track-01", "track-02", "track-03", "track-04"]);
        let difficulties: Vec<_> = levels.iter().map(|l| l.metadata.difficulty).collect();
        assert_eq!(difficulties, [1, 2, 5, 8]);
    }

    #[test]
    fn test_object_ids_unique() {
        for level in builtin() {
            let mut seen = HashSet::new();
            for obj in &level.objects {
                assert!(
                    seen.insert(obj.id.as_str()),
                    "duplicate id {} in {}",
                    obj.id,
                    level.metadata.id
                );
            }
        }
    }

    #[test]
    fn test_ceiling_spike_rows() {
        let count = |level: &Level, prefix: &str| {
            level
                .objects
                .iter()
                .filter(|o| o.id.starts_with(prefix) && o.rotation == Some(180.0))
                .count()
        };
        let levels = builtin();
        assert_eq!(count(&levels[0], "cs"), 8);
        assert_eq!(count(&levels[2], "n-cs"), 6);
        assert_eq!(count(&levels[3], "h-cs"), 10);
    }

    #[test]
    fn test_tail_layout() {
        // Difficulty 1: pattern 3 falls back to the orb run, widths 30/36/24...
        let tail = long_tail("t", 280.0, 6, 1);
        assert_eq!(tail[0].id, "t-0-floor");
        assert_eq!(tail[0].x, 280.0);
        assert_eq!(tail[0].w, 30.0);
        assert!(tail.iter().all(|o| o.kind != ObjectKind::Portal));

        // Difficulty 5 gets the fly corridor
        let tail = long_tail("n", 0.0, 4, 5);
        let portals: Vec<_> = tail
            .iter()
            .filter_map(|o| o.portal_type)
            .collect();
        assert_eq!(portals, [PortalKind::ModeFly, PortalKind::ModeRun]);
    }

    #[test]
    fn test_finish_lines_are_past_the_tail() {
        let tuning = Tuning::default();
        for level in builtin() {
            let finish = level.finish_line(&tuning);
            let last = level.objects.last().unwrap();
            assert!(finish >= last.extent() + tuning.finish_margin);
        }
    }

    #[test]
    fn test_by_id() {
        assert_eq!(by_id("track-03").unwrap().metadata.name, "PULSE DRIVE");
        assert!(matches!(by_id("track-99"), Err(LoadError::UnknownLevel(_))));
    }

    #[test]
    fn test_quick_play_is_seeded() {
        let a = quick_play(42, 6);
        let b = quick_play(42, 6);
        let c = quick_play(43, 6);
        assert_eq!(a, b);
        assert_ne!(a.objects, c.objects);
        assert_eq!(a.metadata.difficulty, 6);
        assert_eq!(quick_play(1, 0).metadata.difficulty, 1);
    }
}
