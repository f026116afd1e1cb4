//! Player settings and preferences
//!
//! Persisted separately from progress in LocalStorage. The simulation never
//! reads these; hosts use them for audio/visual sync and presentation.

use serde::{Deserialize, Serialize};

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    // === Audio ===
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Shift of the music against the simulation clock (ms)
    pub audio_offset: f32,
    /// Shift of the drawn frame against the simulation clock (ms)
    pub visual_offset: f32,

    // === Visual Effects ===
    pub show_hitboxes: bool,
    pub screen_shake: bool,
    pub bloom_enabled: bool,
    pub particles_enabled: bool,
    pub parallax_enabled: bool,
    /// Player icon skin index
    pub skin_id: u32,

    // === Display ===
    /// Frame rate cap (0 = display refresh rate)
    pub fps_cap: u32,

    // === Accessibility ===
    /// Reduced motion (no shake, no parallax)
    pub reduce_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_volume: 0.7,
            sfx_volume: 0.5,
            audio_offset: 0.0,
            visual_offset: 0.0,

            show_hitboxes: false,
            screen_shake: true,
            bloom_enabled: true,
            particles_enabled: true,
            parallax_enabled: true,
            skin_id: 0,

            fps_cap: 0,

            reduce_motion: false,
        }
    }
}

/// Largest accepted audio/visual offset either way (ms)
pub const MAX_OFFSET_MS: f32 = 500.0;

impl Settings {
    /// Clamp values a stale or hand-edited save may have out of range
    pub fn sanitized(mut self) -> Self {
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.audio_offset = self.audio_offset.clamp(-MAX_OFFSET_MS, MAX_OFFSET_MS);
        self.visual_offset = self.visual_offset.clamp(-MAX_OFFSET_MS, MAX_OFFSET_MS);
        self
    }

    /// Effective screen shake (respects reduce_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduce_motion
    }

    /// Effective parallax (respects reduce_motion)
    pub fn effective_parallax(&self) -> bool {
        self.parallax_enabled && !self.reduce_motion
    }

    /// Minimum time between presented frames, if capped
    pub fn frame_interval_ms(&self) -> Option<f64> {
        (self.fps_cap > 0).then(|| 1000.0 / self.fps_cap as f64)
    }

    /// Host timestamp at which to start the music for a simulation that
    /// starts at `sim_start_ms`
    pub fn music_start_ms(&self, sim_start_ms: f64, song_offset_ms: f32) -> f64 {
        sim_start_ms + song_offset_ms as f64 + self.audio_offset as f64
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "rhythm_grid_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<Settings>(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings.sanitized();
                    }
                    Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_partial_json() {
        let settings: Settings = serde_json::from_str(r#"{ "sfxVolume": 0.2 }"#).unwrap();
        assert_eq!(settings.sfx_volume, 0.2);
        assert_eq!(settings.music_volume, 0.7);
        assert!(settings.screen_shake);
    }

    #[test]
    fn test_sanitized() {
        let settings = Settings {
            music_volume: 3.0,
            sfx_volume: -1.0,
            audio_offset: 9000.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings.music_volume, 1.0);
        assert_eq!(settings.sfx_volume, 0.0);
        assert_eq!(settings.audio_offset, MAX_OFFSET_MS);
    }

    #[test]
    fn test_reduce_motion_overrides_effects() {
        let settings = Settings {
            reduce_motion: true,
            ..Default::default()
        };
        assert!(!settings.effective_screen_shake());
        assert!(!settings.effective_parallax());
        assert!(Settings::default().effective_screen_shake());
    }

    #[test]
    fn test_frame_interval() {
        assert_eq!(Settings::default().frame_interval_ms(), None);
        let capped = Settings {
            fps_cap: 50,
            ..Default::default()
        };
        assert_eq!(capped.frame_interval_ms(), Some(20.0));
    }

    #[test]
    fn test_music_start_applies_offsets() {
        let settings = Settings {
            audio_offset: -40.0,
            ..Default::default()
        };
        assert_eq!(settings.music_start_ms(1000.0, 100.0), 1060.0);
    }
}
