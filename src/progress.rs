//! Player progress record
//!
//! Persisted to LocalStorage: best percent and attempt count per level, plus
//! a lifetime jump counter fed from simulation events.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sim::SimEvent;

/// Progress across all levels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressState {
    /// Level id -> best percent reached
    pub completed_levels: BTreeMap<String, u8>,
    /// Level id -> attempts started
    pub attempts: BTreeMap<String, u32>,
    /// Jumps and orb boosts over all attempts
    pub total_jumps: u64,
}

impl ProgressState {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "rhythm_grid_progress";

    pub fn new() -> Self {
        Self::default()
    }

    /// Count a new attempt; returns the attempt number (1-based)
    pub fn start_attempt(&mut self, level_id: &str) -> u32 {
        let attempts = self.attempts.entry(level_id.to_string()).or_insert(0);
        *attempts += 1;
        *attempts
    }

    /// Fold one attempt's events into the lifetime counters
    pub fn record_events(&mut self, events: &[SimEvent]) {
        let jumps = events
            .iter()
            .filter(|e| matches!(e, SimEvent::Jumped | SimEvent::OrbBoost))
            .count();
        self.total_jumps += jumps as u64;
    }

    /// Record the percent an attempt reached. Returns true on a new best.
    pub fn record_percent(&mut self, level_id: &str, percent: u8) -> bool {
        let percent = percent.min(100);
        let best = self.completed_levels.entry(level_id.to_string()).or_insert(0);
        if percent > *best {
            log::info!("New best on {}: {}% (was {}%)", level_id, percent, *best);
            *best = percent;
            true
        } else {
            false
        }
    }

    pub fn best_percent(&self, level_id: &str) -> u8 {
        self.completed_levels.get(level_id).copied().unwrap_or(0)
    }

    pub fn is_completed(&self, level_id: &str) -> bool {
        self.best_percent(level_id) >= 100
    }

    pub fn attempts_on(&self, level_id: &str) -> u32 {
        self.attempts.get(level_id).copied().unwrap_or(0)
    }

    /// Load progress from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<ProgressState>(&json) {
                    Ok(progress) => {
                        log::info!("Loaded progress for {} levels", progress.attempts.len());
                        return progress;
                    }
                    Err(e) => log::warn!("Ignoring unreadable progress: {}", e),
                }
            }
        }

        log::info!("No progress found, starting fresh");
        Self::new()
    }

    /// Save progress to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Progress saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
