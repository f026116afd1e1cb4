//! Browser binding
//!
//! Exposes the simulation core to a JavaScript host: construct from level
//! JSON with two callbacks, push input, call `advance` from
//! `requestAnimationFrame`, read the state back.
//!
//! Callbacks run inside `advance`. They must not call back into the same
//! `WasmEngine` synchronously (schedule a restart instead).

use wasm_bindgen::prelude::*;

use crate::input::{InputLatch, InputSource};
use crate::levels;
use crate::progress::ProgressState;
use crate::settings::Settings;
use crate::sim::{Engine, GameMode, Level, SimEvent};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
    log::info!("Rhythm Grid core loaded");
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Wrap a JS function as an engine callback
fn callback(f: js_sys::Function, name: &'static str) -> impl FnMut() + 'static {
    move || {
        if let Err(e) = f.call0(&JsValue::NULL) {
            log::warn!("{} callback threw: {:?}", name, e);
        }
    }
}

fn source_from(code: u8) -> Option<InputSource> {
    match code {
        0 => Some(InputSource::Keyboard),
        1 => Some(InputSource::Mouse),
        2 => Some(InputSource::Touch),
        _ => None,
    }
}

#[wasm_bindgen]
pub struct WasmEngine {
    engine: Engine,
    latch: InputLatch,
    progress: ProgressState,
}

#[wasm_bindgen]
impl WasmEngine {
    /// Build from level JSON
    #[wasm_bindgen(constructor)]
    pub fn new(
        level_json: &str,
        on_death: js_sys::Function,
        on_complete: js_sys::Function,
    ) -> Result<WasmEngine, JsValue> {
        let level = Level::from_json(level_json).map_err(js_err)?;
        Ok(Self::with_level(level, on_death, on_complete))
    }

    /// Build from a built-in level id (`track-01` ...)
    pub fn builtin(
        id: &str,
        on_death: js_sys::Function,
        on_complete: js_sys::Function,
    ) -> Result<WasmEngine, JsValue> {
        let level = levels::by_id(id).map_err(js_err)?;
        Ok(Self::with_level(level, on_death, on_complete))
    }

    fn with_level(level: Level, on_death: js_sys::Function, on_complete: js_sys::Function) -> Self {
        let mut progress = ProgressState::load();
        progress.start_attempt(&level.metadata.id);
        Self {
            engine: Engine::new(
                level,
                callback(on_death, "onDeath"),
                callback(on_complete, "onComplete"),
            ),
            latch: InputLatch::new(),
            progress,
        }
    }

    /// Raw logical button
    #[wasm_bindgen(js_name = setInput)]
    pub fn set_input(&mut self, active: bool) {
        self.engine.set_input(active);
    }

    /// Physical source down/up (0 keyboard, 1 mouse, 2 touch)
    #[wasm_bindgen(js_name = sourceInput)]
    pub fn source_input(&mut self, source: u8, down: bool) {
        let Some(source) = source_from(source) else {
            log::warn!("Unknown input source {}", source);
            return;
        };
        if let Some(pressed) = self.latch.set(source, down) {
            self.engine.set_input(pressed);
        }
    }

    /// Drop all held sources (window blur)
    #[wasm_bindgen(js_name = releaseAll)]
    pub fn release_all(&mut self) {
        if let Some(pressed) = self.latch.clear() {
            self.engine.set_input(pressed);
        }
    }

    pub fn advance(&mut self, timestamp_ms: f64) {
        self.engine.advance(timestamp_ms);
    }

    pub fn restart(&mut self) {
        self.latch.clear();
        self.engine.restart();
        self.progress.start_attempt(&self.engine.level().metadata.id);
        self.progress.save();
    }

    /// Full state snapshot as JSON
    #[wasm_bindgen(js_name = stateJson)]
    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.engine.state()).map_err(js_err)
    }

    /// Events since the last call, as a JSON array. Also folds them into
    /// the saved progress.
    #[wasm_bindgen(js_name = drainEventsJson)]
    pub fn drain_events_json(&mut self) -> Result<String, JsValue> {
        let events = self.engine.drain_events();
        self.progress.record_events(&events);
        let ended = events
            .iter()
            .any(|e| matches!(e, SimEvent::Died(_) | SimEvent::Completed));
        if ended {
            let state = self.engine.state();
            let id = &self.engine.level().metadata.id;
            self.progress.record_percent(id, state.percent);
            self.progress.save();
        }
        serde_json::to_string(&events).map_err(js_err)
    }

    #[wasm_bindgen(js_name = bestPercent)]
    pub fn best_percent(&self) -> u8 {
        self.progress.best_percent(&self.engine.level().metadata.id)
    }

    #[wasm_bindgen(js_name = progressJson)]
    pub fn progress_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.progress).map_err(js_err)
    }

    #[wasm_bindgen(js_name = levelJson)]
    pub fn level_json(&self) -> Result<String, JsValue> {
        self.engine.level().to_json().map_err(js_err)
    }

    // Per-frame getters (avoid JSON on the hot path)

    pub fn x(&self) -> f32 {
        self.engine.state().x
    }

    pub fn y(&self) -> f32 {
        self.engine.state().y
    }

    pub fn rotation(&self) -> f32 {
        self.engine.state().rotation
    }

    #[wasm_bindgen(js_name = cameraX)]
    pub fn camera_x(&self) -> f32 {
        self.engine.state().camera_x
    }

    pub fn percent(&self) -> u8 {
        self.engine.state().percent
    }

    pub fn dead(&self) -> bool {
        self.engine.state().dead
    }

    pub fn completed(&self) -> bool {
        self.engine.state().completed
    }

    pub fn flying(&self) -> bool {
        self.engine.state().mode == GameMode::Fly
    }

    #[wasm_bindgen(js_name = gravityInverted)]
    pub fn gravity_inverted(&self) -> bool {
        self.engine.state().gravity_inverted
    }

    pub fn attempt(&self) -> u32 {
        self.engine.attempt()
    }
}

/// Metadata of every built-in level, as JSON
#[wasm_bindgen(js_name = builtinLevelsJson)]
pub fn builtin_levels_json() -> Result<String, JsValue> {
    let metadata: Vec<_> = levels::builtin().into_iter().map(|l| l.metadata).collect();
    serde_json::to_string(&metadata).map_err(js_err)
}

#[wasm_bindgen(js_name = loadSettingsJson)]
pub fn load_settings_json() -> Result<String, JsValue> {
    serde_json::to_string(&Settings::load()).map_err(js_err)
}

/// Validate, clamp and persist settings; returns what was stored
#[wasm_bindgen(js_name = saveSettingsJson)]
pub fn save_settings_json(json: &str) -> Result<String, JsValue> {
    let settings = serde_json::from_str::<Settings>(json)
        .map_err(js_err)?
        .sanitized();
    settings.save();
    serde_json::to_string(&settings).map_err(js_err)
}
