//! wasm bindings for the host engine
//!
//! The host (a JS game engine) owns rendering, audio and dialogs. Each frame it
//! calls `frame` with the elapsed time and input intents, then reads the
//! snapshot and drained events to update sprites and UI.

use wasm_bindgen::prelude::*;

use crate::consts::*;
use crate::sim::{ArcadeEngine, Command, Session, TickInput};
use crate::GameConfig;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Key Runner core loaded");
}

/// Session handle owned by the page
#[wasm_bindgen]
pub struct WebSession {
    session: Session,
    engine: ArcadeEngine,
    accumulator: f32,
    input: TickInput,
}

impl WebSession {
    fn with_config(config: GameConfig, seed: u64) -> Result<WebSession, JsValue> {
        let engine = ArcadeEngine::new(&config);
        let session = Session::new(config, seed).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WebSession {
            session,
            engine,
            accumulator: 0.0,
            input: TickInput::default(),
        })
    }
}

#[wasm_bindgen]
impl WebSession {
    /// Build a session from the stored config (or defaults)
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebSession, JsValue> {
        let config = GameConfig::load();
        let seed = (js_sys::Math::random() * u32::MAX as f64) as u64;
        Self::with_config(config, seed)
    }

    /// Build a session from a JSON config document
    pub fn from_json(json: &str, seed: u64) -> Result<WebSession, JsValue> {
        let config = GameConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Self::with_config(config, seed)
    }

    /// Update held input intents
    pub fn set_input(&mut self, left: bool, right: bool, jump: bool) {
        self.input.left = left;
        self.input.right = right;
        self.input.jump = jump;
    }

    /// Pointer pressed (one-shot jump)
    pub fn tap(&mut self) {
        self.input.tap = true;
    }

    /// Info panel button pressed
    pub fn continue_game(&mut self) {
        self.session.submit(Command::Continue);
    }

    /// Restart button pressed
    pub fn restart(&mut self) {
        self.session.submit(Command::Restart);
    }

    /// Run fixed-step ticks for `dt` seconds of wall time.
    /// Returns the drained events as JSON.
    pub fn frame(&mut self, dt: f32) -> String {
        self.accumulator += dt.min(0.1);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = self.input.clone();
            self.session.tick(&mut self.engine, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.tap = false;
        }

        let events = self.session.drain_events();
        serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())
    }

    /// Current world (player, platforms, obstacles, keys, camera) as JSON
    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.session.state().world).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn score(&self) -> u64 {
        self.session.state().score()
    }
}
