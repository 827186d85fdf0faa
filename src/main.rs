//! RULEBOUND: a block-pushing puzzle where the words are the rules
//!
//! Push the word-blocks around to rewrite what everything does:
//! - BABA IS YOU decides what the pointer drags around
//! - WALL IS STOP, ROCK IS PUSH, SKULL IS DEFEAT shape the board
//! - reach whatever IS WIN
//!
//! Usage: `rulebound [level.ron]`. Set `RUST_LOG=debug` for collision traces.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod config;
mod game;
mod input;
mod level;

use macroquad::prelude::*;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use config::EngineConfig;
use game::{renderer, Engine};
use input::{DragGesture, GestureEvent, PlayLayout, PointerState};
use level::{load_level, Level};

/// Width of the rule list to the right of the board
const PANEL_WIDTH: f32 = 240.0;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("RULEBOUND v{}", VERSION),
        window_width: 960,
        window_height: 600,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Level named by the config, or the built-in one.
fn choose_level(config: &EngineConfig) -> Level {
    let Some(path) = &config.level else {
        return Level::builtin();
    };
    match load_level(path) {
        Ok(level) => level,
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to load level, using built-in");
            Level::builtin()
        }
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    init_tracing();
    info!("=== RULEBOUND v{} ===", VERSION);

    let mut config = EngineConfig::load_or_default();
    if let Some(path) = std::env::args().nth(1) {
        config = config.with_level(path);
    }
    let level = choose_level(&config);
    let mut engine = Engine::from_level(&level, &config);
    let mut gesture = DragGesture::default();

    loop {
        clear_background(Color::new(0.03, 0.03, 0.04, 1.0));

        let panel_width = if config.show_rules { PANEL_WIDTH } else { 0.0 };
        let board_slot = Rect::new(0.0, 0.0, (screen_width() - panel_width).max(1.0), screen_height());
        let layout = PlayLayout::fit(board_slot, config.play_width, config.play_height);
        let pointer = PointerState::poll(&layout);

        if pointer.left_pressed {
            let target = engine.hit(pointer.position.x, pointer.position.y);
            gesture.press(pointer.position, target);
        }
        if pointer.left_down {
            if let Some(GestureEvent::Drag { delta, target }) = gesture.motion(pointer.position) {
                engine.drag(delta.x, delta.y, target);
            }
        }
        if pointer.left_released {
            if let Some(GestureEvent::Click { at, target }) = gesture.release(pointer.position) {
                debug!(x = at.x, y = at.y, ?target, "click");
            }
        }

        renderer::draw_board(&mut engine, &layout);
        if config.show_rules {
            let panel = Rect::new(board_slot.w, 0.0, panel_width, screen_height());
            renderer::draw_rule_panel(&engine, panel);
        }
        if engine.has_won() {
            renderer::draw_win_banner(&layout);
        }

        next_frame().await
    }
}
