//! Board Renderer
//!
//! Draws the board with macroquad: word-blocks as labelled tiles, subjects
//! as coloured blocks, plus the rule list and the win banner. Drawing goes
//! through `Engine::present`, so the hit raster is rebuilt from exactly the
//! order things appear on screen.

use macroquad::prelude::*;

use super::components::{Bounds, Noun, Operator, Subject, Verb};
use super::entity::Entity;
use super::runtime::Engine;
use super::world::World;
use crate::input::PlayLayout;

const BOARD_BG: Color = Color::new(0.08, 0.08, 0.10, 1.0);
const NOUN_COLOR: Color = Color::new(0.85, 0.20, 0.55, 1.0);
const OPERATOR_COLOR: Color = Color::new(0.92, 0.92, 0.92, 1.0);
const VERB_COLOR: Color = Color::new(0.95, 0.55, 0.15, 1.0);
const PANEL_TEXT: Color = Color::new(0.80, 0.80, 0.85, 1.0);

/// Colours for well-known subjects; anything else gets a hashed pick.
const SUBJECT_COLORS: &[(&str, Color)] = &[
    ("baba", Color::new(0.95, 0.95, 0.95, 1.0)),
    ("wall", Color::new(0.35, 0.35, 0.40, 1.0)),
    ("rock", Color::new(0.60, 0.45, 0.25, 1.0)),
    ("flag", Color::new(0.95, 0.85, 0.20, 1.0)),
    ("skull", Color::new(0.75, 0.15, 0.15, 1.0)),
];

fn subject_color(word: &str) -> Color {
    if let Some(&(_, color)) = SUBJECT_COLORS.iter().find(|(w, _)| w.eq_ignore_ascii_case(word)) {
        return color;
    }
    let hash = word.bytes().fold(2166136261u32, |h, b| (h ^ b as u32).wrapping_mul(16777619));
    Color::from_rgba((hash >> 16) as u8 | 0x40, (hash >> 8) as u8 | 0x40, hash as u8 | 0x40, 255)
}

fn draw_label(text: &str, rect: Rect, color: Color) {
    let size = (rect.h * 0.45).max(8.0);
    let dims = measure_text(text, None, size as u16, 1.0);
    draw_text(
        text,
        rect.x + (rect.w - dims.width) * 0.5,
        rect.y + (rect.h + dims.offset_y) * 0.5,
        size,
        color,
    );
}

/// Draw a single entity.
fn draw_entity(world: &World, entity: Entity, bounds: &Bounds, layout: &PlayLayout) {
    let top_left = layout.to_screen(bounds.position());
    let rect = Rect::new(top_left.x, top_left.y, bounds.width() * layout.scale, bounds.height() * layout.scale);

    if let Some(noun) = world.get::<Noun>(entity) {
        draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 2.0, NOUN_COLOR);
        draw_label(&noun.word.to_uppercase(), rect, NOUN_COLOR);
    } else if world.has::<Operator>(entity) {
        draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 2.0, OPERATOR_COLOR);
        draw_label("IS", rect, OPERATOR_COLOR);
    } else if let Some(verb) = world.get::<Verb>(entity) {
        draw_rectangle(rect.x, rect.y, rect.w, rect.h, VERB_COLOR);
        draw_label(&verb.target.word().to_uppercase(), rect, BOARD_BG);
    } else if let Some(subject) = world.get::<Subject>(entity) {
        let inset = rect.w.min(rect.h) * 0.1;
        draw_rectangle(
            rect.x + inset,
            rect.y + inset,
            rect.w - inset * 2.0,
            rect.h - inset * 2.0,
            subject_color(&subject.word),
        );
    } else {
        draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 1.0, GRAY);
    }
}

/// Draw the board and feed the frame signals. Returns true if the hit
/// raster was rebuilt this frame.
pub fn draw_board(engine: &mut Engine, layout: &PlayLayout) -> bool {
    let area = layout.screen_rect();
    draw_rectangle(area.x, area.y, area.w, area.h, BOARD_BG);
    engine.present(|world, entity, bounds| draw_entity(world, entity, bounds, layout))
}

/// Rule list next to the board.
pub fn draw_rule_panel(engine: &Engine, panel: Rect) {
    let mut y = panel.y + 28.0;
    draw_text("RULES", panel.x + 12.0, y, 24.0, PANEL_TEXT);
    y += 12.0;

    if engine.rules().is_empty() {
        y += 22.0;
        draw_text("(none)", panel.x + 12.0, y, 20.0, GRAY);
    }
    for rule in engine.rules().rules() {
        y += 22.0;
        draw_text(&rule.to_string(), panel.x + 12.0, y, 20.0, PANEL_TEXT);
    }
}

pub fn draw_win_banner(layout: &PlayLayout) {
    let area = layout.screen_rect();
    let band = Rect::new(area.x, area.center().y - 40.0, area.w, 80.0);
    draw_rectangle(band.x, band.y, band.w, band.h, Color::new(0.0, 0.0, 0.0, 0.7));
    draw_label("YOU WIN", band, GOLD);
}
