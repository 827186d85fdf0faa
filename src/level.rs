//! Level loading
//!
//! A level is a list of entities, each a list of components, in RON.
//! Files may be plain text or brotli-compressed; the loader sniffs the first
//! byte to tell them apart. Everything is validated before it reaches the
//! world so a hand-edited file can't smuggle in zero-sized or unbounded
//! entities.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::{error, info};

use crate::game::components::{AnyComponent, Bounds, Capability, ComponentKind, Noun, Subject, Verb};
use crate::game::hit_test::MAX_ENCODABLE_ID;
use crate::game::World;

/// Validation limits to keep hostile files from exhausting anything
pub mod limits {
    /// Maximum entities per level
    pub const MAX_ENTITIES: usize = 4096;
    /// Maximum length of a noun or subject word
    pub const MAX_WORD_LEN: usize = 32;
    /// Maximum absolute coordinate or size
    pub const MAX_COORD: f32 = 100_000.0;
}

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("validation error: {0}")]
    Validation(String),
}

/// One puzzle board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    /// Entities in creation order; later entities draw on top
    pub entities: Vec<Vec<AnyComponent>>,
}

/// Grid cell size used by the built-in level.
const CELL: f32 = 32.0;

fn at(col: u32, row: u32) -> AnyComponent {
    Bounds::new(col as f32 * CELL, row as f32 * CELL, CELL, CELL).into()
}

fn noun(col: u32, row: u32, word: &str) -> Vec<AnyComponent> {
    vec![at(col, row), Noun::new(word).into(), AnyComponent::Pushable]
}

fn is(col: u32, row: u32) -> Vec<AnyComponent> {
    vec![at(col, row), AnyComponent::Operator, AnyComponent::Pushable]
}

fn verb(col: u32, row: u32, capability: Capability) -> Vec<AnyComponent> {
    vec![at(col, row), Verb::new(capability).into(), AnyComponent::Pushable]
}

fn thing(col: u32, row: u32, word: &str) -> Vec<AnyComponent> {
    vec![at(col, row), Subject::new(word).into()]
}

impl Level {
    /// The starter puzzle shipped with the game (20x15 cells of 32px).
    pub fn builtin() -> Self {
        let mut entities = vec![
            // sentences
            noun(1, 1, "baba"),
            is(2, 1),
            verb(3, 1, Capability::PlayerControlled),
            noun(14, 1, "flag"),
            is(15, 1),
            verb(16, 1, Capability::WinTrigger),
            noun(1, 13, "wall"),
            is(2, 13),
            verb(3, 13, Capability::Blocking),
            noun(14, 13, "rock"),
            is(15, 13),
            verb(16, 13, Capability::Pushable),
            noun(18, 5, "skull"),
            is(18, 6),
            verb(18, 7, Capability::Destructible),
        ];

        for col in 5..=15 {
            entities.push(thing(col, 4, "wall"));
            entities.push(thing(col, 10, "wall"));
        }
        entities.extend([
            thing(10, 6, "rock"),
            thing(10, 7, "rock"),
            thing(10, 8, "rock"),
            thing(12, 9, "skull"),
            thing(13, 7, "flag"),
            thing(7, 7, "baba"),
        ]);

        Self {
            name: "first steps".to_string(),
            entities,
        }
    }

    /// Create every entity in file order.
    pub fn spawn(&self, world: &mut World) {
        for components in &self.entities {
            world.create_entity(components.iter().cloned());
        }
    }
}

fn is_valid_number(f: f32) -> bool {
    f.is_finite() && f.abs() <= limits::MAX_COORD
}

fn validate_word(word: &str, context: &str) -> Result<(), String> {
    if word.is_empty() || word.len() > limits::MAX_WORD_LEN {
        return Err(format!(
            "{context}: word must be 1..={} bytes, got {:?}",
            limits::MAX_WORD_LEN,
            word
        ));
    }
    Ok(())
}

fn validate_entity(components: &[AnyComponent], index: usize) -> Result<(), String> {
    let context = format!("entity {index}");
    let mut seen: Vec<ComponentKind> = Vec::with_capacity(components.len());

    for component in components {
        let kind = component.kind();
        if seen.contains(&kind) {
            return Err(format!("{context}: duplicate {kind:?} component"));
        }
        seen.push(kind);

        match component {
            AnyComponent::Bounds(b) => {
                let numbers = [b.x, b.y, b.width(), b.height()];
                if !numbers.iter().all(|&n| is_valid_number(n)) {
                    return Err(format!("{context}: bounds out of range {b:?}"));
                }
                if b.width() <= 0.0 || b.height() <= 0.0 {
                    return Err(format!("{context}: bounds must have positive size"));
                }
            }
            AnyComponent::Noun(n) => validate_word(&n.word, &context)?,
            AnyComponent::Subject(s) => validate_word(&s.word, &context)?,
            _ => {}
        }
    }

    if !seen.contains(&ComponentKind::Bounds) {
        return Err(format!("{context}: missing bounds"));
    }
    Ok(())
}

/// Validate an entire level
pub fn validate_level(level: &Level) -> Result<(), LevelError> {
    let max = limits::MAX_ENTITIES.min(MAX_ENCODABLE_ID as usize);
    if level.entities.len() > max {
        return Err(LevelError::Validation(format!(
            "too many entities ({} > {})",
            level.entities.len(),
            max
        )));
    }
    for (i, entity) in level.entities.iter().enumerate() {
        validate_entity(entity, i).map_err(LevelError::Validation)?;
    }
    Ok(())
}

/// Parse level bytes, plain RON or brotli-compressed RON.
pub fn parse_level_data(bytes: &[u8]) -> Result<Level, LevelError> {
    // RON files start with '(' or whitespace, brotli is binary
    let is_plain_ron = bytes
        .first()
        .is_some_and(|&b| b == b'(' || b.is_ascii_whitespace());

    let contents = if is_plain_ron {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| LevelError::Encoding(format!("invalid UTF-8: {e}")))?
    } else {
        let mut decompressed = Vec::new();
        brotli::BrotliDecompress(&mut Cursor::new(bytes), &mut decompressed)
            .map_err(|e| LevelError::Encoding(format!("brotli decompression failed: {e}")))?;
        String::from_utf8(decompressed)
            .map_err(|e| LevelError::Encoding(format!("invalid UTF-8 after decompression: {e}")))?
    };

    let level: Level = match ron::from_str(&contents) {
        Ok(level) => level,
        Err(e) => {
            let line = contents
                .lines()
                .nth(e.position.line.saturating_sub(1))
                .unwrap_or("");
            error!(line = e.position.line, col = e.position.col, context = line.trim(), "level parse error");
            return Err(e.into());
        }
    };

    validate_level(&level)?;
    Ok(level)
}

/// Load a level file (compressed or not).
pub fn load_level<P: AsRef<Path>>(path: P) -> Result<Level, LevelError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let level = parse_level_data(&bytes)?;
    info!(path = %path.display(), name = %level.name, "read level file");
    Ok(level)
}
