//! Game Components
//!
//! Every component kind the puzzle knows about. Components are plain data;
//! behavior lives in the collision and rule systems.

use macroquad::math::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Geometry
// =============================================================================

/// Axis-aligned rectangle in play-area pixels.
///
/// Position moves freely; the size is fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    width: f32,
    height: f32,
}

/// How to move one rectangle out of another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MinimumTranslation {
    /// Axis-aligned offset that separates the rectangles
    Separate(Vec2),
    /// The rectangles intersect but neither axis has a clean way out
    /// (one contains the other along both axes)
    Ambiguous,
}

impl MinimumTranslation {
    /// The separating vector, if there is one.
    pub fn vector(self) -> Option<Vec2> {
        match self {
            MinimumTranslation::Separate(v) => Some(v),
            MinimumTranslation::Ambiguous => None,
        }
    }
}

/// Penetration of one interval by another along a single axis.
enum Penetration {
    None,
    Offset(f32),
    Ambiguous,
}

/// Which of b's edges sit strictly inside a, and how far a must move to clear them.
fn penetration(a_min: f32, a_max: f32, b_min: f32, b_max: f32) -> Penetration {
    let low_inside = a_min < b_min && b_min < a_max;
    let high_inside = a_min < b_max && b_max < a_max;
    match (low_inside, high_inside) {
        (true, true) => Penetration::Ambiguous,
        (true, false) => Penetration::Offset(b_min - a_max),
        (false, true) => Penetration::Offset(b_max - a_min),
        (false, false) => Penetration::None,
    }
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// True when the interiors intersect. Touching edges don't count.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// The translation that moves `self` out of `other`, or None when they
    /// don't intersect. The result never moves along both axes at once;
    /// when both axes offer an offset the shorter one wins (horizontal on
    /// ties).
    pub fn overlap(&self, other: &Bounds) -> Option<MinimumTranslation> {
        if !self.intersects(other) {
            return None;
        }

        let px = penetration(self.x, self.right(), other.x, other.right());
        let py = penetration(self.y, self.bottom(), other.y, other.bottom());

        Some(match (px, py) {
            (Penetration::Offset(dx), Penetration::Offset(dy)) => {
                if dx.abs() <= dy.abs() {
                    MinimumTranslation::Separate(Vec2::new(dx, 0.0))
                } else {
                    MinimumTranslation::Separate(Vec2::new(0.0, dy))
                }
            }
            (Penetration::Offset(dx), _) => MinimumTranslation::Separate(Vec2::new(dx, 0.0)),
            (_, Penetration::Offset(dy)) => MinimumTranslation::Separate(Vec2::new(0.0, dy)),
            _ => MinimumTranslation::Ambiguous,
        })
    }
}

// =============================================================================
// Capability Tags (granted and revoked by rules)
// =============================================================================

/// Moves with the pointer drag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerControlled;

/// Other entities are pushed out of it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blocking;

/// Gets shoved along when something moves into it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pushable;

/// Destroys itself and whatever touches it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destructible;

/// Touching it with a player-controlled entity wins the level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinTrigger;

// =============================================================================
// Static Tags
// =============================================================================

/// Can be dragged directly with the pointer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draggable;

/// The "IS" word-block that joins a noun to a verb
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator;

// =============================================================================
// Words
// =============================================================================

/// A capability a rule can grant. Each maps to one tag component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Capability {
    PlayerControlled,
    WinTrigger,
    Blocking,
    Pushable,
    Destructible,
}

/// Verb words as they appear on the blocks.
const VERB_WORDS: &[(&str, Capability)] = &[
    ("you", Capability::PlayerControlled),
    ("win", Capability::WinTrigger),
    ("stop", Capability::Blocking),
    ("push", Capability::Pushable),
    ("defeat", Capability::Destructible),
];

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::PlayerControlled,
        Capability::WinTrigger,
        Capability::Blocking,
        Capability::Pushable,
        Capability::Destructible,
    ];

    /// Look up a verb word (case-insensitive).
    pub fn from_word(word: &str) -> Option<Self> {
        VERB_WORDS
            .iter()
            .find(|(w, _)| w.eq_ignore_ascii_case(word))
            .map(|&(_, cap)| cap)
    }

    /// The word printed on the verb block.
    pub fn word(self) -> &'static str {
        VERB_WORDS
            .iter()
            .find(|&&(_, cap)| cap == self)
            .map(|&(w, _)| w)
            .unwrap_or("?")
    }

    /// The tag component this capability grants.
    pub fn kind(self) -> ComponentKind {
        match self {
            Capability::PlayerControlled => ComponentKind::PlayerControlled,
            Capability::WinTrigger => ComponentKind::WinTrigger,
            Capability::Blocking => ComponentKind::Blocking,
            Capability::Pushable => ComponentKind::Pushable,
            Capability::Destructible => ComponentKind::Destructible,
        }
    }

    /// The tag value itself, ready to attach.
    pub fn component(self) -> AnyComponent {
        match self {
            Capability::PlayerControlled => AnyComponent::PlayerControlled,
            Capability::WinTrigger => AnyComponent::WinTrigger,
            Capability::Blocking => AnyComponent::Blocking,
            Capability::Pushable => AnyComponent::Pushable,
            Capability::Destructible => AnyComponent::Destructible,
        }
    }
}

impl TryFrom<String> for Capability {
    type Error = String;

    fn try_from(word: String) -> Result<Self, Self::Error> {
        Capability::from_word(&word).ok_or_else(|| format!("unknown verb word \"{}\"", word))
    }
}

impl From<Capability> for String {
    fn from(cap: Capability) -> Self {
        cap.word().to_string()
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.word())
    }
}

/// Word-block naming a kind of game object, e.g. "rock".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Noun {
    pub word: String,
}

impl Noun {
    pub fn new(word: impl Into<String>) -> Self {
        Self { word: word.into() }
    }
}

/// Word-block naming the capability it grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verb {
    pub target: Capability,
}

impl Verb {
    pub fn new(target: Capability) -> Self {
        Self { target }
    }
}

/// A game object that rules apply to, identified by its noun word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub word: String,
}

impl Subject {
    pub fn new(word: impl Into<String>) -> Self {
        Self { word: word.into() }
    }

    pub fn matches(&self, noun: &str) -> bool {
        self.word.eq_ignore_ascii_case(noun)
    }
}

// =============================================================================
// Dynamic Component Values
// =============================================================================

/// Discriminant for every component kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Bounds,
    Draggable,
    PlayerControlled,
    Pushable,
    Blocking,
    Destructible,
    WinTrigger,
    Operator,
    Noun,
    Verb,
    Subject,
}

/// Any single component value. Level files list entities as vectors of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnyComponent {
    Bounds(Bounds),
    Draggable,
    PlayerControlled,
    Pushable,
    Blocking,
    Destructible,
    WinTrigger,
    Operator,
    Noun(Noun),
    Verb(Verb),
    Subject(Subject),
}

impl AnyComponent {
    pub fn kind(&self) -> ComponentKind {
        match self {
            AnyComponent::Bounds(_) => ComponentKind::Bounds,
            AnyComponent::Draggable => ComponentKind::Draggable,
            AnyComponent::PlayerControlled => ComponentKind::PlayerControlled,
            AnyComponent::Pushable => ComponentKind::Pushable,
            AnyComponent::Blocking => ComponentKind::Blocking,
            AnyComponent::Destructible => ComponentKind::Destructible,
            AnyComponent::WinTrigger => ComponentKind::WinTrigger,
            AnyComponent::Operator => ComponentKind::Operator,
            AnyComponent::Noun(_) => ComponentKind::Noun,
            AnyComponent::Verb(_) => ComponentKind::Verb,
            AnyComponent::Subject(_) => ComponentKind::Subject,
        }
    }
}

impl From<Bounds> for AnyComponent {
    fn from(b: Bounds) -> Self {
        AnyComponent::Bounds(b)
    }
}

impl From<Noun> for AnyComponent {
    fn from(n: Noun) -> Self {
        AnyComponent::Noun(n)
    }
}

impl From<Verb> for AnyComponent {
    fn from(v: Verb) -> Self {
        AnyComponent::Verb(v)
    }
}

impl From<Subject> for AnyComponent {
    fn from(s: Subject) -> Self {
        AnyComponent::Subject(s)
    }
}
