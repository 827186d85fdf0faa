//! Rule Extraction
//!
//! Rules are read off the board after every completed frame. Each "IS"
//! block probes just past its four edges through the hit raster:
//!
//! ```text
//!              noun?
//!        noun? [IS] verb?
//!              verb?
//! ```
//!
//! A noun on the left with a verb on the right, or a noun above with a verb
//! below, makes a rule. Before applying, every subject loses all of its
//! capability tags, so breaking a sentence takes effect on the next frame.

use std::fmt;

use tracing::{debug, info};

use super::components::{Bounds, Capability, Noun, Operator, Subject, Verb};
use super::entity::Entity;
use super::hit_test::IdRaster;
use super::world::World;

/// Distance past an operator's edge where neighbours are probed.
pub const DEFAULT_PROBE_SLOP: f32 = 10.0;

/// "NOUN IS VERB".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub noun: String,
    pub capability: Capability,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} IS {}",
            self.noun.to_uppercase(),
            self.capability.word().to_uppercase()
        )
    }
}

/// Every rule currently spelled out on the board, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains(&self, noun: &str, capability: Capability) -> bool {
        self.rules
            .iter()
            .any(|r| r.capability == capability && r.noun.eq_ignore_ascii_case(noun))
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{rule}")?;
        }
        Ok(())
    }
}

fn noun_at(world: &World, raster: &IdRaster, x: f32, y: f32) -> Option<String> {
    let entity = raster.entity_at(x, y)?;
    world.get::<Noun>(entity).map(|n| n.word.clone())
}

fn verb_at(world: &World, raster: &IdRaster, x: f32, y: f32) -> Option<Capability> {
    let entity = raster.entity_at(x, y)?;
    world.get::<Verb>(entity).map(|v| v.target)
}

/// Read every sentence off the board.
pub fn extract(world: &World, raster: &IdRaster, slop: f32) -> RuleSet {
    let mut rules = Vec::new();

    for (operator, _) in world.query::<Operator>() {
        let Some(b) = world.get::<Bounds>(operator) else {
            continue;
        };
        let center = b.center();

        let left = noun_at(world, raster, b.x - slop, center.y);
        let right = verb_at(world, raster, b.right() + slop, center.y);
        if let (Some(noun), Some(capability)) = (left, right) {
            rules.push(Rule { noun, capability });
        }

        let up = noun_at(world, raster, center.x, b.y - slop);
        let down = verb_at(world, raster, center.x, b.bottom() + slop);
        if let (Some(noun), Some(capability)) = (up, down) {
            rules.push(Rule { noun, capability });
        }
    }

    RuleSet { rules }
}

/// Strip every capability from every subject, then grant what the rules say.
pub fn apply(world: &mut World, rules: &RuleSet) {
    let subjects: Vec<(Entity, Subject)> = world
        .query::<Subject>()
        .map(|(e, s)| (e, s.clone()))
        .collect();

    for (entity, _) in &subjects {
        for capability in Capability::ALL {
            world.revoke(*entity, capability);
        }
    }

    for rule in rules.rules() {
        for (entity, subject) in &subjects {
            if subject.matches(&rule.noun) {
                world.grant(*entity, rule.capability);
            }
        }
    }
}

/// Owns the current rule set and re-derives it each frame.
#[derive(Debug)]
pub struct RuleEngine {
    probe_slop: f32,
    current: RuleSet,
}

impl RuleEngine {
    pub fn new(probe_slop: f32) -> Self {
        Self {
            probe_slop,
            current: RuleSet::default(),
        }
    }

    pub fn current(&self) -> &RuleSet {
        &self.current
    }

    /// Extract and apply against a completed frame.
    pub fn refresh(&mut self, world: &mut World, raster: &IdRaster) {
        let rules = extract(world, raster, self.probe_slop);
        apply(world, &rules);
        if rules != self.current {
            info!(count = rules.len(), "rules changed: [{}]", rules.to_string().replace('\n', ", "));
        } else {
            debug!(count = rules.len(), "rules unchanged");
        }
        self.current = rules;
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_SLOP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::components::{Blocking, Pushable};
    use crate::game::event::Signal;
    use crate::game::hit_test::HitTester;

    const CELL: f32 = 20.0;

    fn cell(col: f32, row: f32) -> Bounds {
        Bounds::new(col * CELL, row * CELL, CELL, CELL)
    }

    fn snapshot(world: &World) -> IdRaster {
        let mut tester = HitTester::new(320, 240);
        tester.handle(world, &Signal::FrameBegin);
        let drawn: Vec<Entity> = world.query::<Bounds>().map(|(e, _)| e).collect();
        for e in drawn {
            tester.handle(world, &Signal::EntityDrawn(e));
        }
        tester.handle(world, &Signal::FrameEnd);
        tester.snapshot().cloned().unwrap()
    }

    #[test]
    fn test_horizontal_sentence() {
        let mut world = World::new();
        world.spawn_noun(cell(1.0, 1.0), "rock");
        world.spawn_operator(cell(2.0, 1.0));
        world.spawn_verb(cell(3.0, 1.0), Capability::Pushable);

        let rules = extract(&world, &snapshot(&world), DEFAULT_PROBE_SLOP);
        assert_eq!(rules.len(), 1);
        assert!(rules.contains("rock", Capability::Pushable));
        assert_eq!(rules.to_string(), "ROCK IS PUSH");
    }

    #[test]
    fn test_vertical_sentence() {
        let mut world = World::new();
        world.spawn_noun(cell(5.0, 1.0), "wall");
        world.spawn_operator(cell(5.0, 2.0));
        world.spawn_verb(cell(5.0, 3.0), Capability::Blocking);

        let rules = extract(&world, &snapshot(&world), DEFAULT_PROBE_SLOP);
        assert_eq!(rules.rules(), &[Rule { noun: "wall".into(), capability: Capability::Blocking }]);
    }

    #[test]
    fn test_shared_operator_reads_both_ways() {
        let mut world = World::new();
        world.spawn_noun(cell(1.0, 2.0), "rock");
        world.spawn_noun(cell(2.0, 1.0), "flag");
        world.spawn_operator(cell(2.0, 2.0));
        world.spawn_verb(cell(3.0, 2.0), Capability::Pushable);
        world.spawn_verb(cell(2.0, 3.0), Capability::WinTrigger);

        let rules = extract(&world, &snapshot(&world), DEFAULT_PROBE_SLOP);
        assert_eq!(rules.to_string(), "ROCK IS PUSH\nFLAG IS WIN");
    }

    #[test]
    fn test_backwards_sentence_is_not_a_rule() {
        let mut world = World::new();
        world.spawn_verb(cell(1.0, 1.0), Capability::Pushable);
        world.spawn_operator(cell(2.0, 1.0));
        world.spawn_noun(cell(3.0, 1.0), "rock");

        assert!(extract(&world, &snapshot(&world), DEFAULT_PROBE_SLOP).is_empty());
    }

    #[test]
    fn test_gap_wider_than_slop_breaks_sentence() {
        let mut world = World::new();
        world.spawn_noun(Bounds::new(0.0, 20.0, 20.0, 20.0), "rock");
        world.spawn_operator(Bounds::new(35.0, 20.0, 20.0, 20.0));
        world.spawn_verb(Bounds::new(60.0, 20.0, 20.0, 20.0), Capability::Pushable);

        // 15px gap on the left is too wide, 5px on the right is fine
        assert!(extract(&world, &snapshot(&world), DEFAULT_PROBE_SLOP).is_empty());
        assert_eq!(extract(&world, &snapshot(&world), 16.0).len(), 1);
    }

    #[test]
    fn test_apply_grants_and_revokes() {
        let mut world = World::new();
        let rock = world.spawn_subject(cell(10.0, 10.0), "rock");
        let wall = world.spawn_subject(cell(11.0, 10.0), "wall");
        world.attach(wall, Pushable);

        let mut rules = RuleSet::default();
        rules.rules.push(Rule { noun: "ROCK".into(), capability: Capability::Blocking });
        apply(&mut world, &rules);

        assert!(world.has::<Blocking>(rock));
        assert!(!world.has::<Pushable>(wall));

        apply(&mut world, &RuleSet::default());
        assert!(!world.has::<Blocking>(rock));
    }

    #[test]
    fn test_apply_leaves_word_blocks_alone() {
        let mut world = World::new();
        let noun = world.spawn_noun(cell(1.0, 1.0), "rock");
        apply(&mut world, &RuleSet::default());
        assert!(world.has::<Pushable>(noun));
    }

    #[test]
    fn test_rules_accumulate() {
        let mut world = World::new();
        let rock = world.spawn_subject(cell(10.0, 10.0), "rock");
        let mut rules = RuleSet::default();
        rules.rules.push(Rule { noun: "rock".into(), capability: Capability::Blocking });
        rules.rules.push(Rule { noun: "rock".into(), capability: Capability::Pushable });
        apply(&mut world, &rules);
        assert!(world.has::<Blocking>(rock));
        assert!(world.has::<Pushable>(rock));
    }

    #[test]
    fn test_refresh_tracks_current_rules() {
        let mut world = World::new();
        let rock = world.spawn_subject(cell(10.0, 10.0), "rock");
        world.spawn_noun(cell(1.0, 1.0), "rock");
        let op = world.spawn_operator(cell(2.0, 1.0));
        world.spawn_verb(cell(3.0, 1.0), Capability::Pushable);

        let mut engine = RuleEngine::default();
        let raster = snapshot(&world);
        engine.refresh(&mut world, &raster);
        assert!(engine.current().contains("rock", Capability::Pushable));
        assert!(world.has::<Pushable>(rock));

        world.get_mut::<Bounds>(op).unwrap().y += 100.0;
        let raster = snapshot(&world);
        engine.refresh(&mut world, &raster);
        assert!(engine.current().is_empty());
        assert!(!world.has::<Pushable>(rock));
    }
}
