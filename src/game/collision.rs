//! Collision System
//!
//! Resolves overlaps after something moves. Resolution runs in three
//! passes, in priority order:
//! 1. Destructible contact destroys both entities and stops everything
//! 2. Blocking entities push the mover back out
//! 3. Pushable entities get shoved, and whatever they can't move pushes back
//!
//! The return value of `collide` is the total adjustment applied to the
//! mover. When a pushed entity reports an adjustment, that is resistance:
//! the pusher absorbs it so the two stay flush.

use macroquad::math::Vec2;
use tracing::debug;

use super::components::{
    Blocking, Bounds, Destructible, Draggable, MinimumTranslation, PlayerControlled, Pushable,
    WinTrigger,
};
use super::entity::Entity;
use super::world::World;

/// Longest push chain resolved in one move.
pub const MAX_PUSH_DEPTH: usize = 64;

/// Latches the first win of a level. Never resets.
#[derive(Debug, Clone, Copy, Default)]
pub struct WinLatch {
    tripped: bool,
}

impl WinLatch {
    /// Trip the latch. Returns true only the first time.
    pub fn trip(&mut self) -> bool {
        !std::mem::replace(&mut self.tripped, true)
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped
    }
}

/// What a drag did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragOutcome {
    /// Number of entities translated
    pub moved: usize,
    /// The win latch tripped during this drag
    pub won: bool,
}

/// Snapshot of every entity carrying component C, minus the excluded ones.
fn candidates<C: super::world::Component>(world: &World, exclude: [Option<Entity>; 2]) -> Vec<Entity> {
    world
        .query::<C>()
        .map(|(e, _)| e)
        .filter(|e| !exclude.contains(&Some(*e)))
        .collect()
}

/// Resolve every overlap involving `entity` and return the total adjustment
/// applied to it. Returns zero if the entity has no bounds or was destroyed.
pub fn collide(world: &mut World, entity: Entity) -> Vec2 {
    collide_pushed(world, entity, None, 0)
}

fn collide_pushed(world: &mut World, entity: Entity, pusher: Option<Entity>, depth: usize) -> Vec2 {
    let Some(start) = world.get::<Bounds>(entity).copied() else {
        return Vec2::ZERO;
    };

    // 1. Destructible contact ends it for both
    for hazard in candidates::<Destructible>(world, [Some(entity), None]) {
        let Some(hazard_bounds) = world.get::<Bounds>(hazard) else {
            continue;
        };
        if start.overlap(hazard_bounds).is_some() {
            debug!(%entity, %hazard, "destroyed on contact");
            world.destroy(entity);
            world.destroy(hazard);
            return Vec2::ZERO;
        }
    }

    // 2. Blockers push us straight back out
    let mut adjustment = Vec2::ZERO;
    for blocker in candidates::<Blocking>(world, [Some(entity), None]) {
        let Some(blocker_bounds) = world.get::<Bounds>(blocker) else {
            continue;
        };
        match start.overlap(blocker_bounds) {
            Some(MinimumTranslation::Separate(v)) => adjustment += v,
            Some(MinimumTranslation::Ambiguous) => {
                debug!(%entity, %blocker, "ambiguous overlap with blocker, ignored");
            }
            None => {}
        }
    }
    if let Some(bounds) = world.get_mut::<Bounds>(entity) {
        bounds.translate(adjustment);
    }

    // 3. Shove pushables; what they can't absorb comes back to us
    if depth >= MAX_PUSH_DEPTH {
        debug!(%entity, depth, "push chain too long, stopping");
        return adjustment;
    }
    for other in candidates::<Pushable>(world, [Some(entity), pusher]) {
        let Some(current) = world.get::<Bounds>(entity).copied() else {
            break;
        };
        let Some(other_bounds) = world.get_mut::<Bounds>(other) else {
            continue;
        };
        let Some(MinimumTranslation::Separate(v)) = current.overlap(other_bounds) else {
            continue;
        };

        other_bounds.translate(-v);
        let resistance = collide_pushed(world, other, Some(entity), depth + 1);
        if resistance != Vec2::ZERO {
            debug!(%entity, %other, ?resistance, "push met resistance");
        }
        match world.get_mut::<Bounds>(entity) {
            Some(bounds) => bounds.translate(resistance),
            None => return adjustment,
        }
        adjustment += resistance;
    }

    adjustment
}

/// Move every player-controlled entity (and a draggable target) by the
/// pointer delta, resolve collisions, then check for a win.
pub fn drag(world: &mut World, latch: &mut WinLatch, delta: Vec2, target: Option<Entity>) -> DragOutcome {
    let mut outcome = DragOutcome::default();

    let players: Vec<Entity> = world.query::<PlayerControlled>().map(|(e, _)| e).collect();
    for player in players {
        let Some(bounds) = world.get_mut::<Bounds>(player) else {
            continue;
        };
        bounds.translate(delta);
        outcome.moved += 1;
        collide(world, player);

        let Some(player_bounds) = world.get::<Bounds>(player).copied() else {
            continue;
        };
        let reached_goal = world
            .query::<WinTrigger>()
            .filter(|(goal, _)| *goal != player)
            .filter_map(|(goal, _)| world.get::<Bounds>(goal))
            .any(|goal_bounds| player_bounds.overlap(goal_bounds).is_some());
        if reached_goal && latch.trip() {
            outcome.won = true;
        }
    }

    if let Some(target) = target {
        if world.has::<Draggable>(target) && !world.has::<PlayerControlled>(target) {
            if let Some(bounds) = world.get_mut::<Bounds>(target) {
                bounds.translate(delta);
                outcome.moved += 1;
                collide(world, target);
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::components::AnyComponent;

    fn square(x: f32, y: f32) -> AnyComponent {
        Bounds::new(x, y, 10.0, 10.0).into()
    }

    fn x_of(world: &World, e: Entity) -> f32 {
        world.get::<Bounds>(e).unwrap().x
    }

    #[test]
    fn test_no_overlap_no_adjustment() {
        let mut world = World::new();
        let a = world.create_entity([square(0.0, 0.0)]);
        world.create_entity([square(10.0, 0.0), AnyComponent::Blocking]);
        assert_eq!(collide(&mut world, a), Vec2::ZERO);
        assert_eq!(x_of(&world, a), 0.0);
    }

    #[test]
    fn test_blocking_pushes_back() {
        let mut world = World::new();
        let a = world.create_entity([square(5.0, 0.0)]);
        world.create_entity([square(9.0, 0.0), AnyComponent::Blocking]);
        assert_eq!(collide(&mut world, a), Vec2::new(-6.0, 0.0));
        assert_eq!(x_of(&world, a), -1.0);
    }

    #[test]
    fn test_collide_is_idempotent() {
        let mut world = World::new();
        let a = world.create_entity([square(5.0, 0.0)]);
        world.create_entity([square(9.0, 0.0), AnyComponent::Blocking]);
        collide(&mut world, a);
        assert_eq!(collide(&mut world, a), Vec2::ZERO);
        assert_eq!(x_of(&world, a), -1.0);
    }

    #[test]
    fn test_blocking_entity_ignores_itself() {
        let mut world = World::new();
        let wall = world.create_entity([square(0.0, 0.0), AnyComponent::Blocking]);
        assert_eq!(collide(&mut world, wall), Vec2::ZERO);
    }

    #[test]
    fn test_destructible_destroys_both() {
        let mut world = World::new();
        let a = world.create_entity([square(0.0, 0.0)]);
        let skull = world.create_entity([square(5.0, 0.0), AnyComponent::Destructible]);
        let bystander = world.create_entity([square(100.0, 0.0)]);

        assert_eq!(collide(&mut world, a), Vec2::ZERO);
        assert!(!world.is_alive(a));
        assert!(!world.is_alive(skull));
        assert!(world.is_alive(bystander));
        assert_eq!(world.entity_count(), 1);
        assert_eq!(world.query::<Destructible>().count(), 0);
        assert_eq!(world.query::<Bounds>().count(), 1);
    }

    #[test]
    fn test_destructible_beats_blocking() {
        let mut world = World::new();
        let a = world.create_entity([square(5.0, 0.0)]);
        let wall = world.create_entity([square(9.0, 0.0), AnyComponent::Blocking]);
        world.create_entity([square(0.0, 5.0), AnyComponent::Destructible]);
        collide(&mut world, a);
        assert!(!world.is_alive(a));
        assert_eq!(x_of(&world, wall), 9.0);
    }

    #[test]
    fn test_push_free_block() {
        let mut world = World::new();
        let a = world.create_entity([square(5.0, 0.0)]);
        let rock = world.create_entity([square(10.0, 0.0), AnyComponent::Pushable]);
        // a moved into the rock from the left by 5
        assert_eq!(collide(&mut world, a), Vec2::ZERO);
        assert_eq!(x_of(&world, a), 5.0);
        assert_eq!(x_of(&world, rock), 15.0);
    }

    #[test]
    fn test_push_into_wall_pushes_back() {
        let mut world = World::new();
        let a = world.create_entity([square(5.0, 0.0)]);
        let rock = world.create_entity([square(10.0, 0.0), AnyComponent::Pushable]);
        let wall = world.create_entity([square(20.0, 0.0), AnyComponent::Blocking]);

        let adjustment = collide(&mut world, a);
        assert_eq!(adjustment, Vec2::new(-5.0, 0.0));
        assert_eq!(x_of(&world, a), 0.0);
        assert_eq!(x_of(&world, rock), 10.0);
        assert_eq!(x_of(&world, wall), 20.0);
    }

    #[test]
    fn test_push_chain_stays_flush() {
        let mut world = World::new();
        let a = world.create_entity([square(3.0, 0.0)]);
        let r1 = world.create_entity([square(10.0, 0.0), AnyComponent::Pushable]);
        let r2 = world.create_entity([square(20.0, 0.0), AnyComponent::Pushable]);

        collide(&mut world, a);
        assert_eq!(x_of(&world, r1), 13.0);
        assert_eq!(x_of(&world, r2), 23.0);
        assert_eq!(x_of(&world, a), 3.0);
    }

    #[test]
    fn test_push_chain_against_wall() {
        let mut world = World::new();
        let a = world.create_entity([square(3.0, 0.0)]);
        let r1 = world.create_entity([square(10.0, 0.0), AnyComponent::Pushable]);
        let r2 = world.create_entity([square(20.0, 0.0), AnyComponent::Pushable]);
        world.create_entity([square(30.0, 0.0), AnyComponent::Blocking]);

        let adjustment = collide(&mut world, a);
        assert_eq!(adjustment, Vec2::new(-3.0, 0.0));
        assert_eq!(x_of(&world, a), 0.0);
        assert_eq!(x_of(&world, r1), 10.0);
        assert_eq!(x_of(&world, r2), 20.0);
    }

    #[test]
    fn test_pushing_into_hazard_destroys_block() {
        let mut world = World::new();
        let a = world.create_entity([square(5.0, 0.0)]);
        let rock = world.create_entity([square(10.0, 0.0), AnyComponent::Pushable]);
        let skull = world.create_entity([square(20.0, 0.0), AnyComponent::Destructible]);

        collide(&mut world, a);
        assert!(world.is_alive(a));
        assert!(!world.is_alive(rock));
        assert!(!world.is_alive(skull));
    }

    #[test]
    fn test_drag_scenario_against_wall() {
        let mut world = World::new();
        let a = world.create_entity([square(0.0, 0.0), AnyComponent::PlayerControlled]);
        world.create_entity([square(9.0, 0.0), AnyComponent::Blocking]);
        let mut latch = WinLatch::default();

        let outcome = drag(&mut world, &mut latch, Vec2::new(5.0, 0.0), None);
        assert_eq!(outcome.moved, 1);
        assert!(!outcome.won);
        assert_eq!(x_of(&world, a), -1.0);
    }

    #[test]
    fn test_drag_wins_once() {
        let mut world = World::new();
        world.create_entity([square(0.0, 0.0), AnyComponent::PlayerControlled]);
        world.create_entity([square(15.0, 0.0), AnyComponent::WinTrigger]);
        let mut latch = WinLatch::default();

        assert!(!drag(&mut world, &mut latch, Vec2::new(2.0, 0.0), None).won);
        assert!(drag(&mut world, &mut latch, Vec2::new(5.0, 0.0), None).won);
        assert!(!drag(&mut world, &mut latch, Vec2::new(1.0, 0.0), None).won);
        assert!(latch.is_tripped());
    }

    #[test]
    fn test_player_that_is_also_win_does_not_win_alone() {
        let mut world = World::new();
        world.create_entity([
            square(0.0, 0.0),
            AnyComponent::PlayerControlled,
            AnyComponent::WinTrigger,
        ]);
        let mut latch = WinLatch::default();
        assert!(!drag(&mut world, &mut latch, Vec2::new(1.0, 0.0), None).won);
    }

    #[test]
    fn test_drag_moves_draggable_target() {
        let mut world = World::new();
        let crate_ = world.create_entity([square(50.0, 50.0), AnyComponent::Draggable]);
        let idle = world.create_entity([square(80.0, 80.0), AnyComponent::Draggable]);
        let mut latch = WinLatch::default();

        let outcome = drag(&mut world, &mut latch, Vec2::new(4.0, -2.0), Some(crate_));
        assert_eq!(outcome.moved, 1);
        assert_eq!(world.get::<Bounds>(crate_).unwrap().position(), Vec2::new(54.0, 48.0));
        assert_eq!(x_of(&world, idle), 80.0);
    }

    #[test]
    fn test_drag_without_players_moves_nothing() {
        let mut world = World::new();
        let a = world.create_entity([square(0.0, 0.0)]);
        let mut latch = WinLatch::default();
        let outcome = drag(&mut world, &mut latch, Vec2::new(3.0, 3.0), Some(a));
        assert_eq!(outcome.moved, 0);
        assert_eq!(x_of(&world, a), 0.0);
    }
}
