//! Entity Identifiers
//!
//! Entities are opaque handles for game objects. Ids come from a single
//! monotonic counter starting at 1 and are never handed out twice in a run:
//! - No generation counter is needed, a destroyed id simply never comes back
//! - Ascending id order doubles as creation order, which queries rely on
//! - Zero is reserved so the hit raster can use it as "no entity"

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for a game entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Entity(u32);

impl Entity {
    /// Rebuild an entity handle from a raw id (e.g. decoded from a pixel).
    /// Returns None for the reserved id 0.
    pub fn from_raw(id: u32) -> Option<Self> {
        (id != 0).then_some(Self(id))
    }

    /// The raw id. Always >= 1.
    pub fn id(&self) -> u32 {
        self.0
    }

    /// Slot in the sparse component arrays.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out entity ids and tracks which ones are still alive.
#[derive(Debug)]
pub struct EntityAllocator {
    /// Next id to hand out
    next: u32,
    /// alive[id] is true while the entity exists
    alive: Vec<bool>,
    alive_count: u32,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            next: 1,
            alive: vec![false],
            alive_count: 0,
        }
    }

    /// Allocate a fresh entity. Ids strictly increase.
    pub fn allocate(&mut self) -> Entity {
        let entity = Entity(self.next);
        self.next += 1;
        self.alive.push(true);
        self.alive_count += 1;
        entity
    }

    /// Mark an entity dead. Returns true if it was alive.
    pub fn free(&mut self, entity: Entity) -> bool {
        match self.alive.get_mut(entity.index()) {
            Some(slot) if *slot => {
                *slot = false;
                self.alive_count -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.alive.get(entity.index()).copied().unwrap_or(false)
    }

    pub fn alive_count(&self) -> u32 {
        self.alive_count
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_allocate_and_free() {
        let mut alloc = EntityAllocator::new();

        let e1 = alloc.allocate();
        let e2 = alloc.allocate();
        assert_eq!(e1.id(), 1);
        assert_eq!(e2.id(), 2);
        assert_eq!(alloc.alive_count(), 2);

        assert!(alloc.free(e1));
        assert!(!alloc.free(e1));
        assert_eq!(alloc.alive_count(), 1);
        assert!(!alloc.is_alive(e1));
        assert!(alloc.is_alive(e2));
    }

    #[test]
    fn test_freed_ids_are_not_reused() {
        let mut alloc = EntityAllocator::new();
        let e1 = alloc.allocate();
        alloc.free(e1);
        let e2 = alloc.allocate();
        assert_ne!(e1, e2);
        assert!(e2 > e1);
    }

    #[test]
    fn test_zero_is_never_an_entity() {
        assert_eq!(Entity::from_raw(0), None);
        assert_eq!(Entity::from_raw(7).map(|e| e.id()), Some(7));
        assert!(!EntityAllocator::new().is_alive(Entity(0)));
    }

    proptest! {
        #[test]
        fn prop_ids_strictly_increase(frees in proptest::collection::vec(any::<bool>(), 1..64)) {
            let mut alloc = EntityAllocator::new();
            let mut last = 0;
            for free in frees {
                let e = alloc.allocate();
                prop_assert!(e.id() > last);
                last = e.id();
                if free {
                    alloc.free(e);
                }
            }
        }
    }
}
