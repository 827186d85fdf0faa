//! Component Storage
//!
//! `ComponentStorage<T>` is a sparse array that maps entity ids to
//! component data. Slots are indexed by the raw entity id, so walking the
//! array front to back visits entities in creation order. At puzzle scale
//! (a few hundred blocks) this beats anything cleverer.

use super::entity::Entity;

/// Sparse storage for a single component type.
#[derive(Debug, Clone)]
pub struct ComponentStorage<T> {
    /// Sparse array indexed by entity.index()
    data: Vec<Option<T>>,
}

impl<T> ComponentStorage<T> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    fn ensure_capacity(&mut self, index: usize) {
        if index >= self.data.len() {
            self.data.resize_with(index + 1, || None);
        }
    }

    /// Insert a component for an entity, returning the one it replaced.
    pub fn insert(&mut self, entity: Entity, component: T) -> Option<T> {
        let idx = entity.index();
        self.ensure_capacity(idx);
        self.data[idx].replace(component)
    }

    /// Remove a component from an entity, if it has one.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        self.data.get_mut(entity.index()).and_then(Option::take)
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.data.get(entity.index()).and_then(|opt| opt.as_ref())
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.data.get_mut(entity.index()).and_then(|opt| opt.as_mut())
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.get(entity).is_some()
    }

    /// Iterate over all (entity, component) pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.data.iter().enumerate().filter_map(|(idx, opt)| {
            let component = opt.as_ref()?;
            Entity::from_raw(idx as u32).map(|e| (e, component))
        })
    }

    /// Just the entities, in ascending id order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.iter().map(|(e, _)| e)
    }

    /// Number of entities that have this component.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|opt| opt.is_some()).count()
    }
}

impl<T> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}
