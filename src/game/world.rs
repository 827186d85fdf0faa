//! Game World
//!
//! The World is the central container for all puzzle state:
//! - Entity allocation and lifetime tracking
//! - Component storage for every component kind
//!
//! Component kinds are fixed at compile time. Generic access goes through
//! the `Component` trait, so asking for a kind the world doesn't store is a
//! type error rather than a runtime surprise.

use super::component::ComponentStorage;
use super::components::*;
use super::entity::{Entity, EntityAllocator};

/// A component kind the world knows how to store.
pub trait Component: Sized + 'static {
    const KIND: ComponentKind;
    fn storage(world: &World) -> &ComponentStorage<Self>;
    fn storage_mut(world: &mut World) -> &mut ComponentStorage<Self>;
}

/// The game world containing all entities and their components.
#[derive(Debug, Default)]
pub struct World {
    entities: EntityAllocator,

    // =========================================================================
    // Geometry
    // =========================================================================

    pub bounds: ComponentStorage<Bounds>,

    // =========================================================================
    // Capability Tags (rewritten by rules every frame on subjects)
    // =========================================================================

    pub players: ComponentStorage<PlayerControlled>,
    pub blockers: ComponentStorage<Blocking>,
    pub pushables: ComponentStorage<Pushable>,
    pub hazards: ComponentStorage<Destructible>,
    pub goals: ComponentStorage<WinTrigger>,

    // =========================================================================
    // Static Tags
    // =========================================================================

    pub draggables: ComponentStorage<Draggable>,
    pub operators: ComponentStorage<Operator>,

    // =========================================================================
    // Words
    // =========================================================================

    pub nouns: ComponentStorage<Noun>,
    pub verbs: ComponentStorage<Verb>,
    pub subjects: ComponentStorage<Subject>,
}

macro_rules! impl_component {
    ($($ty:ident => $field:ident),* $(,)?) => {
        $(
            impl Component for $ty {
                const KIND: ComponentKind = ComponentKind::$ty;
                fn storage(world: &World) -> &ComponentStorage<Self> {
                    &world.$field
                }
                fn storage_mut(world: &mut World) -> &mut ComponentStorage<Self> {
                    &mut world.$field
                }
            }
        )*
    };
}

impl_component! {
    Bounds => bounds,
    PlayerControlled => players,
    Blocking => blockers,
    Pushable => pushables,
    Destructible => hazards,
    WinTrigger => goals,
    Draggable => draggables,
    Operator => operators,
    Noun => nouns,
    Verb => verbs,
    Subject => subjects,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Entity Management
    // =========================================================================

    /// Create an entity carrying the given components.
    pub fn create_entity<I>(&mut self, components: I) -> Entity
    where
        I: IntoIterator<Item = AnyComponent>,
    {
        let entity = self.entities.allocate();
        for component in components {
            self.attach_any(entity, component);
        }
        entity
    }

    /// Remove an entity and every component it carries.
    pub fn destroy(&mut self, entity: Entity) {
        if !self.entities.free(entity) {
            return;
        }

        self.bounds.remove(entity);
        self.players.remove(entity);
        self.blockers.remove(entity);
        self.pushables.remove(entity);
        self.hazards.remove(entity);
        self.goals.remove(entity);
        self.draggables.remove(entity);
        self.operators.remove(entity);
        self.nouns.remove(entity);
        self.verbs.remove(entity);
        self.subjects.remove(entity);
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn entity_count(&self) -> u32 {
        self.entities.alive_count()
    }

    // =========================================================================
    // Typed Component Access
    // =========================================================================

    /// Insert or overwrite a component. Ignored for dead entities.
    pub fn attach<C: Component>(&mut self, entity: Entity, component: C) {
        if self.is_alive(entity) {
            C::storage_mut(self).insert(entity, component);
        }
    }

    /// Remove a component if present.
    ///
    /// # Panics
    /// Bounds live as long as the entity; detaching them is a bug in the caller.
    pub fn detach<C: Component>(&mut self, entity: Entity) -> Option<C> {
        assert!(
            !matches!(C::KIND, ComponentKind::Bounds),
            "bounds cannot be detached from {entity}, destroy the entity instead"
        );
        C::storage_mut(self).remove(entity)
    }

    pub fn get<C: Component>(&self, entity: Entity) -> Option<&C> {
        C::storage(self).get(entity)
    }

    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        C::storage_mut(self).get_mut(entity)
    }

    pub fn has<C: Component>(&self, entity: Entity) -> bool {
        C::storage(self).contains(entity)
    }

    /// All entities with component C, in ascending id order.
    pub fn query<C: Component>(&self) -> impl Iterator<Item = (Entity, &C)> {
        C::storage(self).iter()
    }

    // =========================================================================
    // Dynamic Component Access
    // =========================================================================

    pub fn attach_any(&mut self, entity: Entity, component: AnyComponent) {
        match component {
            AnyComponent::Bounds(b) => self.attach(entity, b),
            AnyComponent::Draggable => self.attach(entity, Draggable),
            AnyComponent::PlayerControlled => self.attach(entity, PlayerControlled),
            AnyComponent::Pushable => self.attach(entity, Pushable),
            AnyComponent::Blocking => self.attach(entity, Blocking),
            AnyComponent::Destructible => self.attach(entity, Destructible),
            AnyComponent::WinTrigger => self.attach(entity, WinTrigger),
            AnyComponent::Operator => self.attach(entity, Operator),
            AnyComponent::Noun(n) => self.attach(entity, n),
            AnyComponent::Verb(v) => self.attach(entity, v),
            AnyComponent::Subject(s) => self.attach(entity, s),
        }
    }

    /// Remove a component by kind. Same Bounds rule as `detach`.
    pub fn detach_kind(&mut self, entity: Entity, kind: ComponentKind) {
        match kind {
            ComponentKind::Bounds => {
                self.detach::<Bounds>(entity);
            }
            ComponentKind::Draggable => {
                self.detach::<Draggable>(entity);
            }
            ComponentKind::PlayerControlled => {
                self.detach::<PlayerControlled>(entity);
            }
            ComponentKind::Pushable => {
                self.detach::<Pushable>(entity);
            }
            ComponentKind::Blocking => {
                self.detach::<Blocking>(entity);
            }
            ComponentKind::Destructible => {
                self.detach::<Destructible>(entity);
            }
            ComponentKind::WinTrigger => {
                self.detach::<WinTrigger>(entity);
            }
            ComponentKind::Operator => {
                self.detach::<Operator>(entity);
            }
            ComponentKind::Noun => {
                self.detach::<Noun>(entity);
            }
            ComponentKind::Verb => {
                self.detach::<Verb>(entity);
            }
            ComponentKind::Subject => {
                self.detach::<Subject>(entity);
            }
        }
    }

    pub fn has_capability(&self, entity: Entity, capability: Capability) -> bool {
        match capability {
            Capability::PlayerControlled => self.has::<PlayerControlled>(entity),
            Capability::WinTrigger => self.has::<WinTrigger>(entity),
            Capability::Blocking => self.has::<Blocking>(entity),
            Capability::Pushable => self.has::<Pushable>(entity),
            Capability::Destructible => self.has::<Destructible>(entity),
        }
    }

    pub fn grant(&mut self, entity: Entity, capability: Capability) {
        self.attach_any(entity, capability.component());
    }

    pub fn revoke(&mut self, entity: Entity, capability: Capability) {
        self.detach_kind(entity, capability.kind());
    }

    // =========================================================================
    // Convenience Spawners
    // =========================================================================

    /// A noun word-block. Word-blocks are always pushable.
    pub fn spawn_noun(&mut self, bounds: Bounds, word: &str) -> Entity {
        self.create_entity([bounds.into(), Noun::new(word).into(), AnyComponent::Pushable])
    }

    /// An "IS" word-block.
    pub fn spawn_operator(&mut self, bounds: Bounds) -> Entity {
        self.create_entity([bounds.into(), AnyComponent::Operator, AnyComponent::Pushable])
    }

    pub fn spawn_verb(&mut self, bounds: Bounds, target: Capability) -> Entity {
        self.create_entity([bounds.into(), Verb::new(target).into(), AnyComponent::Pushable])
    }

    /// A game object that rules about `word` apply to.
    pub fn spawn_subject(&mut self, bounds: Bounds, word: &str) -> Entity {
        self.create_entity([bounds.into(), Subject::new(word).into()])
    }
}
