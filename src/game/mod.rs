//! Game Foundation Module
//!
//! A small ECS-style core for a push-block puzzle where sentences spelled
//! out by word-blocks decide how every other object behaves.
//!
//! Key concepts:
//! - Entity: monotonic id, never reused
//! - Component: plain data; capability tags are granted by rules
//! - World: container for all entities and their components
//! - Signal: synchronous notifications between renderer, hit tester and rules
//!
//! Design philosophy:
//! - Simple over flexible (the component set is closed)
//! - Rules are derived from the board every frame, never stored
//! - No runtime type registration (compile-time known components)

pub mod collision;
pub mod component;
pub mod components;
pub mod entity;
pub mod event;
pub mod renderer;
pub mod rules;
pub mod runtime;
pub mod world;

// Re-export main types
pub use entity::Entity;
pub use event::{Signal, SignalKind};
pub use runtime::Engine;
pub use world::World;
