//! Signal Bus
//!
//! Signals let the renderer, the hit tester and the rule engine talk without
//! knowing about each other. A typical frame:
//! 1. Renderer publishes FrameBegin → hit tester clears its raster
//! 2. Renderer publishes EntityDrawn per entity → hit tester paints its id
//! 3. Renderer publishes FrameEnd → hit tester snapshots, rules recompute
//!
//! Delivery is synchronous and in subscription order. Listeners get the
//! shared context as `&mut C`; the bus itself is borrowed for the whole
//! delivery, so a listener can't subscribe or publish re-entrantly.

use std::collections::HashMap;
use std::fmt;

use super::entity::Entity;

/// Something that happened, with its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The world changed and wants a redraw. Coalesces.
    RenderRequested,
    /// A frame is about to be drawn
    FrameBegin,
    /// An entity was just drawn; later draws are on top
    EntityDrawn(Entity),
    /// The frame is complete
    FrameEnd,
    /// A player-controlled entity reached a win trigger
    Win,
}

/// Signal discriminant used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    RenderRequested,
    FrameBegin,
    EntityDrawn,
    FrameEnd,
    Win,
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::RenderRequested => SignalKind::RenderRequested,
            Signal::FrameBegin => SignalKind::FrameBegin,
            Signal::EntityDrawn(_) => SignalKind::EntityDrawn,
            Signal::FrameEnd => SignalKind::FrameEnd,
            Signal::Win => SignalKind::Win,
        }
    }
}

pub type Listener<C> = Box<dyn FnMut(&mut C, &Signal)>;

/// Listeners keyed by signal kind.
pub struct SignalBus<C> {
    listeners: HashMap<SignalKind, Vec<Listener<C>>>,
}

impl<C> SignalBus<C> {
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
        }
    }

    /// Register a listener. It runs after every listener already registered
    /// for the same kind.
    pub fn subscribe<F>(&mut self, kind: SignalKind, listener: F)
    where
        F: FnMut(&mut C, &Signal) + 'static,
    {
        self.listeners.entry(kind).or_default().push(Box::new(listener));
    }

    /// Deliver a signal to every listener of its kind, in order.
    pub fn publish(&mut self, ctx: &mut C, signal: Signal) {
        if let Some(listeners) = self.listeners.get_mut(&signal.kind()) {
            for listener in listeners.iter_mut() {
                listener(ctx, &signal);
            }
        }
    }

    pub fn listener_count(&self, kind: SignalKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }
}

impl<C> Default for SignalBus<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for SignalBus<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<(SignalKind, usize)> =
            self.listeners.iter().map(|(k, v)| (*k, v.len())).collect();
        counts.sort_by_key(|(k, _)| *k as u8);
        f.debug_struct("SignalBus").field("listeners", &counts).finish()
    }
}

/// A pending redraw. Any number of requests before the next frame collapse
/// into one.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedrawRequest {
    pending: bool,
}

impl RedrawRequest {
    pub fn request(&mut self) {
        self.pending = true;
    }

    /// Consume the request. True if a redraw was pending.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}
