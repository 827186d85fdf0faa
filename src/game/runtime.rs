//! Game Runtime
//!
//! `Engine` ties the pieces together for one level:
//! - the `Session` (world, hit tester, rules, redraw flag, win latch) that
//!   every listener receives
//! - the `SignalBus` with the built-in listeners installed up front
//!
//! Built-in listener order matters: on FrameEnd the hit tester snapshots
//! first, then the rule engine reads that snapshot.

use macroquad::math::Vec2;
use tracing::{debug, info};

use super::collision::{self, WinLatch};
use super::components::Bounds;
use super::entity::Entity;
use super::event::{RedrawRequest, Signal, SignalBus, SignalKind};
use super::hit_test::HitTester;
use super::rules::{RuleEngine, RuleSet};
use super::world::World;
use crate::config::EngineConfig;
use crate::level::Level;

/// Everything a listener may touch.
#[derive(Debug)]
pub struct Session {
    pub world: World,
    pub hits: HitTester,
    pub rules: RuleEngine,
    pub redraw: RedrawRequest,
    pub win: WinLatch,
}

impl Session {
    pub fn new(world: World, config: &EngineConfig) -> Self {
        Self {
            world,
            hits: HitTester::new(config.play_width as usize, config.play_height as usize),
            rules: RuleEngine::new(config.probe_slop),
            redraw: RedrawRequest::default(),
            win: WinLatch::default(),
        }
    }
}

/// One running level.
#[derive(Debug)]
pub struct Engine {
    session: Session,
    bus: SignalBus<Session>,
}

impl Engine {
    pub fn new(world: World, config: &EngineConfig) -> Self {
        let mut bus = SignalBus::new();

        bus.subscribe(SignalKind::RenderRequested, |s: &mut Session, _: &Signal| {
            s.redraw.request();
        });
        for kind in [SignalKind::FrameBegin, SignalKind::EntityDrawn, SignalKind::FrameEnd] {
            bus.subscribe(kind, |s: &mut Session, signal: &Signal| {
                s.hits.handle(&s.world, signal);
            });
        }
        bus.subscribe(SignalKind::FrameEnd, |s: &mut Session, _: &Signal| {
            let raster = s
                .hits
                .snapshot()
                .expect("rule extraction runs after the hit raster snapshot");
            s.rules.refresh(&mut s.world, raster);
        });
        bus.subscribe(SignalKind::Win, |_: &mut Session, _: &Signal| {
            info!("level complete");
        });

        let mut session = Session::new(world, config);
        session.redraw.request();
        Self { session, bus }
    }

    /// Build a fresh world from a level description.
    pub fn from_level(level: &Level, config: &EngineConfig) -> Self {
        let mut world = World::new();
        level.spawn(&mut world);
        info!(level = %level.name, entities = world.entity_count(), "level loaded");
        Self::new(world, config)
    }

    pub fn world(&self) -> &World {
        &self.session.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.session.world
    }

    /// Add a listener after the built-in ones.
    pub fn subscribe<F>(&mut self, kind: SignalKind, listener: F)
    where
        F: FnMut(&mut Session, &Signal) + 'static,
    {
        self.bus.subscribe(kind, listener);
    }

    pub fn publish(&mut self, signal: Signal) {
        self.bus.publish(&mut self.session, signal);
    }

    pub fn request_redraw(&mut self) {
        self.publish(Signal::RenderRequested);
    }

    /// Pointer drag: move players (and a draggable target), resolve
    /// collisions, announce a win, then ask for a redraw.
    pub fn drag(&mut self, dx: f32, dy: f32, target: Option<Entity>) {
        let outcome = collision::drag(
            &mut self.session.world,
            &mut self.session.win,
            Vec2::new(dx, dy),
            target,
        );
        debug!(dx, dy, moved = outcome.moved, "drag");
        if outcome.won {
            self.publish(Signal::Win);
        }
        self.request_redraw();
    }

    /// Topmost entity at a play-area point, as of the last frame.
    pub fn hit(&self, x: f32, y: f32) -> Option<Entity> {
        self.session.hits.hit(x, y)
    }

    pub fn rules(&self) -> &RuleSet {
        self.session.rules.current()
    }

    pub fn has_won(&self) -> bool {
        self.session.win.is_tripped()
    }

    /// Entities in draw order (oldest first, so newer ones end up on top).
    pub fn draw_list(&self) -> Vec<(Entity, Bounds)> {
        self.session
            .world
            .query::<Bounds>()
            .map(|(e, b)| (e, *b))
            .collect()
    }

    /// Draw every entity through `draw`. When a redraw was requested the
    /// frame signals are published around the draw calls, which rebuilds the
    /// hit raster and re-derives the rules. Returns whether that happened.
    pub fn present<F>(&mut self, mut draw: F) -> bool
    where
        F: FnMut(&World, Entity, &Bounds),
    {
        let rebuild = self.session.redraw.take();
        if rebuild {
            self.publish(Signal::FrameBegin);
        }
        for (entity, bounds) in self.draw_list() {
            draw(&self.session.world, entity, &bounds);
            if rebuild {
                self.publish(Signal::EntityDrawn(entity));
            }
        }
        if rebuild {
            self.publish(Signal::FrameEnd);
        }
        rebuild
    }
}
