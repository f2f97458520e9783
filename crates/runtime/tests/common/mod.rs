//! Recording host world and pipeline harness shared by integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use boost_core::{
    ActorId, BoostConfig, EffectKind, EffectOptions, EffectSpec, Environment, Greeting, Location,
    MorningGate, ParticleKind, RenderError, RestExit, SoundId, World, WorldSnapshot,
};
use runtime::{BoostService, Event, EventBus, ManualScheduler, ServiceSettings};
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq)]
pub enum Render {
    Effect {
        actor: ActorId,
        kind: EffectKind,
        spec: EffectSpec,
        options: EffectOptions,
    },
    Message(ActorId),
    Title(ActorId),
    Sound(ActorId, Location),
    Particle(Location),
}

/// Callback run on every reachability check, before it is answered.
pub type ReachableHook = Box<dyn Fn(ActorId) + Send + Sync>;

/// In-memory world that records every rendering primitive it receives.
#[derive(Default)]
pub struct TestWorld {
    pub locations: HashMap<ActorId, Location>,
    pub offline: HashSet<ActorId>,
    pub rejecting: HashSet<ActorId>,
    pub panicking: HashSet<ActorId>,
    pub on_reachable: Option<ReachableHook>,
    pub log: Vec<Render>,
}

impl TestWorld {
    pub fn with_actors(ids: &[u64]) -> Self {
        let mut world = Self::default();
        for &id in ids {
            world
                .locations
                .insert(ActorId(id), Location::new(id as f64 * 10.0, 64.0, 0.0));
        }
        world
    }

    pub fn disconnect(&mut self, actor: ActorId) {
        self.offline.insert(actor);
    }

    pub fn effects_for(&self, actor: ActorId) -> Vec<EffectKind> {
        self.log
            .iter()
            .filter_map(|r| match r {
                Render::Effect { actor: a, kind, .. } if *a == actor => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub fn messages_for(&self, actor: ActorId) -> usize {
        self.log
            .iter()
            .filter(|r| matches!(r, Render::Message(a) if *a == actor))
            .count()
    }

    pub fn particles(&self) -> usize {
        self.log
            .iter()
            .filter(|r| matches!(r, Render::Particle(_)))
            .count()
    }
}

impl World for TestWorld {
    fn is_reachable(&self, actor: ActorId) -> bool {
        if let Some(hook) = &self.on_reachable {
            hook(actor);
        }
        if self.panicking.contains(&actor) {
            panic!("host failure for {actor}");
        }
        self.locations.contains_key(&actor) && !self.offline.contains(&actor)
    }

    fn location(&self, actor: ActorId) -> Option<Location> {
        self.locations.get(&actor).copied()
    }

    fn apply_effect(
        &mut self,
        actor: ActorId,
        kind: EffectKind,
        spec: EffectSpec,
        options: EffectOptions,
    ) -> Result<(), RenderError> {
        if self.rejecting.contains(&actor) {
            return Err(RenderError::Rejected {
                primitive: "apply_effect",
                reason: "effect blocked".into(),
            });
        }
        self.log.push(Render::Effect {
            actor,
            kind,
            spec,
            options,
        });
        Ok(())
    }

    fn send_message(&mut self, actor: ActorId, _text: &str) -> Result<(), RenderError> {
        self.log.push(Render::Message(actor));
        Ok(())
    }

    fn show_title(&mut self, actor: ActorId, _greeting: &Greeting) -> Result<(), RenderError> {
        self.log.push(Render::Title(actor));
        Ok(())
    }

    fn play_sound(
        &mut self,
        actor: ActorId,
        _sound: &SoundId,
        at: Location,
        _volume: f32,
        _pitch: f32,
    ) -> Result<(), RenderError> {
        self.log.push(Render::Sound(actor, at));
        Ok(())
    }

    fn emit_particle(&mut self, at: Location, _particle: &ParticleKind) -> Result<(), RenderError> {
        self.log.push(Render::Particle(at));
        Ok(())
    }
}

pub struct Harness {
    pub sched: ManualScheduler<TestWorld>,
    pub service: BoostService,
    pub events: EventBus,
}

impl Harness {
    pub fn new(world: TestWorld, config: BoostConfig) -> Self {
        Self::with_scheduler(ManualScheduler::new(world), config)
    }

    pub fn with_scheduler(sched: ManualScheduler<TestWorld>, config: BoostConfig) -> Self {
        let events = EventBus::with_capacity(1024);
        let settings = ServiceSettings {
            tick_duration: sched.tick_duration(),
            ..ServiceSettings::default()
        };
        let service = BoostService::new(
            config,
            settings,
            Arc::new(MorningGate::default()),
            Arc::new(sched.clone()),
            Arc::new(sched.clone()),
            events.clone(),
        );
        service.start();
        Self {
            sched,
            service,
            events,
        }
    }

    pub fn trigger(&self, actor: u64) -> runtime::TriggerOutcome {
        self.service.listener().on_rest_exit(&morning(actor))
    }

    pub fn world<R>(&self, f: impl FnOnce(&mut TestWorld) -> R) -> R {
        self.sched.with_world(f)
    }
}

pub fn morning(actor: u64) -> RestExit {
    RestExit::new(
        ActorId(actor),
        true,
        WorldSnapshot::new(200, Environment::Normal),
    )
}

/// Everything published on `rx` so far.
pub fn collect(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}
