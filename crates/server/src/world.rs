//! In-memory host world used by the headless server.
//!
//! Rendering primitives are logged and counted instead of reaching real
//! clients, so the scheduling core can be run and observed without a game.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use boost_core::{
    ActorId, EffectKind, EffectOptions, EffectSpec, Greeting, Location, ParticleKind, RenderError,
    SoundId, World,
};
use tracing::{debug, trace};

/// Counters of primitives rendered so far. Shared with the caller.
#[derive(Debug, Default)]
pub struct RenderStats {
    pub effects: AtomicU64,
    pub messages: AtomicU64,
    pub titles: AtomicU64,
    pub sounds: AtomicU64,
    pub particles: AtomicU64,
}

impl RenderStats {
    pub fn summary(&self) -> String {
        format!(
            "effects={} messages={} titles={} sounds={} particles={}",
            self.effects.load(Ordering::Relaxed),
            self.messages.load(Ordering::Relaxed),
            self.titles.load(Ordering::Relaxed),
            self.sounds.load(Ordering::Relaxed),
            self.particles.load(Ordering::Relaxed),
        )
    }
}

pub struct HeadlessWorld {
    actors: HashMap<ActorId, Location>,
    stats: Arc<RenderStats>,
}

impl HeadlessWorld {
    pub fn new(stats: Arc<RenderStats>) -> Self {
        Self {
            actors: HashMap::new(),
            stats,
        }
    }

    /// Adds a connected actor standing at `at`.
    pub fn with_actor(mut self, actor: ActorId, at: Location) -> Self {
        self.actors.insert(actor, at);
        self
    }

    fn known(&self, actor: ActorId) -> Result<(), RenderError> {
        if self.actors.contains_key(&actor) {
            Ok(())
        } else {
            Err(RenderError::ActorGone(actor))
        }
    }
}

impl World for HeadlessWorld {
    fn is_reachable(&self, actor: ActorId) -> bool {
        self.actors.contains_key(&actor)
    }

    fn location(&self, actor: ActorId) -> Option<Location> {
        self.actors.get(&actor).copied()
    }

    fn apply_effect(
        &mut self,
        actor: ActorId,
        kind: EffectKind,
        spec: EffectSpec,
        options: EffectOptions,
    ) -> Result<(), RenderError> {
        self.known(actor)?;
        debug!(
            %actor,
            %kind,
            duration_ticks = spec.duration_ticks,
            amplifier = spec.amplifier,
            ambient = options.ambient,
            "Effect applied"
        );
        self.stats.effects.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn send_message(&mut self, actor: ActorId, text: &str) -> Result<(), RenderError> {
        self.known(actor)?;
        debug!(%actor, text, "Message sent");
        self.stats.messages.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn show_title(&mut self, actor: ActorId, greeting: &Greeting) -> Result<(), RenderError> {
        self.known(actor)?;
        debug!(%actor, title = %greeting.title, subtitle = %greeting.subtitle, "Title shown");
        self.stats.titles.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn play_sound(
        &mut self,
        actor: ActorId,
        sound: &SoundId,
        at: Location,
        volume: f32,
        pitch: f32,
    ) -> Result<(), RenderError> {
        self.known(actor)?;
        debug!(%actor, sound = sound.as_str(), x = at.x, y = at.y, z = at.z, volume, pitch, "Sound played");
        self.stats.sounds.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn emit_particle(&mut self, at: Location, particle: &ParticleKind) -> Result<(), RenderError> {
        trace!(particle = particle.as_str(), x = at.x, y = at.y, z = at.z, "Particle emitted");
        self.stats.particles.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
