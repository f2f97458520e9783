//! Host-facing world interface.
//!
//! The runtime never mutates the world directly. Every call below is issued
//! from a job running on the authoritative executor, which is the only owner
//! of the `World` value.

use crate::config::{EffectKind, EffectSpec, Greeting, ParticleKind, SoundId};
use crate::error::RenderError;
use crate::state::{ActorId, Location};

/// Presentation flags passed along with an applied effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectOptions {
    pub ambient: bool,
    pub show_particles: bool,
}

impl EffectOptions {
    /// Boost effects are ambient and do not spray the host's own particles.
    pub const BOOST: Self = Self {
        ambient: true,
        show_particles: false,
    };
}

/// Reachability queries and rendering primitives supplied by the host.
pub trait World: Send + 'static {
    /// Whether `actor` is still connected and addressable.
    fn is_reachable(&self, actor: ActorId) -> bool;

    /// Current location of `actor`, if reachable.
    fn location(&self, actor: ActorId) -> Option<Location>;

    fn apply_effect(
        &mut self,
        actor: ActorId,
        kind: EffectKind,
        spec: EffectSpec,
        options: EffectOptions,
    ) -> Result<(), RenderError>;

    fn send_message(&mut self, actor: ActorId, text: &str) -> Result<(), RenderError>;

    /// Shows `greeting.title` / `greeting.subtitle` with `greeting.times`.
    fn show_title(&mut self, actor: ActorId, greeting: &Greeting) -> Result<(), RenderError>;

    fn play_sound(
        &mut self,
        actor: ActorId,
        sound: &SoundId,
        at: Location,
        volume: f32,
        pitch: f32,
    ) -> Result<(), RenderError>;

    fn emit_particle(&mut self, at: Location, particle: &ParticleKind) -> Result<(), RenderError>;
}
