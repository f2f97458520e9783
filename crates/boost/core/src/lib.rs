//! Domain model for the wake-boost scheduler.
//!
//! `boost-core` defines the data the scheduling runtime moves around (actor
//! ids, ticks, locations, trigger snapshots), the resolved static
//! configuration ([`BoostConfig`]), the eligibility predicate, the animation
//! geometry, and the [`World`] trait through which hosts expose their
//! rendering primitives. Everything here is synchronous and side-effect free;
//! scheduling lives in the `runtime` crate.
pub mod animation;
pub mod config;
pub mod error;
pub mod gate;
pub mod state;
pub mod world;

pub use animation::{AnimationPlan, precompute_offsets};
pub use config::{
    BoostConfig, EffectKind, EffectSpec, Greeting, ParticleKind, ParticleSpec, SoundId,
    TitleTimes,
};
pub use error::{ConfigError, RenderError};
pub use gate::{EligibilityGate, MorningGate};
pub use state::{ActorId, Environment, Location, Offset, RestExit, Tick, WorldSnapshot};
pub use world::{EffectOptions, World};
