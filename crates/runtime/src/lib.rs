//! Scheduling core of the wake-boost service.
//!
//! Rest-exit triggers arrive from any thread, are gated and queued, then
//! drained in batches on a single authoritative tick thread that owns the
//! host [`boost_core::World`]. Admitted actors go on cooldown, receive the
//! configured effect bundle after a short settle delay and get a finite
//! particle animation driven by a free-running timer.
//!
//! Modules are organized by responsibility:
//! - [`sched`] defines the two executor capabilities and a manual executor
//! - [`intake`], [`cooldown`], [`batch`], [`applier`] and [`animation`] are
//!   the pipeline stages, composed by [`service`]
//! - [`runtime`] hosts the tokio orchestrator and builder
//! - [`api`] exposes the types hosts interact with
//! - [`events`] provides topic-based event bus for observing the pipeline
pub mod animation;
pub mod api;
pub mod applier;
pub mod batch;
pub mod cooldown;
pub mod events;
pub mod intake;
pub mod runtime;
pub mod sched;
pub mod service;

mod workers;

pub use animation::AnimationSequencer;
pub use api::{Result, RuntimeError, RuntimeHandle};
pub use applier::EffectApplier;
pub use batch::{BatchScheduler, BatchState, DrainReport};
pub use cooldown::{CooldownTracker, ExpiryRecord};
pub use events::{
    AnimationEvent, ApplyEvent, CooldownEvent, DiscardStage, Event, EventBus, IntakeEvent,
    RejectReason, RunId, Topic,
};
pub use intake::{IntakeQueue, RestExitListener, TriggerOutcome};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use sched::{
    Authoritative, ManualScheduler, RepeatingJob, TickClock, TimerPool, TimerTask, WorldJob,
};
pub use service::{BoostService, ServiceSettings};
pub use workers::{TickWorker, TokioTimers, WorkerHandle};
