//! Topic-based event bus for runtime events.
//!
//! Every stage of the boost pipeline reports what it did here, so hosts and
//! tests can observe admissions, expiries and animation runs without reaching
//! into component state.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{
    AnimationEvent, ApplyEvent, CooldownEvent, DiscardStage, IntakeEvent, RejectReason, RunId,
};
