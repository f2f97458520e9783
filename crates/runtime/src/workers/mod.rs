//! Tokio-backed executors that back a running [`crate::Runtime`].
//!
//! The tick worker owns the world and is the production [`crate::Authoritative`]
//! executor; the timer pool runs animation timers off that thread.

mod tick;
mod timers;

pub use tick::{Command, TickWorker, WorkerHandle};
pub use timers::TokioTimers;
