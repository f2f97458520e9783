//! Scheduling capabilities injected into every runtime component.
//!
//! Two separate capabilities exist:
//! - [`Authoritative`] runs work on the single thread that owns the
//!   [`World`]. Immediate, tick-delayed and tick-periodic jobs all go through
//!   it, and it is the only path to world mutation.
//! - [`TimerPool`] runs free-running periodic callbacks off the authoritative
//!   thread. Timer callbacks never see the world; they hand work back to an
//!   [`Authoritative`] executor.
//!
//! Production wires the tokio [`crate::TickWorker`] and
//! [`crate::TokioTimers`]; tests use [`ManualScheduler`], which
//! implements both on a manually stepped clock.

mod manual;
mod queue;

pub use manual::ManualScheduler;
pub(crate) use queue::TickQueue;

use std::ops::ControlFlow;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use boost_core::{Tick, World};
use tracing::error;

/// One-shot unit of work executed on the authoritative thread.
pub type WorldJob = Box<dyn FnOnce(&mut dyn World) + Send + 'static>;

/// Periodic unit of work executed on the authoritative thread.
pub type RepeatingJob = Box<dyn FnMut(&mut dyn World) + Send + 'static>;

/// Periodic timer callback. Returning `Break` cancels the timer.
pub type TimerTask = Box<dyn FnMut() -> ControlFlow<()> + Send + 'static>;

/// Executor bound to the authoritative simulation thread.
pub trait Authoritative: Send + Sync {
    /// Current tick of the authoritative clock.
    fn now(&self) -> Tick;

    /// Runs `job` as soon as the authoritative thread is free.
    fn submit(&self, job: WorldJob);

    /// Runs `job` on the tick `now() + delay_ticks`.
    fn submit_after(&self, delay_ticks: u64, job: WorldJob);

    /// Runs `job` on the next tick and then every `period_ticks` ticks.
    fn submit_repeating(&self, period_ticks: u64, job: RepeatingJob);
}

/// Free-running periodic timers, independent of the tick clock.
pub trait TimerPool: Send + Sync {
    /// Fires `task` immediately and then every `period` until it breaks.
    fn schedule_repeating(&self, period: Duration, task: TimerTask);
}

/// Shared, monotonically increasing tick counter.
#[derive(Clone, Debug, Default)]
pub struct TickClock(Arc<AtomicU64>);

impl TickClock {
    pub fn starting_at(tick: Tick) -> Self {
        Self(Arc::new(AtomicU64::new(tick.0)))
    }

    pub fn now(&self) -> Tick {
        Tick(self.0.load(Ordering::Acquire))
    }

    /// Moves the clock forward by one tick and returns the new tick.
    pub fn advance(&self) -> Tick {
        Tick(self.0.fetch_add(1, Ordering::AcqRel) + 1)
    }
}

/// Runs `job`, containing any panic to this job alone.
pub(crate) fn run_isolated(world: &mut dyn World, job: WorldJob) {
    if catch_unwind(AssertUnwindSafe(|| job(world))).is_err() {
        error!(target: "runtime::worker", "Authoritative job panicked; continuing");
    }
}

/// Runs one firing of a periodic job, containing any panic.
pub(crate) fn run_repeating_isolated(world: &mut dyn World, job: &mut RepeatingJob) {
    if catch_unwind(AssertUnwindSafe(|| job(world))).is_err() {
        error!(target: "runtime::worker", "Repeating job panicked; continuing");
    }
}
