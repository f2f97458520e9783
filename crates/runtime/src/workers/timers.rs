//! Free-running timer pool on tokio tasks.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};

use tracing::trace;

use crate::sched::{TimerPool, TimerTask};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// [`TimerPool`] spawning one tokio task per timer.
///
/// Every task also watches a shared shutdown flag so [`TokioTimers::shutdown`]
/// stops timers that have not finished on their own.
#[derive(Clone)]
pub struct TokioTimers {
    runtime: Handle,
    shutdown_tx: Arc<watch::Sender<bool>>,
    active: Arc<AtomicUsize>,
}

impl TokioTimers {
    pub fn new(runtime: Handle) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            runtime,
            shutdown_tx: Arc::new(shutdown_tx),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Timers bound to the runtime the caller is running on.
    ///
    /// Panics outside a tokio runtime, like [`Handle::current`].
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Timer tasks still running.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Stops every running timer. Timers scheduled afterwards never fire.
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }
}

impl TimerPool for TokioTimers {
    fn schedule_repeating(&self, period: Duration, mut task: TimerTask) {
        let mut shutdown = self.shutdown_tx.subscribe();
        if *shutdown.borrow() {
            return;
        }

        let active = Arc::clone(&self.active);
        active.fetch_add(1, Ordering::AcqRel);
        self.runtime.spawn(async move {
            let mut ticker = interval(period.max(MIN_PERIOD));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let ControlFlow::Break(()) = task() {
                            break;
                        }
                    }
                    _ = shutdown.changed() => {
                        trace!(target: "runtime::worker", "Timer stopped by shutdown");
                        break;
                    }
                }
            }
            active.fetch_sub(1, Ordering::AcqRel);
        });
    }
}
