//! Tick worker that owns the authoritative [`World`].
//!
//! Receives jobs from [`WorkerHandle`] clones, advances the tick clock on a
//! fixed interval and runs delayed and periodic jobs as they come due. All
//! world access in a running runtime happens inside [`TickWorker::run`].

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};

use boost_core::{Tick, World};
use tracing::{debug, info, trace};

use crate::sched::{
    Authoritative, RepeatingJob, TickClock, TickQueue, WorldJob, run_isolated,
    run_repeating_isolated,
};

/// Commands accepted by the tick worker.
pub enum Command {
    /// Run as soon as the worker is free.
    Run(WorldJob),
    /// Run on the given tick.
    RunAt { due: Tick, job: WorldJob },
    /// Run on `first` and then every `period` ticks.
    Repeat {
        first: Tick,
        period: u64,
        job: RepeatingJob,
    },
    /// Stop the worker loop. Pending jobs are dropped.
    Shutdown,
}

/// Background task driving the authoritative tick clock.
pub struct TickWorker {
    world: Box<dyn World>,
    clock: TickClock,
    tick_duration: Duration,
    queue: TickQueue,
    command_rx: mpsc::UnboundedReceiver<Command>,
}

impl TickWorker {
    /// Creates the worker together with the handle used to submit work to it.
    pub fn new(world: Box<dyn World>, tick_duration: Duration) -> (Self, WorkerHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let clock = TickClock::default();
        let handle = WorkerHandle {
            clock: clock.clone(),
            command_tx,
        };
        let worker = Self {
            world,
            clock,
            tick_duration,
            queue: TickQueue::default(),
            command_rx,
        };
        (worker, handle)
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        info!(
            target: "runtime::worker",
            tick_ms = self.tick_duration.as_millis() as u64,
            "Tick worker started"
        );

        let mut ticker = interval(self.tick_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick of a tokio interval completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                _ = ticker.tick() => self.tick(),
            }
        }

        debug!(
            target: "runtime::worker",
            tick = %self.clock.now(),
            dropped = self.queue.pending(),
            "Tick worker stopped"
        );
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Run(job) => run_isolated(&mut *self.world, job),
            Command::RunAt { due, job } => self.queue.push_at(due, job),
            Command::Repeat { first, period, job } => {
                self.queue.push_repeating(first, period, job)
            }
            Command::Shutdown => {}
        }
    }

    fn tick(&mut self) {
        let now = self.clock.advance();
        trace!(target: "runtime::worker", tick = %now, "Tick");

        while let Some(job) = self.queue.pop_due(now) {
            run_isolated(&mut *self.world, job);
        }

        let mut due = self.queue.take_due_repeating(now);
        for repeating in &mut due {
            run_repeating_isolated(&mut *self.world, &mut repeating.job);
        }
        self.queue.restore_repeating(now, due);
    }
}

/// Cloneable [`Authoritative`] executor backed by the tick worker.
#[derive(Clone)]
pub struct WorkerHandle {
    clock: TickClock,
    command_tx: mpsc::UnboundedSender<Command>,
}

impl WorkerHandle {
    pub(crate) fn send(&self, cmd: Command) -> bool {
        self.command_tx.send(cmd).is_ok()
    }

    /// Asks the worker to stop; returns `false` if it already has.
    pub fn shutdown(&self) -> bool {
        self.send(Command::Shutdown)
    }

    fn dispatch(&self, cmd: Command) {
        if !self.send(cmd) {
            debug!(target: "runtime::worker", "Tick worker stopped; dropping job");
        }
    }
}

impl Authoritative for WorkerHandle {
    fn now(&self) -> Tick {
        self.clock.now()
    }

    fn submit(&self, job: WorldJob) {
        self.dispatch(Command::Run(job));
    }

    fn submit_after(&self, delay_ticks: u64, job: WorldJob) {
        let due = self.clock.now() + delay_ticks;
        self.dispatch(Command::RunAt { due, job });
    }

    fn submit_repeating(&self, period_ticks: u64, job: RepeatingJob) {
        let first = self.clock.now() + 1;
        self.dispatch(Command::Repeat {
            first,
            period: period_ticks,
            job,
        });
    }
}
