//! Periodic drain of the intake queue on the authoritative tick clock.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use boost_core::{ActorId, World};
use tracing::{debug, error, trace};

use crate::applier::EffectApplier;
use crate::cooldown::CooldownTracker;
use crate::events::{ApplyEvent, CooldownEvent, DiscardStage, Event, EventBus};
use crate::intake::IntakeQueue;
use crate::sched::Authoritative;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Draining,
}

/// Outcome counts of one drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Admitted and dispatched to the applier.
    pub admitted: usize,
    /// Unreachable when popped.
    pub discarded: usize,
    /// Already on cooldown (queued twice, or admitted since enqueue).
    pub duplicates: usize,
    /// Entries whose processing panicked.
    pub failed: usize,
}

impl DrainReport {
    pub fn total(&self) -> usize {
        self.admitted + self.discarded + self.duplicates + self.failed
    }
}

enum EntryOutcome {
    Admitted,
    Discarded,
    Duplicate,
}

pub struct BatchScheduler {
    queue: IntakeQueue,
    cooldown: CooldownTracker,
    applier: EffectApplier,
    executor: Arc<dyn Authoritative>,
    events: EventBus,
    ttl_ticks: u64,
    period_ticks: u64,
    draining: AtomicBool,
}

impl BatchScheduler {
    pub fn new(
        queue: IntakeQueue,
        cooldown: CooldownTracker,
        applier: EffectApplier,
        executor: Arc<dyn Authoritative>,
        events: EventBus,
        ttl_ticks: u64,
        period_ticks: u64,
    ) -> Self {
        Self {
            queue,
            cooldown,
            applier,
            executor,
            events,
            ttl_ticks,
            period_ticks: period_ticks.max(1),
            draining: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> BatchState {
        if self.draining.load(Ordering::Acquire) {
            BatchState::Draining
        } else {
            BatchState::Idle
        }
    }

    /// Registers the periodic drain with the authoritative executor.
    pub fn start(self: &Arc<Self>) {
        let this = Arc::clone(self);
        self.executor.submit_repeating(
            self.period_ticks,
            Box::new(move |world| {
                this.drain_tick(world);
            }),
        );
        debug!(target: "runtime::batch", period_ticks = self.period_ticks, "Batch drain started");
    }

    /// Drains every entry queued when the call began.
    ///
    /// Must run on the authoritative thread.
    pub fn drain_tick(&self, world: &mut dyn World) -> DrainReport {
        let mut report = DrainReport::default();
        if self
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return report;
        }

        let batch = self.queue.drain_all();
        for actor in batch {
            match catch_unwind(AssertUnwindSafe(|| self.process(actor, world))) {
                Ok(EntryOutcome::Admitted) => report.admitted += 1,
                Ok(EntryOutcome::Discarded) => report.discarded += 1,
                Ok(EntryOutcome::Duplicate) => report.duplicates += 1,
                Err(_) => {
                    error!(target: "runtime::batch", %actor, "Drain entry panicked; continuing");
                    report.failed += 1;
                }
            }
        }

        self.draining.store(false, Ordering::Release);
        if report.total() > 0 {
            trace!(
                target: "runtime::batch",
                tick = %self.executor.now(),
                admitted = report.admitted,
                discarded = report.discarded,
                duplicates = report.duplicates,
                "Drain complete"
            );
        }
        report
    }

    fn process(&self, actor: ActorId, world: &mut dyn World) -> EntryOutcome {
        if !world.is_reachable(actor) {
            self.events.publish(Event::Apply(ApplyEvent::Discarded {
                actor,
                stage: DiscardStage::Drain,
            }));
            return EntryOutcome::Discarded;
        }
        if !self.cooldown.admit(actor) {
            return EntryOutcome::Duplicate;
        }

        let tick = self.executor.now();
        self.cooldown
            .schedule_expiry(actor, self.ttl_ticks, self.executor.as_ref());
        self.applier.apply(actor);

        self.events.publish(Event::Cooldown(CooldownEvent::Admitted {
            actor,
            tick,
            ttl_ticks: self.ttl_ticks,
        }));
        self.events
            .publish(Event::Apply(ApplyEvent::Dispatched { actor, tick }));
        EntryOutcome::Admitted
    }
}
