//! Wake-up sparkle animation.
//!
//! A run is driven by a free-running timer from the [`TimerPool`]. The timer
//! callback never touches the world: for every ring sample it submits one
//! particle emission to the [`Authoritative`] executor, then advances its own
//! frame counter. After the plan's last frame batch the callback breaks,
//! which cancels the timer and drops the run.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use boost_core::{
    ActorId, AnimationPlan, Location, Offset, ParticleKind, ParticleSpec, precompute_offsets,
};
use tracing::{debug, trace};

use crate::events::{AnimationEvent, Event, EventBus, RunId};
use crate::sched::{Authoritative, TimerPool};

/// State of one animation run, owned by its timer callback.
///
/// Dropping the run ends it and publishes `Finished`. That includes timers
/// stopped by a pool shutdown and timers the pool never accepted.
struct AnimationRun {
    id: RunId,
    actor: ActorId,
    base: Location,
    frame: u32,
    active: Arc<AtomicUsize>,
    events: EventBus,
}

impl Drop for AnimationRun {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
        self.events.publish(Event::Animation(AnimationEvent::Finished {
            actor: self.actor,
            run: self.id,
            batches: self.frame,
        }));
        debug!(
            target: "runtime::animation",
            actor = %self.actor,
            run = self.id.0,
            batches = self.frame,
            "Animation run finished"
        );
    }
}

pub struct AnimationSequencer {
    offsets: Arc<[Offset]>,
    particle: ParticleKind,
    plan: AnimationPlan,
    period: Duration,
    executor: Arc<dyn Authoritative>,
    timers: Arc<dyn TimerPool>,
    events: EventBus,
    active: Arc<AtomicUsize>,
    next_run: AtomicU64,
}

impl AnimationSequencer {
    /// `tick_duration` converts the plan's tick interval into timer time.
    pub fn new(
        particle: &ParticleSpec,
        plan: AnimationPlan,
        tick_duration: Duration,
        executor: Arc<dyn Authoritative>,
        timers: Arc<dyn TimerPool>,
        events: EventBus,
    ) -> Self {
        Self {
            offsets: precompute_offsets(particle).into(),
            particle: particle.kind.clone(),
            plan,
            period: tick_duration * plan.interval_ticks.max(1),
            executor,
            timers,
            events,
            active: Arc::new(AtomicUsize::new(0)),
            next_run: AtomicU64::new(0),
        }
    }

    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    /// Runs still emitting frames.
    pub fn active_runs(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Starts a run for `actor` around `base`.
    ///
    /// Runs for the same actor are independent and may overlap.
    pub fn start(&self, actor: ActorId, base: Location) -> RunId {
        let id = RunId(self.next_run.fetch_add(1, Ordering::Relaxed) + 1);
        let batches = self.plan.frame_batches();
        if batches == 0 || self.offsets.is_empty() {
            debug!(target: "runtime::animation", %actor, "Animation plan is empty; skipping run");
            return id;
        }

        self.active.fetch_add(1, Ordering::AcqRel);
        self.events
            .publish(Event::Animation(AnimationEvent::Started { actor, run: id }));

        let mut run = AnimationRun {
            id,
            actor,
            base,
            frame: 0,
            active: Arc::clone(&self.active),
            events: self.events.clone(),
        };
        let offsets = Arc::clone(&self.offsets);
        let particle = self.particle.clone();
        let plan = self.plan;
        let executor = Arc::clone(&self.executor);

        self.timers.schedule_repeating(
            self.period,
            Box::new(move || {
                let height = plan.height_at(run.frame);
                for &offset in offsets.iter() {
                    let at = run.base.offset_by(offset, height);
                    let particle = particle.clone();
                    let actor = run.actor;
                    executor.submit(Box::new(move |world| {
                        // Frames keep their cadence after a disconnect but stop drawing.
                        if !world.is_reachable(actor) {
                            return;
                        }
                        if let Err(error) = world.emit_particle(at, &particle) {
                            trace!(target: "runtime::animation", %actor, %error, "Particle emission failed");
                        }
                    }));
                }

                run.frame += 1;
                if run.frame < batches {
                    ControlFlow::Continue(())
                } else {
                    ControlFlow::Break(())
                }
            }),
        );
        id
    }
}
