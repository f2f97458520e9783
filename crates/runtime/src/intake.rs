//! Trigger intake: eligibility check and the pending-actor queue.

use std::sync::Arc;

use boost_core::{ActorId, EligibilityGate, RestExit};
use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::trace;

use crate::cooldown::CooldownTracker;
use crate::events::{Event, EventBus, IntakeEvent, RejectReason};

/// Unbounded FIFO of actors waiting for the next batch drain.
///
/// `enqueue` is lock-free and callable from any thread. Duplicates are
/// allowed; the drain re-validates every entry.
#[derive(Clone)]
pub struct IntakeQueue {
    tx: Sender<ActorId>,
    rx: Receiver<ActorId>,
}

impl IntakeQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn enqueue(&self, actor: ActorId) {
        // The receiver lives in `self`, so the channel cannot be disconnected.
        let _ = self.tx.send(actor);
    }

    /// Removes and returns every entry present when the drain began.
    ///
    /// Entries enqueued while draining stay queued for the next drain.
    pub fn drain_all(&self) -> Vec<ActorId> {
        let observed = self.rx.len();
        self.rx.try_iter().take(observed).collect()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for IntakeQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of offering one trigger to the intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Queued,
    Ineligible,
    OnCooldown,
}

/// Entry point for rest-exit triggers, callable from any thread.
#[derive(Clone)]
pub struct RestExitListener {
    gate: Arc<dyn EligibilityGate>,
    cooldown: CooldownTracker,
    queue: IntakeQueue,
    events: EventBus,
}

impl RestExitListener {
    pub fn new(
        gate: Arc<dyn EligibilityGate>,
        cooldown: CooldownTracker,
        queue: IntakeQueue,
        events: EventBus,
    ) -> Self {
        Self {
            gate,
            cooldown,
            queue,
            events,
        }
    }

    pub fn on_rest_exit(&self, trigger: &RestExit) -> TriggerOutcome {
        let actor = trigger.actor;
        let outcome = if !self.gate.is_eligible(trigger) {
            TriggerOutcome::Ineligible
        } else if self.cooldown.is_on_cooldown(actor) {
            TriggerOutcome::OnCooldown
        } else {
            self.queue.enqueue(actor);
            TriggerOutcome::Queued
        };

        trace!(target: "runtime::intake", %actor, ?outcome, "Rest exit observed");

        let event = match outcome {
            TriggerOutcome::Queued => IntakeEvent::Queued { actor },
            TriggerOutcome::Ineligible => IntakeEvent::Rejected {
                actor,
                reason: RejectReason::Ineligible,
            },
            TriggerOutcome::OnCooldown => IntakeEvent::Rejected {
                actor,
                reason: RejectReason::OnCooldown,
            },
        };
        self.events.publish(Event::Intake(event));
        outcome
    }
}
