//! Cloneable façade for hosts talking to a running runtime.
//!
//! [`RuntimeHandle`] is the only thing host code needs after the runtime is
//! built: it feeds rest-exit triggers in from any thread, answers cooldown
//! queries and streams events from specific topics.
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, oneshot};

use boost_core::{ActorId, RestExit, Tick, World};

use super::errors::{Result, RuntimeError};
use crate::animation::AnimationSequencer;
use crate::cooldown::CooldownTracker;
use crate::events::{Event, EventBus, Topic};
use crate::intake::{IntakeQueue, RestExitListener, TriggerOutcome};
use crate::sched::Authoritative;
use crate::workers::{Command, WorkerHandle};

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    worker: WorkerHandle,
    listener: RestExitListener,
    queue: IntakeQueue,
    cooldown: CooldownTracker,
    sequencer: Arc<AnimationSequencer>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(
        worker: WorkerHandle,
        listener: RestExitListener,
        queue: IntakeQueue,
        cooldown: CooldownTracker,
        sequencer: Arc<AnimationSequencer>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            worker,
            listener,
            queue,
            cooldown,
            sequencer,
            event_bus,
        }
    }

    /// Offers a rest-exit trigger. Never blocks; callable from any thread.
    pub fn on_rest_exit(&self, trigger: &RestExit) -> TriggerOutcome {
        self.listener.on_rest_exit(trigger)
    }

    pub fn is_on_cooldown(&self, actor: ActorId) -> bool {
        self.cooldown.is_on_cooldown(actor)
    }

    /// Current tick of the authoritative clock.
    pub fn now(&self) -> Tick {
        self.worker.now()
    }

    /// Triggers queued for the next drain.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn cooldown_len(&self) -> usize {
        self.cooldown.len()
    }

    pub fn active_animations(&self) -> usize {
        self.sequencer.active_runs()
    }

    /// Runs `f` against the world on the tick worker and returns its result.
    pub async fn query<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut dyn World) -> R + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job = Box::new(move |world: &mut dyn World| {
            // The caller may have given up waiting; nothing to do then.
            let _ = reply_tx.send(f(world));
        });

        if !self.worker.send(Command::Run(job)) {
            return Err(RuntimeError::CommandChannelClosed);
        }
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Intake` - Triggers queued or rejected
    /// - `Topic::Cooldown` - Admissions and expiries
    /// - `Topic::Apply` - Dispatch, application, discards and failures
    /// - `Topic::Animation` - Animation runs started and finished
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::Topic;
    ///
    /// let mut cooldown_rx = handle.subscribe(Topic::Cooldown);
    /// while let Ok(event) = cooldown_rx.recv().await {
    ///     // Handle cooldown events
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }
}
