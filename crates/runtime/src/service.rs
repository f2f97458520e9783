//! Composition of the boost pipeline over injected executors.
//!
//! [`BoostService`] owns one instance of every pipeline component and wires
//! them together. It knows nothing about tokio: the production runtime hands
//! it a [`crate::WorkerHandle`] and [`crate::TokioTimers`], tests hand it a
//! [`crate::ManualScheduler`].

use std::sync::Arc;
use std::time::Duration;

use boost_core::{AnimationPlan, BoostConfig, EligibilityGate};
use tracing::info;

use crate::animation::AnimationSequencer;
use crate::applier::EffectApplier;
use crate::batch::BatchScheduler;
use crate::cooldown::CooldownTracker;
use crate::events::EventBus;
use crate::intake::{IntakeQueue, RestExitListener};
use crate::sched::{Authoritative, TimerPool};

/// Timing knobs of the pipeline, in ticks of the authoritative clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceSettings {
    pub drain_period_ticks: u64,
    pub apply_delay_ticks: u64,
    pub tick_duration: Duration,
    pub animation: AnimationPlan,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            drain_period_ticks: 2,
            apply_delay_ticks: 2,
            tick_duration: Duration::from_millis(50),
            animation: AnimationPlan::default(),
        }
    }
}

pub struct BoostService {
    config: Arc<BoostConfig>,
    queue: IntakeQueue,
    cooldown: CooldownTracker,
    listener: RestExitListener,
    sequencer: Arc<AnimationSequencer>,
    batch: Arc<BatchScheduler>,
    events: EventBus,
}

impl BoostService {
    pub fn new(
        config: BoostConfig,
        settings: ServiceSettings,
        gate: Arc<dyn EligibilityGate>,
        executor: Arc<dyn Authoritative>,
        timers: Arc<dyn TimerPool>,
        events: EventBus,
    ) -> Self {
        let config = Arc::new(config);
        let queue = IntakeQueue::new();
        let cooldown = CooldownTracker::with_events(events.clone());
        let listener =
            RestExitListener::new(gate, cooldown.clone(), queue.clone(), events.clone());

        let sequencer = Arc::new(AnimationSequencer::new(
            &config.particle,
            settings.animation,
            settings.tick_duration,
            Arc::clone(&executor),
            timers,
            events.clone(),
        ));
        let applier = EffectApplier::new(
            Arc::clone(&config),
            settings.apply_delay_ticks,
            Arc::clone(&executor),
            Arc::clone(&sequencer),
            events.clone(),
        );
        let batch = Arc::new(BatchScheduler::new(
            queue.clone(),
            cooldown.clone(),
            applier,
            executor,
            events.clone(),
            config.cooldown_ttl(),
            settings.drain_period_ticks,
        ));

        Self {
            config,
            queue,
            cooldown,
            listener,
            sequencer,
            batch,
            events,
        }
    }

    /// Registers the periodic drain. Call once.
    pub fn start(&self) {
        info!(
            target: "runtime::batch",
            effects = self.config.effects.len(),
            ttl_ticks = self.config.cooldown_ttl(),
            particles = self.sequencer.offsets().len(),
            "Boost service started"
        );
        self.batch.start();
    }

    pub fn config(&self) -> &BoostConfig {
        &self.config
    }

    pub fn listener(&self) -> &RestExitListener {
        &self.listener
    }

    pub fn queue(&self) -> &IntakeQueue {
        &self.queue
    }

    pub fn cooldown(&self) -> &CooldownTracker {
        &self.cooldown
    }

    pub fn batch(&self) -> &Arc<BatchScheduler> {
        &self.batch
    }

    pub fn sequencer(&self) -> &Arc<AnimationSequencer> {
        &self.sequencer
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }
}
