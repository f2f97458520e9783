//! High-level runtime orchestrator.
//!
//! The runtime owns the tick worker and the timer pool, wires the boost
//! pipeline onto them and exposes a builder-based API for hosts.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use boost_core::{AnimationPlan, BoostConfig, EligibilityGate, MorningGate, World};
use tracing::info;

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::{Event, EventBus, Topic};
use crate::service::{BoostService, ServiceSettings};
use crate::workers::{TickWorker, TokioTimers, WorkerHandle};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub tick_duration: Duration,
    pub drain_period_ticks: u64,
    pub apply_delay_ticks: u64,
    pub event_buffer_size: usize,
    pub animation: AnimationPlan,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let settings = ServiceSettings::default();
        Self {
            tick_duration: settings.tick_duration,
            drain_period_ticks: settings.drain_period_ticks,
            apply_delay_ticks: settings.apply_delay_ticks,
            event_buffer_size: 100,
            animation: settings.animation,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BOOST_TICK_MS` - Length of one authoritative tick (default: 50)
    /// - `BOOST_DRAIN_PERIOD_TICKS` - Ticks between intake drains (default: 2)
    /// - `BOOST_APPLY_DELAY_TICKS` - Settle delay before application (default: 2)
    /// - `BOOST_EVENT_BUFFER` - Capacity of each event topic (default: 100)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = read_env::<u64>("BOOST_TICK_MS") {
            config.tick_duration = Duration::from_millis(ms.max(1));
        }
        if let Some(ticks) = read_env::<u64>("BOOST_DRAIN_PERIOD_TICKS") {
            config.drain_period_ticks = ticks.max(1);
        }
        if let Some(ticks) = read_env::<u64>("BOOST_APPLY_DELAY_TICKS") {
            config.apply_delay_ticks = ticks;
        }
        if let Some(capacity) = read_env::<usize>("BOOST_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }

        config
    }

    fn settings(&self) -> ServiceSettings {
        ServiceSettings {
            drain_period_ticks: self.drain_period_ticks,
            apply_delay_ticks: self.apply_delay_ticks,
            tick_duration: self.tick_duration,
            animation: self.animation,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

/// Running boost runtime.
///
/// Owns the tick worker task and the timer pool. [`RuntimeHandle`] provides
/// a cloneable façade for hosts.
pub struct Runtime {
    handle: RuntimeHandle,
    worker: WorkerHandle,
    timers: TokioTimers,
    worker_task: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Subscribe to events from one topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// Stops running animation timers, then the tick worker. Jobs still
    /// queued on the worker are dropped.
    pub async fn shutdown(self) -> Result<()> {
        self.timers.shutdown();
        self.worker.shutdown();
        drop(self.handle);

        self.worker_task.await.map_err(RuntimeError::WorkerJoin)?;
        info!(target: "runtime::worker", "Runtime shut down");
        Ok(())
    }
}

/// Builder for [`Runtime`].
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    boost: BoostConfig,
    gate: Arc<dyn EligibilityGate>,
    world: Option<Box<dyn World>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            boost: BoostConfig::default(),
            gate: Arc::new(MorningGate::default()),
            world: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Effect bundle, particle, sound and greeting to apply
    pub fn boost(mut self, boost: BoostConfig) -> Self {
        self.boost = boost;
        self
    }

    /// Replace the default [`MorningGate`] eligibility predicate
    pub fn gate(mut self, gate: impl EligibilityGate + 'static) -> Self {
        self.gate = Arc::new(gate);
        self
    }

    /// Set required host world
    pub fn world(mut self, world: impl World) -> Self {
        self.world = Some(Box::new(world));
        self
    }

    /// Build the runtime and start its workers.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn build(self) -> Result<Runtime> {
        let world = self.world.ok_or(RuntimeError::MissingWorld)?;
        if self.config.tick_duration.is_zero() {
            return Err(RuntimeError::ZeroTickDuration);
        }

        let events = EventBus::with_capacity(self.config.event_buffer_size);
        let (worker, worker_handle) = TickWorker::new(world, self.config.tick_duration);
        let timers = TokioTimers::current();

        let service = BoostService::new(
            self.boost,
            self.config.settings(),
            self.gate,
            Arc::new(worker_handle.clone()),
            Arc::new(timers.clone()),
            events.clone(),
        );
        service.start();

        let worker_task = tokio::spawn(async move {
            worker.run().await;
        });

        let handle = RuntimeHandle::new(
            worker_handle.clone(),
            service.listener().clone(),
            service.queue().clone(),
            service.cooldown().clone(),
            Arc::clone(service.sequencer()),
            events,
        );

        Ok(Runtime {
            handle,
            worker: worker_handle,
            timers,
            worker_task,
        })
    }
}
