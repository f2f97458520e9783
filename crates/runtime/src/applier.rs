//! Delayed application of the configured effect bundle.

use std::sync::Arc;

use boost_core::{ActorId, BoostConfig, EffectOptions, Location, RenderError, World};
use tracing::{debug, warn};

use crate::animation::AnimationSequencer;
use crate::events::{ApplyEvent, DiscardStage, Event, EventBus};
use crate::sched::Authoritative;

const SOUND_VOLUME: f32 = 1.0;
const SOUND_PITCH: f32 = 1.0;

/// Applies effects, greeting, sound and animation to an admitted actor.
#[derive(Clone)]
pub struct EffectApplier {
    config: Arc<BoostConfig>,
    delay_ticks: u64,
    executor: Arc<dyn Authoritative>,
    sequencer: Arc<AnimationSequencer>,
    events: EventBus,
}

impl EffectApplier {
    pub fn new(
        config: Arc<BoostConfig>,
        delay_ticks: u64,
        executor: Arc<dyn Authoritative>,
        sequencer: Arc<AnimationSequencer>,
        events: EventBus,
    ) -> Self {
        Self {
            config,
            delay_ticks,
            executor,
            sequencer,
            events,
        }
    }

    /// Schedules application for `actor` after the settle delay.
    pub fn apply(&self, actor: ActorId) {
        let this = self.clone();
        self.executor.submit_after(
            self.delay_ticks,
            Box::new(move |world| this.apply_now(actor, world)),
        );
    }

    fn apply_now(&self, actor: ActorId, world: &mut dyn World) {
        let location = match world.location(actor) {
            Some(location) if world.is_reachable(actor) => location,
            _ => {
                self.discard(actor);
                return;
            }
        };

        match self.render(actor, location, world) {
            Ok(()) => {
                debug!(target: "runtime::apply", %actor, "Boost applied");
                self.events.publish(Event::Apply(ApplyEvent::Applied {
                    actor,
                    effects: self.config.effects.len(),
                }));
                self.sequencer.start(actor, location);
            }
            Err(error) if error.is_stale() => self.discard(actor),
            Err(error) => {
                warn!(target: "runtime::apply", %actor, %error, "Boost application failed");
                self.events
                    .publish(Event::Apply(ApplyEvent::Failed { actor, error }));
            }
        }
    }

    fn render(
        &self,
        actor: ActorId,
        location: Location,
        world: &mut dyn World,
    ) -> Result<(), RenderError> {
        for (&kind, &spec) in &self.config.effects {
            world.apply_effect(actor, kind, spec, EffectOptions::BOOST)?;
        }
        let greeting = &self.config.greeting;
        world.send_message(actor, &greeting.message)?;
        world.show_title(actor, greeting)?;
        world.play_sound(actor, &self.config.sound, location, SOUND_VOLUME, SOUND_PITCH)?;
        Ok(())
    }

    fn discard(&self, actor: ActorId) {
        debug!(target: "runtime::apply", %actor, "Actor left before application; skipping");
        self.events.publish(Event::Apply(ApplyEvent::Discarded {
            actor,
            stage: DiscardStage::Apply,
        }));
    }
}
