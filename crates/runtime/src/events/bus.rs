//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast;

use super::types::{AnimationEvent, ApplyEvent, CooldownEvent, IntakeEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Topic {
    /// Trigger intake (queued, rejected)
    Intake,
    /// Cooldown membership changes
    Cooldown,
    /// Effect application outcomes
    Apply,
    /// Animation run lifecycle
    Animation,
}

impl Topic {
    pub const ALL: [Topic; 4] = [Topic::Intake, Topic::Cooldown, Topic::Apply, Topic::Animation];
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Intake(IntakeEvent),
    Cooldown(CooldownEvent),
    Apply(ApplyEvent),
    Animation(AnimationEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Intake(_) => Topic::Intake,
            Event::Cooldown(_) => Topic::Cooldown,
            Event::Apply(_) => Topic::Apply,
            Event::Animation(_) => Topic::Animation,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing never blocks and is safe from any
/// thread, including the authoritative worker.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<HashMap<Topic, broadcast::Sender<Event>>>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let channels = Topic::ALL
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity.max(1)).0))
            .collect();

        Self {
            channels: Arc::new(channels),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if let Some(tx) = self.channels.get(&topic)
            && tx.send(event).is_err()
        {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        match self.channels.get(&topic) {
            Some(tx) => tx.subscribe(),
            // Every topic is created up front; this arm only guards the map lookup.
            None => broadcast::channel(1).1,
        }
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boost_core::ActorId;

    #[test]
    fn events_reach_only_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut intake = bus.subscribe(Topic::Intake);
        let mut cooldown = bus.subscribe(Topic::Cooldown);

        bus.publish(Event::Intake(IntakeEvent::Queued { actor: ActorId(1) }));

        assert_eq!(
            intake.try_recv().unwrap(),
            Event::Intake(IntakeEvent::Queued { actor: ActorId(1) })
        );
        assert!(cooldown.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(Event::Cooldown(CooldownEvent::Expired { actor: ActorId(3) }));
        let receivers = bus.subscribe_multiple(&Topic::ALL);
        assert_eq!(receivers.len(), 4);
    }
}
