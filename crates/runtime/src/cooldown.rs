//! Time-bounded cooldown membership.
//!
//! Membership is a concurrent map from actor id to the generation of its
//! current admission. Expiry is an explicit [`ExpiryRecord`] delivered by a
//! one-shot job on the authoritative executor; a record only removes the
//! admission it was issued for, so a late record can never cut short a newer
//! window.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use boost_core::ActorId;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::trace;

use crate::events::{CooldownEvent, Event, EventBus};
use crate::sched::Authoritative;

/// Removal ticket for one admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryRecord {
    pub actor: ActorId,
    pub generation: u64,
}

struct Inner {
    members: DashMap<ActorId, u64>,
    generation: AtomicU64,
    events: Option<EventBus>,
}

/// Set of actors currently on cooldown. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CooldownTracker {
    inner: Arc<Inner>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Tracker that reports expiries on `events`.
    pub fn with_events(events: EventBus) -> Self {
        Self::build(Some(events))
    }

    fn build(events: Option<EventBus>) -> Self {
        Self {
            inner: Arc::new(Inner {
                members: DashMap::new(),
                generation: AtomicU64::new(0),
                events,
            }),
        }
    }

    pub fn is_on_cooldown(&self, actor: ActorId) -> bool {
        self.inner.members.contains_key(&actor)
    }

    /// Adds `actor`; returns `false` without changes if already present.
    pub fn admit(&self, actor: ActorId) -> bool {
        match self.inner.members.entry(actor) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed) + 1;
                slot.insert(generation);
                true
            }
        }
    }

    /// Schedules removal of the current admission of `actor` after `ttl_ticks`.
    ///
    /// Returns the record that will fire, or `None` if `actor` is not a member.
    pub fn schedule_expiry(
        &self,
        actor: ActorId,
        ttl_ticks: u64,
        executor: &dyn Authoritative,
    ) -> Option<ExpiryRecord> {
        let generation = *self.inner.members.get(&actor)?;
        let record = ExpiryRecord { actor, generation };
        let tracker = self.clone();
        executor.submit_after(
            ttl_ticks,
            Box::new(move |_world| {
                tracker.expire(record);
            }),
        );
        Some(record)
    }

    /// Applies `record`; a no-op if the actor is absent or was re-admitted.
    pub fn expire(&self, record: ExpiryRecord) -> bool {
        let removed = self
            .inner
            .members
            .remove_if(&record.actor, |_, generation| *generation == record.generation)
            .is_some();

        if removed {
            trace!(target: "runtime::cooldown", actor = %record.actor, "Cooldown expired");
            if let Some(events) = &self.inner.events {
                events.publish(Event::Cooldown(CooldownEvent::Expired {
                    actor: record.actor,
                }));
            }
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.members.is_empty()
    }
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new()
    }
}
