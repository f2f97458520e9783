use boost_core::{ActorId, RenderError, Tick};

/// Why a trigger was not queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Ineligible,
    OnCooldown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeEvent {
    Queued { actor: ActorId },
    Rejected { actor: ActorId, reason: RejectReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CooldownEvent {
    Admitted {
        actor: ActorId,
        tick: Tick,
        ttl_ticks: u64,
    },
    Expired {
        actor: ActorId,
    },
}

/// Where a stale actor reference was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardStage {
    /// Unreachable when the batch drain popped it.
    Drain,
    /// Unreachable when the delayed application ran.
    Apply,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyEvent {
    /// Delayed application scheduled by the batch drain.
    Dispatched { actor: ActorId, tick: Tick },
    Applied { actor: ActorId, effects: usize },
    Discarded { actor: ActorId, stage: DiscardStage },
    Failed { actor: ActorId, error: RenderError },
}

/// Identifier of one animation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationEvent {
    Started { actor: ActorId, run: RunId },
    Finished { actor: ActorId, run: RunId, batches: u32 },
}
