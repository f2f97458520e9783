//! Eligibility predicates consulted when a trigger fires.

use crate::state::{Environment, RestExit};

/// Decides whether a rest-exit trigger may earn a boost.
///
/// Implementations must be pure: they are called from arbitrary trigger
/// threads and must not touch the world.
pub trait EligibilityGate: Send + Sync {
    fn is_eligible(&self, trigger: &RestExit) -> bool;
}

impl<F> EligibilityGate for F
where
    F: Fn(&RestExit) -> bool + Send + Sync,
{
    fn is_eligible(&self, trigger: &RestExit) -> bool {
        self(trigger)
    }
}

/// Default gate: permitted actors waking in the normal dimension during the
/// morning window (inclusive bounds).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MorningGate {
    pub start: u64,
    pub end: u64,
}

impl MorningGate {
    pub const MORNING_START: u64 = 0;
    pub const MORNING_END: u64 = 1000;

    pub const fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }
}

impl Default for MorningGate {
    fn default() -> Self {
        Self::new(Self::MORNING_START, Self::MORNING_END)
    }
}

impl EligibilityGate for MorningGate {
    fn is_eligible(&self, trigger: &RestExit) -> bool {
        if !trigger.has_permission || trigger.world.environment != Environment::Normal {
            return false;
        }
        (self.start..=self.end).contains(&trigger.world.time_of_day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ActorId, WorldSnapshot};

    fn trigger(time: u64, environment: Environment, has_permission: bool) -> RestExit {
        RestExit::new(
            ActorId(7),
            has_permission,
            WorldSnapshot::new(time, environment),
        )
    }

    #[test]
    fn morning_window_is_inclusive() {
        let gate = MorningGate::default();
        assert!(gate.is_eligible(&trigger(0, Environment::Normal, true)));
        assert!(gate.is_eligible(&trigger(1000, Environment::Normal, true)));
        assert!(!gate.is_eligible(&trigger(1001, Environment::Normal, true)));
        assert!(!gate.is_eligible(&trigger(18000, Environment::Normal, true)));
    }

    #[test]
    fn other_dimensions_and_missing_permission_are_rejected() {
        let gate = MorningGate::default();
        assert!(!gate.is_eligible(&trigger(500, Environment::Nether, true)));
        assert!(!gate.is_eligible(&trigger(500, Environment::TheEnd, true)));
        assert!(!gate.is_eligible(&trigger(500, Environment::Normal, false)));
    }

    #[test]
    fn closures_act_as_gates() {
        let always = |_: &RestExit| true;
        assert!(always.is_eligible(&trigger(20000, Environment::Nether, false)));
    }
}
