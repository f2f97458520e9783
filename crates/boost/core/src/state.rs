use std::fmt;

/// Stable identifier of an actor as assigned by the host.
///
/// The runtime never owns actor identity; it only stores these ids and asks
/// the host whether they are still reachable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// One step of the authoritative simulation clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0.saturating_add(rhs))
    }
}

impl std::ops::AddAssign<u64> for Tick {
    fn add_assign(&mut self, rhs: u64) {
        self.0 = self.0.saturating_add(rhs);
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relative displacement in world space.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Offset {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Offset {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Absolute point in a host world. `y` is the vertical axis.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns this location displaced by `offset` plus an extra vertical lift.
    pub fn offset_by(self, offset: Offset, lift: f64) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y + lift,
            z: self.z + offset.z,
        }
    }
}

/// Dimension kind of the world an actor is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Environment {
    Normal,
    Nether,
    TheEnd,
}

/// World state observed when a trigger fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldSnapshot {
    /// Time of day in ticks, `0..24000`.
    pub time_of_day: u64,
    pub environment: Environment,
}

impl WorldSnapshot {
    pub const fn new(time_of_day: u64, environment: Environment) -> Self {
        Self {
            time_of_day,
            environment,
        }
    }
}

/// An actor left its rest state.
///
/// Delivered by the host from whatever thread raised the event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RestExit {
    pub actor: ActorId,
    /// Whether the actor holds the permission that enables the boost.
    pub has_permission: bool,
    pub world: WorldSnapshot,
}

impl RestExit {
    pub const fn new(actor: ActorId, has_permission: bool, world: WorldSnapshot) -> Self {
        Self {
            actor,
            has_permission,
            world,
        }
    }
}
