//! Error types shared by loaders, hosts and the runtime.
//!
//! [`ConfigError`] describes a single malformed configuration value. Loaders
//! treat it as recoverable: the offending entry is skipped or replaced by its
//! default and startup continues. [`RenderError`] is returned by host
//! primitives and only ever affects the actor it was raised for.

use thiserror::Error;

use crate::state::ActorId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown effect kind `{0}`")]
    UnknownEffect(String),

    #[error("invalid {field} identifier `{value}`")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("particle count must be positive")]
    ZeroParticleCount,

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: String },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("{0} is no longer reachable")]
    ActorGone(ActorId),

    #[error("host rejected {primitive}: {reason}")]
    Rejected {
        primitive: &'static str,
        reason: String,
    },
}

impl RenderError {
    /// Stale references are an expected race, not a fault.
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::ActorGone(_))
    }
}
