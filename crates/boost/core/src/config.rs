//! Resolved, immutable boost configuration.
//!
//! Values here are already validated. Raw file formats and the policy for
//! skipping malformed entries live in `boost-content`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::ConfigError;
use crate::state::Offset;

/// Effect kinds a host can apply to an actor.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    Speed,
    Slowness,
    Haste,
    MiningFatigue,
    Strength,
    InstantHealth,
    InstantDamage,
    JumpBoost,
    Nausea,
    Regeneration,
    Resistance,
    FireResistance,
    WaterBreathing,
    Invisibility,
    Blindness,
    NightVision,
    Hunger,
    Weakness,
    Poison,
    Wither,
    HealthBoost,
    Absorption,
    Saturation,
    Glowing,
    Levitation,
    Luck,
    Unluck,
    SlowFalling,
    ConduitPower,
    DolphinsGrace,
    BadOmen,
    HeroOfTheVillage,
    Darkness,
}

impl EffectKind {
    /// Resolves a configured key such as `speed` or `JUMP_BOOST`.
    pub fn resolve(key: &str) -> Result<Self, ConfigError> {
        let normalized = key.trim().replace('-', "_");
        Self::from_str(&normalized).map_err(|_| ConfigError::UnknownEffect(key.to_string()))
    }
}

/// Duration and strength of one configured effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectSpec {
    pub duration_ticks: u32,
    pub amplifier: u8,
}

impl EffectSpec {
    pub const DEFAULT_DURATION_TICKS: u32 = 200;
    pub const DEFAULT_AMPLIFIER: u8 = 0;

    pub const fn new(duration_ticks: u32, amplifier: u8) -> Self {
        Self {
            duration_ticks,
            amplifier,
        }
    }
}

impl Default for EffectSpec {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DURATION_TICKS, Self::DEFAULT_AMPLIFIER)
    }
}

fn normalize_identifier(field: &'static str, raw: &str) -> Result<String, ConfigError> {
    let value = raw.trim().to_ascii_uppercase();
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':'));
    if valid {
        Ok(value)
    } else {
        Err(ConfigError::InvalidIdentifier {
            field,
            value: raw.to_string(),
        })
    }
}

/// Host particle identifier, normalized to upper case.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticleKind(String);

impl ParticleKind {
    pub const DEFAULT: &'static str = "VILLAGER_HAPPY";

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        normalize_identifier("particle", raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ParticleKind {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for ParticleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host sound identifier, normalized to upper case.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoundId(String);

impl SoundId {
    pub const DEFAULT: &'static str = "BLOCK_NOTE_BLOCK_CHIME";

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        normalize_identifier("sound", raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SoundId {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Particle kind plus the ring geometry used by the wake-up animation.
///
/// `offset.x` and `offset.z` are the ring radii, `offset.y` the total height
/// of the ramp the samples climb.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticleSpec {
    pub kind: ParticleKind,
    pub count: u32,
    pub offset: Offset,
}

impl ParticleSpec {
    pub const DEFAULT_COUNT: u32 = 3;
    pub const DEFAULT_OFFSET: Offset = Offset::new(0.5, 1.5, 0.5);

    pub fn new(kind: ParticleKind, count: u32, offset: Offset) -> Result<Self, ConfigError> {
        if count == 0 {
            return Err(ConfigError::ZeroParticleCount);
        }
        for (field, value) in [
            ("particle.offset-x", offset.x),
            ("particle.offset-y", offset.y),
            ("particle.offset-z", offset.z),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite {
                    field,
                    value: value.to_string(),
                });
            }
        }
        Ok(Self {
            kind,
            count,
            offset,
        })
    }
}

impl Default for ParticleSpec {
    fn default() -> Self {
        Self {
            kind: ParticleKind::default(),
            count: Self::DEFAULT_COUNT,
            offset: Self::DEFAULT_OFFSET,
        }
    }
}

/// Fade-in, stay and fade-out durations of a title.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TitleTimes {
    pub fade_in: Duration,
    pub stay: Duration,
    pub fade_out: Duration,
}

impl Default for TitleTimes {
    fn default() -> Self {
        Self {
            fade_in: Duration::from_millis(500),
            stay: Duration::from_millis(2000),
            fade_out: Duration::from_millis(500),
        }
    }
}

/// Text shown to a boosted actor. Markup is passed to the host untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Greeting {
    pub message: String,
    pub title: String,
    pub subtitle: String,
    pub times: TitleTimes,
}

impl Default for Greeting {
    fn default() -> Self {
        Self {
            message: "<green>You feel <bold>refreshed</bold> after a good night's sleep!"
                .to_string(),
            title: "<gold>Good Morning!".to_string(),
            subtitle: "<yellow>Rise and shine!".to_string(),
            times: TitleTimes::default(),
        }
    }
}

/// Immutable boost configuration, loaded once at startup.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoostConfig {
    pub effects: BTreeMap<EffectKind, EffectSpec>,
    pub particle: ParticleSpec,
    pub sound: SoundId,
    pub greeting: Greeting,
}

impl BoostConfig {
    /// Cooldown used when no effect is configured.
    pub const FALLBACK_TTL_TICKS: u64 = 200;

    pub fn new(
        effects: BTreeMap<EffectKind, EffectSpec>,
        particle: ParticleSpec,
        sound: SoundId,
    ) -> Self {
        Self {
            effects,
            particle,
            sound,
            greeting: Greeting::default(),
        }
    }

    pub fn with_greeting(mut self, greeting: Greeting) -> Self {
        self.greeting = greeting;
        self
    }

    /// Cooldown length: the longest configured effect duration.
    pub fn cooldown_ttl(&self) -> u64 {
        self.effects
            .values()
            .map(|spec| u64::from(spec.duration_ticks))
            .max()
            .unwrap_or(Self::FALLBACK_TTL_TICKS)
    }
}

impl Default for BoostConfig {
    fn default() -> Self {
        let effects = BTreeMap::from([
            (EffectKind::Speed, EffectSpec::new(600, 1)),
            (EffectKind::Regeneration, EffectSpec::new(200, 0)),
        ]);
        Self::new(effects, ParticleSpec::default(), SoundId::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_is_longest_effect_duration() {
        let effects = BTreeMap::from([
            (EffectKind::Speed, EffectSpec::new(100, 0)),
            (EffectKind::JumpBoost, EffectSpec::new(200, 2)),
        ]);
        let config = BoostConfig::new(effects, ParticleSpec::default(), SoundId::default());
        assert_eq!(config.cooldown_ttl(), 200);
    }

    #[test]
    fn ttl_falls_back_without_effects() {
        let config = BoostConfig::new(
            BTreeMap::new(),
            ParticleSpec::default(),
            SoundId::default(),
        );
        assert_eq!(config.cooldown_ttl(), BoostConfig::FALLBACK_TTL_TICKS);
    }

    #[test]
    fn effect_keys_resolve_case_insensitively() {
        assert_eq!(EffectKind::resolve("speed"), Ok(EffectKind::Speed));
        assert_eq!(EffectKind::resolve("JUMP_BOOST"), Ok(EffectKind::JumpBoost));
        assert_eq!(EffectKind::resolve("night-vision"), Ok(EffectKind::NightVision));
        assert_eq!(
            EffectKind::resolve("flight"),
            Err(ConfigError::UnknownEffect("flight".to_string()))
        );
        assert_eq!(EffectKind::SlowFalling.to_string(), "SLOW_FALLING");
    }

    #[test]
    fn identifiers_are_normalized_and_validated() {
        assert_eq!(
            ParticleKind::parse(" end_rod ").map(|p| p.as_str().to_string()),
            Ok("END_ROD".to_string())
        );
        assert!(SoundId::parse("entity.player.levelup").is_ok());
        assert!(matches!(
            SoundId::parse("not a sound"),
            Err(ConfigError::InvalidIdentifier { field: "sound", .. })
        ));
        assert!(ParticleKind::parse("").is_err());
    }

    #[test]
    fn particle_spec_rejects_zero_count_and_nan() {
        assert_eq!(
            ParticleSpec::new(ParticleKind::default(), 0, Offset::ZERO),
            Err(ConfigError::ZeroParticleCount)
        );
        assert!(
            ParticleSpec::new(
                ParticleKind::default(),
                3,
                Offset::new(f64::NAN, 0.0, 0.0)
            )
            .is_err()
        );
    }
}
