//! Boost configuration loader.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use boost_core::{
    BoostConfig, ConfigError, EffectKind, EffectSpec, Greeting, Offset, ParticleKind,
    ParticleSpec, SoundId, TitleTimes,
};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};

/// Configuration written by [`ConfigLoader::load_or_init`] when none exists.
pub const DEFAULT_CONFIG: &str = include_str!("../../data/boost.toml");

/// Raw file layout. Every field is optional; gaps take defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BoostConfigSpec {
    /// Kept untyped so one malformed effect does not reject the whole file.
    pub effects: BTreeMap<String, toml::Value>,
    pub particle: ParticleEntry,
    pub sound: Option<String>,
    pub greeting: GreetingEntry,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EffectEntry {
    pub duration_ticks: Option<i64>,
    pub amplifier: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ParticleEntry {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub count: Option<i64>,
    pub offset_x: Option<f64>,
    pub offset_y: Option<f64>,
    pub offset_z: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct GreetingEntry {
    pub message: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub fade_in_ms: Option<u64>,
    pub stay_ms: Option<u64>,
    pub fade_out_ms: Option<u64>,
}

impl BoostConfigSpec {
    /// Resolves raw entries into a [`BoostConfig`].
    ///
    /// Returns the configuration together with every problem encountered.
    /// Unknown or malformed effects are dropped; a bad particle or sound
    /// setting falls back to its default.
    pub fn resolve(self) -> (BoostConfig, Vec<ConfigError>) {
        let mut issues = Vec::new();

        let mut effects = BTreeMap::new();
        for (key, value) in self.effects {
            match resolve_effect(&key, value) {
                Ok((kind, spec)) => {
                    effects.insert(kind, spec);
                }
                Err(error) => issues.push(error),
            }
        }

        let particle = resolve_particle(self.particle, &mut issues);

        let sound = match self.sound.as_deref().map(SoundId::parse) {
            Some(Ok(sound)) => sound,
            Some(Err(error)) => {
                issues.push(error);
                SoundId::default()
            }
            None => SoundId::default(),
        };

        let greeting = resolve_greeting(self.greeting);

        let config = BoostConfig::new(effects, particle, sound).with_greeting(greeting);
        (config, issues)
    }
}

fn resolve_effect(key: &str, value: toml::Value) -> Result<(EffectKind, EffectSpec), ConfigError> {
    let kind = EffectKind::resolve(key)?;
    let entry: EffectEntry = value
        .try_into()
        .map_err(|_| ConfigError::InvalidIdentifier {
            field: "effects",
            value: key.to_string(),
        })?;

    let duration = entry
        .duration_ticks
        .unwrap_or(i64::from(EffectSpec::DEFAULT_DURATION_TICKS));
    let duration_ticks = u32::try_from(duration).map_err(|_| ConfigError::OutOfRange {
        field: "duration-ticks",
        value: duration,
    })?;

    let amplifier = entry
        .amplifier
        .unwrap_or(i64::from(EffectSpec::DEFAULT_AMPLIFIER));
    let amplifier = u8::try_from(amplifier).map_err(|_| ConfigError::OutOfRange {
        field: "amplifier",
        value: amplifier,
    })?;

    Ok((kind, EffectSpec::new(duration_ticks, amplifier)))
}

fn resolve_particle(entry: ParticleEntry, issues: &mut Vec<ConfigError>) -> ParticleSpec {
    let kind = match entry.kind.as_deref().map(ParticleKind::parse) {
        Some(Ok(kind)) => kind,
        Some(Err(error)) => {
            issues.push(error);
            ParticleKind::default()
        }
        None => ParticleKind::default(),
    };

    let count = match entry.count {
        None => ParticleSpec::DEFAULT_COUNT,
        Some(0) => {
            issues.push(ConfigError::ZeroParticleCount);
            ParticleSpec::DEFAULT_COUNT
        }
        Some(raw) => u32::try_from(raw).unwrap_or_else(|_| {
            issues.push(ConfigError::OutOfRange {
                field: "particle.count",
                value: raw,
            });
            ParticleSpec::DEFAULT_COUNT
        }),
    };

    let defaults = ParticleSpec::DEFAULT_OFFSET;
    let offset = Offset::new(
        entry.offset_x.unwrap_or(defaults.x),
        entry.offset_y.unwrap_or(defaults.y),
        entry.offset_z.unwrap_or(defaults.z),
    );

    match ParticleSpec::new(kind.clone(), count, offset) {
        Ok(spec) => spec,
        Err(error) => {
            issues.push(error);
            ParticleSpec::new(kind, count, defaults).unwrap_or_default()
        }
    }
}

fn resolve_greeting(entry: GreetingEntry) -> Greeting {
    let defaults = Greeting::default();
    let ms = |value: Option<u64>, fallback: Duration| {
        value.map(Duration::from_millis).unwrap_or(fallback)
    };
    Greeting {
        message: entry.message.unwrap_or(defaults.message),
        title: entry.title.unwrap_or(defaults.title),
        subtitle: entry.subtitle.unwrap_or(defaults.subtitle),
        times: TitleTimes {
            fade_in: ms(entry.fade_in_ms, defaults.times.fade_in),
            stay: ms(entry.stay_ms, defaults.times.stay),
            fade_out: ms(entry.fade_out_ms, defaults.times.fade_out),
        },
    }
}

/// Loader for boost configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Parses TOML text and resolves it, logging every skipped entry.
    pub fn from_str(content: &str) -> LoadResult<BoostConfig> {
        let spec: BoostConfigSpec = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse boost config TOML: {}", e))?;

        let (config, issues) = spec.resolve();
        for issue in &issues {
            tracing::warn!(target: "content::config", %issue, "Skipping malformed config entry");
        }

        tracing::debug!(
            target: "content::config",
            effects = config.effects.len(),
            cooldown_ttl = config.cooldown_ttl(),
            particle = %config.particle.kind,
            sound = %config.sound,
            "Boost config resolved"
        );

        Ok(config)
    }

    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<BoostConfig> {
        let content = read_file(path)?;
        Self::from_str(&content)
    }

    /// Loads `path`, first writing [`DEFAULT_CONFIG`] there if it is missing.
    pub fn load_or_init(path: &Path) -> LoadResult<BoostConfig> {
        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    anyhow::anyhow!("Failed to create directory {}: {}", parent.display(), e)
                })?;
            }
            std::fs::write(path, DEFAULT_CONFIG)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
            tracing::info!(
                target: "content::config",
                path = %path.display(),
                "Wrote default boost config"
            );
        }
        Self::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_matches_built_in_defaults() {
        let config = ConfigLoader::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, BoostConfig::default());
        assert_eq!(config.cooldown_ttl(), 600);
    }

    #[test]
    fn ttl_tracks_longest_configured_effect() {
        let config = ConfigLoader::from_str(
            r#"
            [effects.speed]
            duration-ticks = 100
            [effects.haste]
            duration-ticks = 200
            amplifier = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.effects.len(), 2);
        assert_eq!(config.cooldown_ttl(), 200);
        assert_eq!(config.effects[&EffectKind::Haste], EffectSpec::new(200, 1));
    }

    #[test]
    fn empty_file_uses_defaults_and_fallback_ttl() {
        let config = ConfigLoader::from_str("").unwrap();
        assert!(config.effects.is_empty());
        assert_eq!(config.cooldown_ttl(), BoostConfig::FALLBACK_TTL_TICKS);
        assert_eq!(config.particle, ParticleSpec::default());
        assert_eq!(config.sound, SoundId::default());
    }

    #[test]
    fn malformed_entries_are_skipped_not_fatal() {
        let spec: BoostConfigSpec = toml::from_str(
            r#"
            sound = "two words"

            [effects.speed]
            duration-ticks = 300
            [effects.flight]
            duration-ticks = 999
            [effects.strength]
            duration-ticks = -5
            [effects.luck]
            amplifier = 1000
            [effects.haste]
            duration-ticks = "long"

            [particle]
            type = "END_ROD"
            count = 0
            "#,
        )
        .unwrap();
        let (config, issues) = spec.resolve();

        assert_eq!(config.effects.len(), 1);
        assert_eq!(config.effects[&EffectKind::Speed], EffectSpec::new(300, 0));
        assert_eq!(config.cooldown_ttl(), 300);
        assert_eq!(config.sound, SoundId::default());
        assert_eq!(config.particle.kind.as_str(), "END_ROD");
        assert_eq!(config.particle.count, ParticleSpec::DEFAULT_COUNT);

        assert!(issues.contains(&ConfigError::UnknownEffect("flight".to_string())));
        assert!(issues.contains(&ConfigError::OutOfRange {
            field: "duration-ticks",
            value: -5
        }));
        assert!(issues.contains(&ConfigError::OutOfRange {
            field: "amplifier",
            value: 1000
        }));
        assert!(issues.contains(&ConfigError::ZeroParticleCount));
        assert_eq!(issues.len(), 6);
    }

    #[test]
    fn greeting_overrides_are_partial() {
        let config = ConfigLoader::from_str(
            r#"
            [greeting]
            title = "Morning"
            stay-ms = 1000
            "#,
        )
        .unwrap();
        assert_eq!(config.greeting.title, "Morning");
        assert_eq!(config.greeting.subtitle, Greeting::default().subtitle);
        assert_eq!(config.greeting.times.stay, Duration::from_millis(1000));
        assert_eq!(config.greeting.times.fade_in, Duration::from_millis(500));
    }

    #[test]
    fn syntax_errors_are_reported() {
        assert!(ConfigLoader::from_str("[effects.speed").is_err());
    }

    #[test]
    fn load_or_init_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("boost.toml");

        let config = ConfigLoader::load_or_init(&path).unwrap();
        assert_eq!(config, BoostConfig::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);

        std::fs::write(&path, "[effects.speed]\nduration-ticks = 40\n").unwrap();
        let reloaded = ConfigLoader::load_or_init(&path).unwrap();
        assert_eq!(reloaded.cooldown_ttl(), 40);
    }

    #[test]
    fn missing_file_is_an_error_for_plain_load() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ConfigLoader::load(&dir.path().join("absent.toml")).is_err());
    }
}
