//! Server configuration loaded from the process environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use runtime::RuntimeConfig;

/// Everything the headless server needs before it can build a runtime.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub runtime: RuntimeConfig,
    pub boost_path: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub demo_duration: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            boost_path: PathBuf::from("boost.toml"),
            log_dir: None,
            demo_duration: Duration::from_secs(5),
        }
    }
}

impl ServerConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BOOST_CONFIG` - Path of the boost TOML file (default: `boost.toml`)
    /// - `BOOST_LOG_DIR` - Log file directory (default: platform cache dir)
    /// - `BOOST_DEMO_SECONDS` - How long the demo runs (default: 5)
    /// - plus every variable read by [`RuntimeConfig::from_env`]
    pub fn from_env() -> Self {
        let mut config = Self {
            runtime: RuntimeConfig::from_env(),
            ..Self::default()
        };

        if let Ok(path) = env::var("BOOST_CONFIG") {
            config.boost_path = PathBuf::from(path);
        }
        config.log_dir = env::var("BOOST_LOG_DIR").ok().map(PathBuf::from);
        if let Some(seconds) = read_env::<u64>("BOOST_DEMO_SECONDS") {
            config.demo_duration = Duration::from_secs(seconds);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
