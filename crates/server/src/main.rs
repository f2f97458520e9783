//! Headless wake-boost server.
//!
//! Boots the runtime against an in-memory world, replays a burst of
//! rest-exit triggers from several tasks and reports what the pipeline did.
mod config;
mod dirs;
mod world;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use boost_content::ConfigLoader;
use boost_core::{ActorId, BoostConfig, Environment, Location, RestExit, WorldSnapshot};
use runtime::{Event, Runtime, RuntimeHandle, Topic};
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::ServerConfig;
use world::{HeadlessWorld, RenderStats};

const DEMO_ACTORS: u64 = 8;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ServerConfig::from_env();
    setup_logging(config.log_dir.as_deref())?;

    let boost = load_boost_config(&config.boost_path);
    let stats = Arc::new(RenderStats::default());
    let world = (1..=DEMO_ACTORS).fold(HeadlessWorld::new(Arc::clone(&stats)), |world, id| {
        world.with_actor(ActorId(id), Location::new(id as f64 * 8.0, 64.0, -(id as f64)))
    });

    let runtime = Runtime::builder()
        .config(config.runtime.clone())
        .boost(boost)
        .world(world)
        .build()
        .await?;
    let handle = runtime.handle();

    let reporter = tokio::spawn(report_events(handle.clone()));
    run_demo(&handle).await;

    tokio::select! {
        _ = tokio::time::sleep(config.demo_duration) => {}
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    info!(
        tick = %handle.now(),
        on_cooldown = handle.cooldown_len(),
        animations = handle.active_animations(),
        "Demo finished: {}",
        stats.summary()
    );

    runtime.shutdown().await?;
    reporter.abort();
    Ok(())
}

/// Loads the boost file, writing the bundled default when it is missing.
///
/// An unreadable or unparseable file is logged and replaced by defaults so
/// the server still starts.
fn load_boost_config(path: &Path) -> BoostConfig {
    match ConfigLoader::load_or_init(path) {
        Ok(config) => config,
        Err(error) => {
            warn!(path = %path.display(), "Using default boost config: {error:#}");
            BoostConfig::default()
        }
    }
}

/// Fires triggers from concurrent tasks, the way host event threads would.
async fn run_demo(handle: &RuntimeHandle) {
    let mut tasks = JoinSet::new();
    for id in 1..=DEMO_ACTORS {
        let handle = handle.clone();
        tasks.spawn(async move {
            // Odd actors wake at dawn; even ones sleep through to midday.
            let time_of_day = if id % 2 == 1 { 200 } else { 6000 };
            let trigger = RestExit::new(
                ActorId(id),
                true,
                WorldSnapshot::new(time_of_day, Environment::Normal),
            );
            // A second exit in the same window must not boost twice.
            (handle.on_rest_exit(&trigger), handle.on_rest_exit(&trigger))
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcomes) => info!(?outcomes, "Rest exits offered"),
            Err(error) => warn!(%error, "Trigger task failed"),
        }
    }
}

async fn report_events(handle: RuntimeHandle) {
    let mut receivers = handle.subscribe_multiple(&Topic::ALL);
    let (Some(mut cooldown), Some(mut apply), Some(mut animation)) = (
        receivers.remove(&Topic::Cooldown),
        receivers.remove(&Topic::Apply),
        receivers.remove(&Topic::Animation),
    ) else {
        return;
    };

    loop {
        let event = tokio::select! {
            Ok(event) = cooldown.recv() => event,
            Ok(event) = apply.recv() => event,
            Ok(event) = animation.recv() => event,
            else => break,
        };
        match event {
            Event::Apply(event) => info!(target: "runtime::apply", ?event),
            Event::Cooldown(event) => info!(target: "runtime::cooldown", ?event),
            Event::Animation(event) => info!(target: "runtime::animation", ?event),
            Event::Intake(_) => {}
        }
    }
}

/// Setup logging to both stderr and file
fn setup_logging(log_dir: Option<&Path>) -> Result<()> {
    let log_dir = log_dir.map_or_else(dirs::log_dir, Path::to_path_buf);
    std::fs::create_dir_all(&log_dir)?;

    // Setup file appender
    let file_appender = tracing_appender::rolling::never(&log_dir, "boost-server.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    // Create env filter
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    // Leak the guard to keep file writer alive
    std::mem::forget(guard);

    info!("Log file: {}/boost-server.log", log_dir.display());
    Ok(())
}
