//! Smoke tests for the tokio-backed runtime.

mod common;

use std::sync::Arc;
use std::time::Duration;

use boost_content::{ConfigLoader, DEFAULT_CONFIG};
use boost_core::{ActorId, AnimationPlan, Location, ParticleSpec};
use common::{TestWorld, collect, morning};
use runtime::{
    AnimationEvent, AnimationSequencer, ApplyEvent, Event, EventBus, ManualScheduler, Runtime,
    RuntimeConfig, RuntimeError, TokioTimers, Topic, TriggerOutcome,
};
use tokio::time::timeout;

fn fast_config() -> RuntimeConfig {
    RuntimeConfig {
        tick_duration: Duration::from_millis(2),
        ..RuntimeConfig::default()
    }
}

async fn next_matching(
    rx: &mut tokio::sync::broadcast::Receiver<Event>,
    pred: impl Fn(&Event) -> bool,
) -> Event {
    timeout(Duration::from_secs(5), async {
        loop {
            let event = rx.recv().await.expect("event bus should stay open");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("event should arrive in time")
}

#[tokio::test]
async fn test_runtime_boosts_and_animates() {
    let boost = ConfigLoader::from_str(DEFAULT_CONFIG).expect("bundled config should parse");
    let runtime = Runtime::builder()
        .config(fast_config())
        .boost(boost)
        .world(TestWorld::with_actors(&[7]))
        .build()
        .await
        .expect("runtime should build");

    let handle = runtime.handle();
    let mut apply_rx = handle.subscribe(Topic::Apply);
    let mut anim_rx = handle.subscribe(Topic::Animation);

    assert_eq!(handle.on_rest_exit(&morning(7)), TriggerOutcome::Queued);

    let applied = next_matching(&mut apply_rx, |e| {
        matches!(e, Event::Apply(ApplyEvent::Applied { .. }))
    })
    .await;
    assert_eq!(
        applied,
        Event::Apply(ApplyEvent::Applied {
            actor: ActorId(7),
            effects: 2,
        })
    );
    assert!(handle.is_on_cooldown(ActorId(7)));
    assert_eq!(handle.on_rest_exit(&morning(7)), TriggerOutcome::OnCooldown);

    let finished = next_matching(&mut anim_rx, |e| {
        matches!(e, Event::Animation(AnimationEvent::Finished { .. }))
    })
    .await;
    assert!(matches!(
        finished,
        Event::Animation(AnimationEvent::Finished { batches: 5, .. })
    ));

    let reachable = handle
        .query(|world| world.is_reachable(ActorId(7)))
        .await
        .expect("worker should answer");
    assert!(reachable);
    assert!(handle.now().0 > 0);

    runtime.shutdown().await.expect("shutdown should succeed");

    let err = handle
        .query(|world| world.is_reachable(ActorId(7)))
        .await
        .expect_err("worker is gone");
    assert!(matches!(err, RuntimeError::CommandChannelClosed));
}

#[tokio::test]
async fn test_builder_requires_a_world() {
    let result = Runtime::builder().build().await;
    assert!(matches!(result, Err(RuntimeError::MissingWorld)));
}

fn sequencer_on(timers: &TokioTimers, events: &EventBus) -> AnimationSequencer {
    let sched = ManualScheduler::new(TestWorld::with_actors(&[1]));
    AnimationSequencer::new(
        &ParticleSpec::default(),
        AnimationPlan::default(),
        Duration::from_millis(5),
        Arc::new(sched),
        Arc::new(timers.clone()),
        events.clone(),
    )
}

#[tokio::test]
async fn test_run_refused_by_stopped_timers_still_finishes() {
    let timers = TokioTimers::current();
    let events = EventBus::new();
    let mut anim_rx = events.subscribe(Topic::Animation);
    let sequencer = sequencer_on(&timers, &events);

    timers.shutdown();
    let run = sequencer.start(ActorId(1), Location::new(0.0, 64.0, 0.0));

    assert_eq!(sequencer.active_runs(), 0);
    assert_eq!(timers.active(), 0);
    assert_eq!(
        collect(&mut anim_rx),
        vec![
            Event::Animation(AnimationEvent::Started {
                actor: ActorId(1),
                run
            }),
            Event::Animation(AnimationEvent::Finished {
                actor: ActorId(1),
                run,
                batches: 0
            }),
        ]
    );
}

#[tokio::test]
async fn test_shutdown_mid_run_releases_the_run() {
    let timers = TokioTimers::current();
    let events = EventBus::new();
    let mut anim_rx = events.subscribe(Topic::Animation);
    let sequencer = sequencer_on(&timers, &events);

    sequencer.start(ActorId(1), Location::new(0.0, 64.0, 0.0));
    assert_eq!(sequencer.active_runs(), 1);
    assert_eq!(timers.active(), 1);

    timers.shutdown();
    let finished = next_matching(&mut anim_rx, |e| {
        matches!(e, Event::Animation(AnimationEvent::Finished { .. }))
    })
    .await;
    assert!(matches!(
        finished,
        Event::Animation(AnimationEvent::Finished { batches, .. }) if batches < 5
    ));
    assert_eq!(sequencer.active_runs(), 0);

    timeout(Duration::from_secs(1), async {
        while timers.active() > 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("timer task should exit after shutdown");
}
