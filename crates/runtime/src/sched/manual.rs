//! Deterministic executor driven by explicit clock steps.
//!
//! [`ManualScheduler`] implements both [`Authoritative`] and [`TimerPool`] on
//! top of one manually advanced tick clock, so every timing property of the
//! runtime can be exercised synchronously. Timer periods are converted to
//! whole ticks using the configured tick duration.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use boost_core::{Tick, World};

use super::{
    Authoritative, RepeatingJob, TickClock, TickQueue, TimerPool, TimerTask, WorldJob,
    run_isolated, run_repeating_isolated,
};

/// Nominal simulation tick length (20 ticks per second).
const DEFAULT_TICK_DURATION: Duration = Duration::from_millis(50);

struct ManualTimer {
    next_fire: Tick,
    period_ticks: u64,
    task: TimerTask,
}

struct Shared<W> {
    clock: TickClock,
    tick_duration: Duration,
    queue: Mutex<TickQueue>,
    timers: Mutex<Vec<ManualTimer>>,
    world: Mutex<W>,
}

/// Synchronous stand-in for the tick worker and timer pool.
///
/// Each [`step`](Self::step) advances the clock by one tick and then runs, in
/// order: queued immediate jobs, delayed jobs now due, periodic jobs now due,
/// and timers now due, repeating the immediate/timer phases until nothing is
/// left for this tick.
pub struct ManualScheduler<W> {
    shared: Arc<Shared<W>>,
}

impl<W> Clone for ManualScheduler<W> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<W: World> ManualScheduler<W> {
    pub fn new(world: W) -> Self {
        Self::starting_at(world, Tick::ZERO)
    }

    pub fn starting_at(world: W, tick: Tick) -> Self {
        Self::build(world, tick, DEFAULT_TICK_DURATION)
    }

    /// Scheduler whose timer periods are converted at `tick_duration` per
    /// tick. Pair it with the same duration in the service settings.
    pub fn with_tick_duration(world: W, tick_duration: Duration) -> Self {
        Self::build(world, Tick::ZERO, tick_duration)
    }

    fn build(world: W, tick: Tick, tick_duration: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                clock: TickClock::starting_at(tick),
                tick_duration,
                queue: Mutex::new(TickQueue::default()),
                timers: Mutex::new(Vec::new()),
                world: Mutex::new(world),
            }),
        }
    }

    pub fn tick_duration(&self) -> Duration {
        self.shared.tick_duration
    }

    /// Borrows the world between steps, e.g. to flip reachability in a test.
    pub fn with_world<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut lock(&self.shared.world))
    }

    /// Immediate and delayed jobs not yet run.
    pub fn pending_jobs(&self) -> usize {
        lock(&self.shared.queue).pending()
    }

    /// Timers that have not cancelled themselves yet.
    pub fn active_timers(&self) -> usize {
        lock(&self.shared.timers).len()
    }

    /// Runs every queued immediate job, including ones they submit.
    pub fn run_pending(&self) {
        loop {
            let job = lock(&self.shared.queue).pop_immediate();
            let Some(job) = job else { break };
            self.run(job);
        }
    }

    /// Advances one tick and runs everything due on it.
    pub fn step(&self) -> Tick {
        let now = self.shared.clock.advance();
        self.run_pending();

        loop {
            let job = lock(&self.shared.queue).pop_due(now);
            let Some(job) = job else { break };
            self.run(job);
        }

        let mut due = lock(&self.shared.queue).take_due_repeating(now);
        for repeating in &mut due {
            let mut world = lock(&self.shared.world);
            run_repeating_isolated(&mut *world, &mut repeating.job);
        }
        lock(&self.shared.queue).restore_repeating(now, due);

        loop {
            self.run_pending();
            if !self.fire_timers(now) {
                break;
            }
        }
        self.run_pending();
        now
    }

    /// Steps `ticks` times.
    pub fn advance(&self, ticks: u64) -> Tick {
        for _ in 0..ticks {
            self.step();
        }
        self.shared.clock.now()
    }

    /// Steps until the clock reads `target`.
    pub fn advance_to(&self, target: Tick) -> Tick {
        while self.shared.clock.now() < target {
            self.step();
        }
        self.shared.clock.now()
    }

    fn run(&self, job: WorldJob) {
        let mut world = lock(&self.shared.world);
        run_isolated(&mut *world, job);
    }

    /// Fires timers due at `now`; returns whether any fired.
    fn fire_timers(&self, now: Tick) -> bool {
        let mut due = {
            let mut timers = lock(&self.shared.timers);
            let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut *timers)
                .into_iter()
                .partition(|t| t.next_fire <= now);
            *timers = waiting;
            due
        };
        if due.is_empty() {
            return false;
        }

        due.retain_mut(|timer| match (timer.task)() {
            ControlFlow::Continue(()) => {
                timer.next_fire = now + timer.period_ticks;
                true
            }
            ControlFlow::Break(()) => false,
        });
        lock(&self.shared.timers).extend(due);
        true
    }
}

impl<W: World> Authoritative for ManualScheduler<W> {
    fn now(&self) -> Tick {
        self.shared.clock.now()
    }

    fn submit(&self, job: WorldJob) {
        lock(&self.shared.queue).push_now(job);
    }

    fn submit_after(&self, delay_ticks: u64, job: WorldJob) {
        let due = self.shared.clock.now() + delay_ticks;
        lock(&self.shared.queue).push_at(due, job);
    }

    fn submit_repeating(&self, period_ticks: u64, job: RepeatingJob) {
        let first = self.shared.clock.now() + 1;
        lock(&self.shared.queue).push_repeating(first, period_ticks, job);
    }
}

impl<W: World> TimerPool for ManualScheduler<W> {
    fn schedule_repeating(&self, period: Duration, task: TimerTask) {
        let tick_nanos = self.shared.tick_duration.as_nanos().max(1);
        let period_ticks = period.as_nanos().div_ceil(tick_nanos).max(1);
        lock(&self.shared.timers).push(ManualTimer {
            next_fire: self.shared.clock.now(),
            period_ticks: u64::try_from(period_ticks).unwrap_or(u64::MAX),
            task,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use boost_core::{
        ActorId, EffectKind, EffectOptions, EffectSpec, Greeting, Location, ParticleKind,
        RenderError, SoundId,
    };

    use super::*;

    struct NullWorld;

    impl World for NullWorld {
        fn is_reachable(&self, _actor: ActorId) -> bool {
            true
        }

        fn location(&self, _actor: ActorId) -> Option<Location> {
            None
        }

        fn apply_effect(
            &mut self,
            _actor: ActorId,
            _kind: EffectKind,
            _spec: EffectSpec,
            _options: EffectOptions,
        ) -> Result<(), RenderError> {
            Ok(())
        }

        fn send_message(&mut self, _actor: ActorId, _text: &str) -> Result<(), RenderError> {
            Ok(())
        }

        fn show_title(&mut self, _actor: ActorId, _greeting: &Greeting) -> Result<(), RenderError> {
            Ok(())
        }

        fn play_sound(
            &mut self,
            _actor: ActorId,
            _sound: &SoundId,
            _at: Location,
            _volume: f32,
            _pitch: f32,
        ) -> Result<(), RenderError> {
            Ok(())
        }

        fn emit_particle(&mut self, _at: Location, _particle: &ParticleKind) -> Result<(), RenderError> {
            Ok(())
        }
    }

    fn counter() -> Arc<AtomicU32> {
        Arc::new(AtomicU32::new(0))
    }

    #[test]
    fn delayed_job_runs_on_its_tick() {
        let sched = ManualScheduler::new(NullWorld);
        let ran = counter();
        let seen = Arc::clone(&ran);
        sched.submit_after(3, Box::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        sched.advance(2);
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        sched.step();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert_eq!(sched.pending_jobs(), 0);
    }

    #[test]
    fn repeating_job_keeps_its_period() {
        let sched = ManualScheduler::new(NullWorld);
        let ran = counter();
        let seen = Arc::clone(&ran);
        sched.submit_repeating(2, Box::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        // Ticks 1, 3, 5.
        sched.advance(5);
        assert_eq!(ran.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn timer_fires_now_then_every_period_until_break() {
        let sched = ManualScheduler::new(NullWorld);
        let fired = counter();
        let seen = Arc::clone(&fired);
        // 200ms at 50ms per tick is four ticks.
        sched.schedule_repeating(
            Duration::from_millis(200),
            Box::new(move || {
                if seen.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            }),
        );

        sched.step();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        sched.advance_to(Tick(4));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        sched.advance_to(Tick(5));
        assert_eq!(fired.load(Ordering::SeqCst), 2);
        sched.advance_to(Tick(20));
        assert_eq!(fired.load(Ordering::SeqCst), 3);
        assert_eq!(sched.active_timers(), 0);
    }

    #[test]
    fn timer_period_follows_configured_tick_duration() {
        let sched = ManualScheduler::with_tick_duration(NullWorld, Duration::from_millis(100));
        assert_eq!(sched.tick_duration(), Duration::from_millis(100));
        let fired = counter();
        let seen = Arc::clone(&fired);
        // 200ms at 100ms per tick is two ticks.
        sched.schedule_repeating(
            Duration::from_millis(200),
            Box::new(move || {
                seen.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Continue(())
            }),
        );

        sched.advance_to(Tick(4));
        // Fires on ticks 1 and 3, then 5.
        assert_eq!(fired.load(Ordering::SeqCst), 2);
        sched.step();
        assert_eq!(fired.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn panicking_job_does_not_stop_the_tick() {
        let sched = ManualScheduler::new(NullWorld);
        let ran = counter();
        let seen = Arc::clone(&ran);
        sched.submit(Box::new(|_| panic!("boom")));
        sched.submit(Box::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        sched.step();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }
}
