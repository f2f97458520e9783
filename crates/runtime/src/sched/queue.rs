//! Pending authoritative work, ordered by due tick.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use boost_core::Tick;

use super::{RepeatingJob, WorldJob};

struct Delayed {
    due: Tick,
    seq: u64,
    job: WorldJob,
}

impl PartialEq for Delayed {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Delayed {}

impl PartialOrd for Delayed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Delayed {
    // Reversed so the max-heap pops the earliest (due, seq) first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due, other.seq).cmp(&(self.due, self.seq))
    }
}

pub(crate) struct Repeating {
    pub next_due: Tick,
    pub period: u64,
    pub job: RepeatingJob,
}

/// Immediate, delayed and periodic jobs waiting for the authoritative thread.
#[derive(Default)]
pub(crate) struct TickQueue {
    seq: u64,
    immediate: VecDeque<WorldJob>,
    delayed: BinaryHeap<Delayed>,
    repeating: Vec<Repeating>,
}

impl TickQueue {
    pub fn push_now(&mut self, job: WorldJob) {
        self.immediate.push_back(job);
    }

    pub fn push_at(&mut self, due: Tick, job: WorldJob) {
        self.seq += 1;
        self.delayed.push(Delayed {
            due,
            seq: self.seq,
            job,
        });
    }

    pub fn push_repeating(&mut self, first_due: Tick, period: u64, job: RepeatingJob) {
        self.repeating.push(Repeating {
            next_due: first_due,
            period: period.max(1),
            job,
        });
    }

    pub fn pop_immediate(&mut self) -> Option<WorldJob> {
        self.immediate.pop_front()
    }

    /// Pops the earliest delayed job due at or before `now`.
    pub fn pop_due(&mut self, now: Tick) -> Option<WorldJob> {
        if self.delayed.peek().is_some_and(|d| d.due <= now) {
            self.delayed.pop().map(|d| d.job)
        } else {
            None
        }
    }

    /// Removes the periodic jobs due at `now` so they can run without a lock.
    pub fn take_due_repeating(&mut self, now: Tick) -> Vec<Repeating> {
        let (due, waiting) = std::mem::take(&mut self.repeating)
            .into_iter()
            .partition(|r| r.next_due <= now);
        self.repeating = waiting;
        due
    }

    /// Re-arms periodic jobs after they ran on `now`.
    pub fn restore_repeating(&mut self, now: Tick, ran: Vec<Repeating>) {
        for mut repeating in ran {
            repeating.next_due = now + repeating.period;
            self.repeating.push(repeating);
        }
    }

    pub fn pending(&self) -> usize {
        self.immediate.len() + self.delayed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> WorldJob {
        Box::new(|_| {})
    }

    #[test]
    fn delayed_jobs_wait_for_their_tick() {
        let mut queue = TickQueue::default();
        queue.push_at(Tick(5), noop());
        queue.push_at(Tick(3), noop());
        queue.push_at(Tick(5), noop());

        assert!(queue.pop_due(Tick(2)).is_none());
        assert!(queue.pop_due(Tick(3)).is_some());
        assert!(queue.pop_due(Tick(4)).is_none());
        let due: Vec<WorldJob> = std::iter::from_fn(|| queue.pop_due(Tick(5))).collect();
        assert_eq!(due.len(), 2);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn repeating_jobs_rearm_by_period() {
        let mut queue = TickQueue::default();
        queue.push_repeating(Tick(1), 2, Box::new(|_| {}));

        assert!(queue.take_due_repeating(Tick(0)).is_empty());
        let ran = queue.take_due_repeating(Tick(1));
        assert_eq!(ran.len(), 1);
        queue.restore_repeating(Tick(1), ran);

        assert!(queue.take_due_repeating(Tick(2)).is_empty());
        assert_eq!(queue.take_due_repeating(Tick(3)).len(), 1);
    }
}
