//! Cancellable one-shot and repeating wakes.
//!
//! The scheduler never calls back into the session. It only records
//! deadlines; the driver asks for due wakes with [`Scheduler::poll_due`]
//! and hands each one to the session. Polling one wake at a time means a
//! wake that cancels another (completion stopping the timers) takes effect
//! before the cancelled wake could be returned.

use serde::{Deserialize, Serialize};

use super::clock::Clock;

/// What a wake is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wake {
    /// One-second tick of the per-question countdown.
    QuestionTick,
    /// One-second tick of the session countdown.
    TotalTick,
    /// End of the reveal pause; move to the next question.
    Advance,
}

/// Identifies one scheduled wake. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(u64);

pub trait Scheduler {
    /// Fire `wake` once after `delay_ms`.
    fn schedule_once(&mut self, wake: Wake, delay_ms: u64) -> TimerHandle;

    /// Fire `wake` every `period_ms`, first after one period.
    fn schedule_repeating(&mut self, wake: Wake, period_ms: u64) -> TimerHandle;

    /// Stop a wake. Returns false if it already fired (one-shot) or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    fn is_active(&self, handle: TimerHandle) -> bool;

    /// Number of wakes still pending.
    fn active_count(&self) -> usize;

    /// Milliseconds until the earliest pending wake, zero if one is overdue.
    fn until_next_ms(&self) -> Option<u64>;

    /// Pop the earliest wake whose deadline has passed.
    fn poll_due(&mut self) -> Option<(TimerHandle, Wake)>;
}

#[derive(Debug, Clone)]
struct Entry {
    handle: TimerHandle,
    wake: Wake,
    deadline_ms: u64,
    period_ms: Option<u64>,
}

/// Deadline list driven by a [`Clock`].
#[derive(Debug, Clone)]
pub struct TimerQueue<C: Clock> {
    clock: C,
    entries: Vec<Entry>,
    next_id: u64,
}

impl<C: Clock> TimerQueue<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            entries: Vec::new(),
            next_id: 1,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn push(&mut self, wake: Wake, delay_ms: u64, period_ms: Option<u64>) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            handle,
            wake,
            deadline_ms: self.clock.now_ms().saturating_add(delay_ms),
            period_ms,
        });
        handle
    }
}

impl<C: Clock> Scheduler for TimerQueue<C> {
    fn schedule_once(&mut self, wake: Wake, delay_ms: u64) -> TimerHandle {
        self.push(wake, delay_ms, None)
    }

    fn schedule_repeating(&mut self, wake: Wake, period_ms: u64) -> TimerHandle {
        // A zero period would fire forever within a single poll loop.
        let period_ms = period_ms.max(1);
        self.push(wake, period_ms, Some(period_ms))
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    fn is_active(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    fn active_count(&self) -> usize {
        self.entries.len()
    }

    fn until_next_ms(&self) -> Option<u64> {
        let now = self.clock.now_ms();
        self.entries
            .iter()
            .map(|e| e.deadline_ms.saturating_sub(now))
            .min()
    }

    fn poll_due(&mut self) -> Option<(TimerHandle, Wake)> {
        let now = self.clock.now_ms();
        let pos = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline_ms <= now)
            .min_by_key(|(_, e)| (e.deadline_ms, e.handle))
            .map(|(i, _)| i)?;

        let entry = &mut self.entries[pos];
        let fired = (entry.handle, entry.wake);
        match entry.period_ms {
            Some(period) => entry.deadline_ms = entry.deadline_ms.saturating_add(period),
            None => {
                self.entries.remove(pos);
            }
        }
        Some(fired)
    }
}
