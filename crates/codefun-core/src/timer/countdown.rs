//! One-second decrementing countdown on top of a [`Scheduler`].

use serde::{Deserialize, Serialize};

use super::scheduler::{Scheduler, TimerHandle, Wake};

pub const TICK_MS: u64 = 1_000;

/// Which countdown an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownKind {
    PerQuestion,
    Total,
}

impl CountdownKind {
    fn wake(self) -> Wake {
        match self {
            CountdownKind::PerQuestion => Wake::QuestionTick,
            CountdownKind::Total => Wake::TotalTick,
        }
    }
}

/// Result of feeding a tick to a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Wake belongs to an older arming or the countdown is stopped.
    Stale,
    Running { remaining_secs: u32 },
    /// Reached zero. The countdown has already disarmed itself.
    Expired,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    kind: CountdownKind,
    remaining_secs: u32,
    handle: Option<TimerHandle>,
}

impl Countdown {
    pub fn new(kind: CountdownKind) -> Self {
        Self {
            kind,
            remaining_secs: 0,
            handle: None,
        }
    }

    pub fn kind(&self) -> CountdownKind {
        self.kind
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    /// Start counting down from `secs`, stopping any previous arming first.
    pub fn arm<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S, secs: u32) {
        self.disarm(scheduler);
        self.remaining_secs = secs;
        self.handle = Some(scheduler.schedule_repeating(self.kind.wake(), TICK_MS));
    }

    pub fn disarm<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.handle.take() {
            scheduler.cancel(handle);
        }
    }

    /// Forget the remaining time without touching the scheduler.
    pub fn clear(&mut self) {
        self.remaining_secs = 0;
    }

    pub fn tick<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S, handle: TimerHandle) -> Tick {
        if self.handle != Some(handle) {
            return Tick::Stale;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.disarm(scheduler);
            Tick::Expired
        } else {
            Tick::Running {
                remaining_secs: self.remaining_secs,
            }
        }
    }
}

/// `MM:SS` for a number of seconds.
pub fn format_mm_ss(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
