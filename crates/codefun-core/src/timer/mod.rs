mod clock;
mod countdown;
mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use countdown::{format_mm_ss, Countdown, CountdownKind, Tick, TICK_MS};
pub use scheduler::{Scheduler, TimerHandle, TimerQueue, Wake};
