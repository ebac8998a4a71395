//! Monotonic time and the single repeating-tick primitive.
//!
//! The whole system runs off one cooperative scheduler: at most one repeating
//! schedule exists at any moment, owned by whichever stage (or the finalizer)
//! is active. Cancellation is immediate and idempotent, and a stale handle can
//! never observe a tick; this guards against an abandoned stage's timer
//! corrupting its successor's view.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of monotonic timestamps. The epoch is arbitrary; only differences
/// are meaningful.
pub trait Clock {
    fn now(&self) -> Duration;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Wall clock anchored at construction time.
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Hand-driven clock for tests and simulation.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Identifies one repeating schedule. Handles are never reused, so a handle
/// from a finished stage stays inert forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickerHandle(u64);

#[derive(Debug)]
struct Schedule {
    id: u64,
    interval: Duration,
    next_due: Duration,
}

/// Single-slot repeating scheduler, polled by the host loop.
#[derive(Debug, Default)]
pub struct Ticker {
    active: Option<Schedule>,
    next_id: u64,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a repeating tick every `interval`, first due one interval from
    /// `now`. The previous schedule, if any, is cancelled first; the caller
    /// is expected to have done that already.
    pub fn schedule(&mut self, interval: Duration, now: Duration) -> TickerHandle {
        if self.active.is_some() {
            log::warn!("scheduling over an active ticker; cancelling the old schedule");
        }
        self.next_id += 1;
        let id = self.next_id;
        self.active = Some(Schedule {
            id,
            interval,
            next_due: now + interval,
        });
        TickerHandle(id)
    }

    /// Cancel `handle`. Cancelling twice, or cancelling a handle that was
    /// already replaced, is a no-op.
    pub fn cancel(&mut self, handle: TickerHandle) {
        if let Some(schedule) = &self.active {
            if schedule.id == handle.0 {
                self.active = None;
            }
        }
    }

    pub fn is_active(&self, handle: TickerHandle) -> bool {
        matches!(&self.active, Some(s) if s.id == handle.0)
    }

    /// Consume at most one due tick for `handle`. Returns false for stale or
    /// cancelled handles no matter how much time has passed.
    pub fn poll_once(&mut self, handle: TickerHandle, now: Duration) -> bool {
        match &mut self.active {
            Some(s) if s.id == handle.0 && s.next_due <= now => {
                s.next_due += s.interval;
                true
            }
            _ => false,
        }
    }
}
