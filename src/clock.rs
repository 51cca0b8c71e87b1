//! Presentation-cadence tick sources.
//!
//! A clock knows nothing about content frame rate. It only says "now" and
//! hands out one tick per paint opportunity while armed. Each tick is
//! stamped with the generation that was armed when it was produced, so a
//! tick that outlives a `stop()` can be recognised and dropped.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockGeneration(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: ClockGeneration,
    /// Monotonic time of the paint opportunity, from the clock's epoch.
    pub at: Duration,
}

pub trait Clock {
    fn now(&self) -> Duration;

    /// Arms the tick chain. Calling it while armed keeps the current chain
    /// and returns its generation.
    fn start(&mut self) -> ClockGeneration;

    /// Disarms the chain and drops any pending tick. No-op when stopped.
    fn stop(&mut self);

    fn generation(&self) -> Option<ClockGeneration>;

    /// Takes the tick for the current paint opportunity, if one is due.
    fn poll_tick(&mut self) -> Option<Tick>;

    /// How long the host may wait before the next tick is due.
    fn until_next_tick(&self) -> Option<Duration>;

    fn is_running(&self) -> bool {
        self.generation().is_some()
    }

    fn is_current(&self, tick: &Tick) -> bool {
        self.generation() == Some(tick.generation)
    }
}

#[derive(Debug, Default)]
struct GenerationCounter {
    next: u64,
    armed: Option<ClockGeneration>,
}

impl GenerationCounter {
    fn arm(&mut self) -> ClockGeneration {
        if let Some(generation) = self.armed {
            return generation;
        }
        self.next += 1;
        let generation = ClockGeneration(self.next);
        self.armed = Some(generation);
        generation
    }

    fn disarm(&mut self) -> bool {
        self.armed.take().is_some()
    }
}

/// Manually driven clock for deterministic tests and headless hosts.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Duration,
    generations: GenerationCounter,
    pending: Option<Tick>,
    starts: u32,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward and, while armed, makes one tick pending at the
    /// new time. An unconsumed pending tick is replaced, never queued.
    pub fn advance_to(&mut self, at: Duration) {
        self.now = self.now.max(at);
        self.pending = self.generations.armed.map(|generation| Tick {
            generation,
            at: self.now,
        });
    }

    /// `advance_to` followed by taking the pending tick.
    pub fn fire(&mut self, at: Duration) -> Option<Tick> {
        self.advance_to(at);
        self.pending.take()
    }

    /// Number of times a fresh tick chain was armed.
    pub fn start_count(&self) -> u32 {
        self.starts
    }

    pub fn has_pending_tick(&self) -> bool {
        self.pending.is_some()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn start(&mut self) -> ClockGeneration {
        if self.generations.armed.is_none() {
            self.starts += 1;
        }
        self.generations.arm()
    }

    fn stop(&mut self) {
        self.generations.disarm();
        self.pending = None;
    }

    fn generation(&self) -> Option<ClockGeneration> {
        self.generations.armed
    }

    fn poll_tick(&mut self) -> Option<Tick> {
        self.pending.take()
    }

    fn until_next_tick(&self) -> Option<Duration> {
        match (self.generations.armed, self.pending) {
            (Some(_), Some(_)) => Some(Duration::ZERO),
            _ => None,
        }
    }
}

pub const DEFAULT_REFRESH_HZ: u32 = 60;

/// Wall-clock tick source that offers a paint opportunity every
/// `1 / refresh_hz` seconds.
#[derive(Debug)]
pub struct RefreshClock {
    epoch: Instant,
    period: Duration,
    generations: GenerationCounter,
    next_due: Duration,
}

impl RefreshClock {
    pub fn new(refresh_hz: u32) -> Self {
        Self::with_epoch(Instant::now(), refresh_hz)
    }

    pub fn with_epoch(epoch: Instant, refresh_hz: u32) -> Self {
        Self {
            epoch,
            period: Duration::from_secs_f64(1.0 / f64::from(refresh_hz.max(1))),
            generations: GenerationCounter::default(),
            next_due: Duration::ZERO,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Clock for RefreshClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn start(&mut self) -> ClockGeneration {
        if self.generations.armed.is_none() {
            self.next_due = self.now() + self.period;
        }
        self.generations.arm()
    }

    fn stop(&mut self) {
        if self.generations.disarm() {
            tracing::trace!("refresh clock stopped");
        }
    }

    fn generation(&self) -> Option<ClockGeneration> {
        self.generations.armed
    }

    fn poll_tick(&mut self) -> Option<Tick> {
        let generation = self.generations.armed?;
        let now = self.now();
        if now < self.next_due {
            return None;
        }

        // A host that fell behind gets a single tick, not a burst.
        self.next_due += self.period;
        if self.next_due <= now {
            self.next_due = now + self.period;
        }
        Some(Tick {
            generation,
            at: now,
        })
    }

    fn until_next_tick(&self) -> Option<Duration> {
        self.generations.armed?;
        Some(self.next_due.saturating_sub(self.now()))
    }
}
