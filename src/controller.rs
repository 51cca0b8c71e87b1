//! Playback state machine.
//!
//! The controller owns the current position and the play/pause status,
//! arms and disarms its [`Clock`], and turns paint-cadence ticks into
//! content-rate frame advances. Every transition runs to completion before
//! the next tick or user call is looked at; hosts that share a controller
//! across threads must wrap it in a mutex to keep that true.

use std::fmt;
use std::time::Duration;

use crate::ascii_frame::AsciiFrame;
use crate::clock::{Clock, ManualClock, RefreshClock, Tick};
use crate::error::{PlaybackError, PlaybackResult};
use crate::frame_store::FrameStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Idle,
    Stopped,
    Playing,
    Paused,
}

impl PlaybackStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    pub current_frame_index: usize,
    pub is_playing: bool,
    pub last_advance_timestamp: Duration,
}

/// Read-only view for hosts ("Frame k / N").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub current_frame_index: usize,
    pub is_playing: bool,
    pub frame_count: usize,
    pub status: PlaybackStatus,
}

impl fmt::Display for PlaybackSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frame_count == 0 {
            return f.write_str("Frame - / -");
        }
        write!(
            f,
            "Frame {} / {}",
            self.current_frame_index + 1,
            self.frame_count
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing, or the tick belongs to a disarmed clock chain.
    Ignored,
    /// Less than one frame interval since the last advance.
    Waiting,
    Advanced(usize),
    /// Ran past the last frame: rewound to 0 and stopped.
    Finished,
}

#[derive(Debug)]
struct Session {
    store: FrameStore,
    state: PlaybackState,
    paused: bool,
    frame_interval: Duration,
}

impl Session {
    fn last_index(&self) -> usize {
        self.store.len() - 1
    }

    fn status(&self) -> PlaybackStatus {
        if self.state.is_playing {
            PlaybackStatus::Playing
        } else if self.paused {
            PlaybackStatus::Paused
        } else {
            PlaybackStatus::Stopped
        }
    }
}

#[derive(Debug)]
pub struct PlaybackController<C: Clock = RefreshClock> {
    clock: C,
    session: Option<Session>,
    presented: Option<usize>,
}

impl<C: Clock> PlaybackController<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            session: None,
            presented: None,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Replaces the frame store. Validation happens before anything is
    /// touched, so a rejected store leaves the previous session running.
    pub fn load(&mut self, store: FrameStore) -> PlaybackResult<()> {
        if let Err(error) = store.validate() {
            tracing::warn!(%error, "rejected frame store");
            return Err(error.into());
        }

        self.clock.stop();
        let frame_interval = store.metadata().frame_interval();
        tracing::info!(
            frames = store.len(),
            sampled_fps = store.metadata().sampled_fps,
            interval_ms = frame_interval.as_secs_f64() * 1000.0,
            "loaded frame store"
        );
        self.session = Some(Session {
            store,
            state: PlaybackState {
                current_frame_index: 0,
                is_playing: false,
                last_advance_timestamp: self.clock.now(),
            },
            paused: false,
            frame_interval,
        });
        self.presented = None;
        Ok(())
    }

    /// Tears the session down. No tick produced before this call is applied
    /// afterwards.
    pub fn unload(&mut self) {
        self.clock.stop();
        if self.session.take().is_some() {
            tracing::debug!("unloaded frame store");
        }
        self.presented = None;
    }

    pub fn play(&mut self) -> PlaybackResult<()> {
        let session = self.session.as_mut().ok_or(PlaybackError::NotReady)?;
        if session.state.is_playing {
            return Ok(());
        }

        if session.state.current_frame_index == session.last_index() {
            session.state.current_frame_index = 0;
        }
        self.clock.start();
        session.state.is_playing = true;
        session.paused = false;
        session.state.last_advance_timestamp = self.clock.now();
        tracing::debug!(index = session.state.current_frame_index, "play");
        Ok(())
    }

    pub fn pause(&mut self) -> PlaybackResult<()> {
        let session = self.session.as_mut().ok_or(PlaybackError::NotReady)?;
        if !session.state.is_playing {
            return Ok(());
        }

        self.clock.stop();
        session.state.is_playing = false;
        session.paused = true;
        tracing::debug!(index = session.state.current_frame_index, "pause");
        Ok(())
    }

    pub fn toggle(&mut self) -> PlaybackResult<()> {
        if self.is_playing() {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Moves to `target` clamped into the store and stops playback.
    pub fn seek(&mut self, target: i64) -> PlaybackResult<()> {
        let session = self.session.as_mut().ok_or(PlaybackError::NotReady)?;
        let last = session.last_index();
        let clamped = usize::try_from(target.max(0)).map_or(last, |index| index.min(last));

        self.clock.stop();
        session.state.current_frame_index = clamped;
        session.state.is_playing = false;
        session.paused = false;
        tracing::debug!(target, index = clamped, "seek");
        Ok(())
    }

    pub fn step(&mut self, delta: i64) -> PlaybackResult<()> {
        let current = self
            .session
            .as_ref()
            .ok_or(PlaybackError::NotReady)?
            .state
            .current_frame_index;
        let current = i64::try_from(current).unwrap_or(i64::MAX);
        self.seek(current.saturating_add(delta))
    }

    pub fn restart(&mut self) -> PlaybackResult<()> {
        self.seek(0)?;
        self.play()
    }

    /// Applies one clock tick. Advances at most one frame no matter how far
    /// behind the tick is; late hosts see slowed playback, not skipped frames.
    pub fn handle_tick(&mut self, tick: Tick) -> TickOutcome {
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Ignored;
        };
        if !session.state.is_playing || !self.clock.is_current(&tick) {
            return TickOutcome::Ignored;
        }

        let elapsed = tick.at.saturating_sub(session.state.last_advance_timestamp);
        if elapsed < session.frame_interval {
            return TickOutcome::Waiting;
        }

        let next = session.state.current_frame_index + 1;
        if next > session.last_index() {
            self.clock.stop();
            session.state.current_frame_index = 0;
            session.state.is_playing = false;
            session.paused = false;
            tracing::debug!("reached end, rewound to first frame");
            return TickOutcome::Finished;
        }

        session.state.current_frame_index = next;
        session.state.last_advance_timestamp = tick.at;
        TickOutcome::Advanced(next)
    }

    /// Polls the clock and applies the due tick, if any.
    pub fn pump(&mut self) -> Option<TickOutcome> {
        let tick = self.clock.poll_tick()?;
        Some(self.handle_tick(tick))
    }

    pub fn is_playing(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.state.is_playing)
    }

    pub fn status(&self) -> PlaybackStatus {
        self.session
            .as_ref()
            .map_or(PlaybackStatus::Idle, Session::status)
    }

    pub fn state(&self) -> Option<&PlaybackState> {
        self.session.as_ref().map(|session| &session.state)
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        match &self.session {
            Some(session) => PlaybackSnapshot {
                current_frame_index: session.state.current_frame_index,
                is_playing: session.state.is_playing,
                frame_count: session.store.len(),
                status: session.status(),
            },
            None => PlaybackSnapshot {
                current_frame_index: 0,
                is_playing: false,
                frame_count: 0,
                status: PlaybackStatus::Idle,
            },
        }
    }

    pub fn frame_store(&self) -> Option<&FrameStore> {
        self.session.as_ref().map(|session| &session.store)
    }

    pub fn frame_interval(&self) -> Option<Duration> {
        self.session.as_ref().map(|session| session.frame_interval)
    }

    pub fn current_frame(&self) -> Option<&AsciiFrame> {
        let session = self.session.as_ref()?;
        session.store.frame(session.state.current_frame_index)
    }

    /// The frame to draw, returned once per distinct displayed index.
    pub fn take_frame_to_present(&mut self) -> Option<&AsciiFrame> {
        let session = self.session.as_ref()?;
        let index = session.state.current_frame_index;
        if self.presented == Some(index) {
            return None;
        }
        self.presented = Some(index);
        session.store.frame(index)
    }

    /// Forces the next `take_frame_to_present` to yield, e.g. after the
    /// surface was resized or the colour mode changed.
    pub fn invalidate_presentation(&mut self) {
        self.presented = None;
    }
}

/// Time control for headless hosts and tests. Only time moves here; arming
/// and disarming the clock stays with `play`/`pause`/`seek`.
impl PlaybackController<ManualClock> {
    /// Moves time to `at`. While playing this leaves one tick for `pump`.
    pub fn advance_time(&mut self, at: Duration) {
        self.clock.advance_to(at);
    }

    /// Moves time to `at` and returns the due tick without applying it.
    pub fn take_tick_at(&mut self, at: Duration) -> Option<Tick> {
        self.clock.fire(at)
    }
}

impl<C: Clock> Drop for PlaybackController<C> {
    fn drop(&mut self) {
        self.clock.stop();
    }
}
