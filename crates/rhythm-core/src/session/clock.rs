//! Session clock -- the work/recovery phase sequencer.
//!
//! The clock is a caller-driven state machine: it owns no threads and never
//! reads the wall clock to make a decision. In time mode the front end
//! calls [`SessionClock::tick`] once per second from a fixed-period timer;
//! in distance mode the countdown is driven entirely by location fixes fed
//! through [`SessionClock::record_fix`], and a tick only refreshes the
//! display.
//!
//! ## Phase transitions
//!
//! ```text
//! Work -> Recover -> Work (interval + 1)
//!                 -> Complete (after the last interval's recovery)
//! ```
//!
//! Because every mutation goes through `&mut self`, ticks, fixes and user
//! commands are serialized by construction; a boundary crossing fires its
//! transition exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::{Measurement, PausePolicy, SessionConfig};
use crate::cue::{Cue, CueSink};
use crate::error::{CueError, ValidationError};
use crate::events::Event;
use crate::geo::{DistanceTracker, Fix};

/// Current segment of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Recover,
    Complete,
}

/// Core session state machine.
///
/// Owns the phase/interval/remaining state, the distance tracker and the
/// cue sink. Commands return the event they produced, `None` when they were
/// a no-op.
#[derive(Debug)]
pub struct SessionClock {
    config: SessionConfig,
    session_id: Uuid,
    phase: Phase,
    current_interval: u32,
    /// Seconds in time mode, meters in distance mode. Never negative.
    remaining: f64,
    running: bool,
    started: bool,
    stopped: bool,
    started_at: DateTime<Utc>,
    tracker: DistanceTracker,
    sink: Box<dyn CueSink>,
    cue_failures: u32,
    last_cue_error: Option<CueError>,
}

impl SessionClock {
    /// Build a clock for a validated config. The session is not running
    /// until [`start`] is called.
    ///
    /// [`start`]: SessionClock::start
    pub fn new(config: SessionConfig, sink: Box<dyn CueSink>) -> Result<Self, ValidationError> {
        config.validate()?;
        let remaining = config.work_amount;
        Ok(Self {
            config,
            session_id: Uuid::new_v4(),
            phase: Phase::Work,
            current_interval: 1,
            remaining,
            running: false,
            started: false,
            stopped: false,
            started_at: Utc::now(),
            tracker: DistanceTracker::new(),
            sink,
            cue_failures: 0,
            last_cue_error: None,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_interval(&self) -> u32 {
        self.current_interval
    }

    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn total_distance_m(&self) -> f64 {
        self.tracker.total_m()
    }

    pub fn interval_distance_m(&self) -> f64 {
        self.tracker.interval_m()
    }

    /// Cue deliveries that failed so far. Failures never block transitions.
    pub fn cue_failures(&self) -> u32 {
        self.cue_failures
    }

    pub fn last_cue_error(&self) -> Option<&CueError> {
        self.last_cue_error.as_ref()
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn phase_progress(&self) -> f64 {
        let total = self.config.amount_for(self.phase);
        if total == 0.0 {
            return if self.is_complete() { 1.0 } else { 0.0 };
        }
        (1.0 - self.remaining / total).clamp(0.0, 1.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            interval: self.current_interval,
            interval_count: self.config.interval_count,
            remaining: self.remaining,
            phase_total: self.config.amount_for(self.phase),
            running: self.running,
            phase_progress: self.phase_progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin the session. No-op after the first call.
    pub fn start(&mut self) -> Option<Event> {
        if self.started || self.stopped {
            return None;
        }
        self.started = true;
        self.running = true;
        self.started_at = Utc::now();
        Some(Event::SessionStarted {
            session_id: self.session_id,
            measurement: self.config.measurement,
            interval_count: self.config.interval_count,
            remaining: self.remaining,
            at: self.started_at,
        })
    }

    /// Suspend the countdown. Phase, interval and remaining are kept.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.running || self.is_complete() {
            return None;
        }
        self.running = false;
        Some(Event::SessionPaused {
            remaining: self.remaining,
            at: Utc::now(),
        })
    }

    /// Resume a paused session. No-op while running, complete or stopped.
    pub fn resume(&mut self) -> Option<Event> {
        if self.running || !self.started || self.stopped || self.is_complete() {
            return None;
        }
        self.running = true;
        Some(Event::SessionResumed {
            remaining: self.remaining,
            at: Utc::now(),
        })
    }

    /// Restore the start-of-session state for the same config. The clock
    /// does not auto-resume; call [`resume`] to continue.
    ///
    /// [`resume`]: SessionClock::resume
    pub fn reset(&mut self) -> Option<Event> {
        if self.stopped {
            return None;
        }
        self.phase = Phase::Work;
        self.current_interval = 1;
        self.remaining = self.config.work_amount;
        self.running = false;
        self.tracker.reset_all();
        Some(Event::SessionReset { at: Utc::now() })
    }

    /// Terminate the session unconditionally. Idempotent.
    pub fn stop(&mut self) -> Option<Event> {
        if self.stopped {
            return None;
        }
        self.stopped = true;
        self.running = false;
        Some(Event::SessionStopped { at: Utc::now() })
    }

    /// Advance the countdown by one tick.
    ///
    /// Time mode: decrement `remaining` by one second and fire the phase
    /// transition when it reaches zero. Distance mode: the distance source
    /// is authoritative, so a tick never decrements and never transitions
    /// -- it returns a fresh snapshot for display cadence only.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.running || self.is_complete() {
            return None;
        }
        match self.config.measurement {
            Measurement::Time => {
                if self.remaining > 0.0 {
                    self.remaining = (self.remaining - 1.0).max(0.0);
                }
                if self.remaining <= 0.0 {
                    return Some(self.transition());
                }
                None
            }
            Measurement::Distance => Some(self.snapshot()),
        }
    }

    /// Fold a location fix into the session (distance mode).
    ///
    /// On an accepted delta, `remaining` is recomputed from the phase
    /// target and completion is evaluated -- transitions happen on this
    /// evaluation, never mid-fix. Fixes arriving while paused still
    /// accumulate under [`PausePolicy::KeepTracking`], but transitions are
    /// only evaluated while running.
    pub fn record_fix(&mut self, fix: Fix) -> Vec<Event> {
        let mut events = Vec::new();
        if self.config.measurement != Measurement::Distance || self.is_complete() || self.stopped
        {
            return events;
        }
        if !self.running && self.config.pause_policy == PausePolicy::SuspendTracking {
            return events;
        }
        let Some(update) = self.tracker.record_fix(fix) else {
            return events;
        };

        let target = self.config.amount_for(self.phase);
        self.remaining = (target - update.interval_m).max(0.0);
        events.push(Event::DistanceUpdated {
            total_m: update.total_m,
            interval_m: update.interval_m,
            remaining_m: self.remaining,
            at: Utc::now(),
        });
        if self.running && self.remaining <= 0.0 {
            events.push(self.transition());
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Apply the phase-transition rule. Callers guarantee the session is
    /// running and not complete, so each boundary fires exactly once.
    fn transition(&mut self) -> Event {
        let (next_phase, next_interval, cue) = match self.phase {
            Phase::Work => (Phase::Recover, self.current_interval, Cue::RecoverStart),
            Phase::Recover if self.current_interval < self.config.interval_count => {
                (Phase::Work, self.current_interval + 1, Cue::WorkStart)
            }
            Phase::Recover | Phase::Complete => {
                (Phase::Complete, self.current_interval, Cue::Complete)
            }
        };

        // The cue request must happen before the state update that exposes
        // the new phase to observers.
        self.request_cue(cue);

        self.phase = next_phase;
        self.current_interval = next_interval;

        if next_phase == Phase::Complete {
            self.remaining = 0.0;
            self.running = false;
            let elapsed = (Utc::now() - self.started_at).num_seconds().max(0) as u64;
            return Event::SessionCompleted {
                session_id: self.session_id,
                intervals_completed: self.config.interval_count,
                elapsed_secs: elapsed,
                total_distance_m: (!self.config.is_time_based())
                    .then(|| self.tracker.total_m()),
                at: Utc::now(),
            };
        }

        self.remaining = self.config.amount_for(next_phase);
        if self.config.measurement == Measurement::Distance {
            self.tracker.reset_interval();
        }
        Event::PhaseChanged {
            phase: next_phase,
            interval: next_interval,
            remaining: self.remaining,
            cue,
            at: Utc::now(),
        }
    }

    fn request_cue(&mut self, cue: Cue) {
        if !self.config.audio_enabled {
            return;
        }
        if let Err(err) = self.sink.play(cue) {
            // Cue failure must never block the transition.
            self.cue_failures += 1;
            self.last_cue_error = Some(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::NullSink;
    use crate::error::CueError;

    fn time_config(intervals: u32, work: f64, rest: f64) -> SessionConfig {
        SessionConfig {
            interval_count: intervals,
            measurement: Measurement::Time,
            work_amount: work,
            rest_amount: rest,
            ..SessionConfig::default()
        }
    }

    fn clock(config: SessionConfig) -> SessionClock {
        let mut clock = SessionClock::new(config, Box::new(NullSink)).unwrap();
        clock.start();
        clock
    }

    /// Sink that fails every delivery.
    #[derive(Debug, Default)]
    struct FailingSink;

    impl CueSink for FailingSink {
        fn play(&mut self, _cue: Cue) -> Result<(), CueError> {
            Err(CueError::PlaybackUnavailable("denied".into()))
        }
    }

    #[test]
    fn start_state_matches_config() {
        let clock = clock(time_config(5, 120.0, 60.0));
        assert_eq!(clock.phase(), Phase::Work);
        assert_eq!(clock.current_interval(), 1);
        assert_eq!(clock.remaining(), 120.0);
        assert!(clock.running());
    }

    #[test]
    fn start_is_one_shot() {
        let mut clock = clock(time_config(5, 120.0, 60.0));
        assert!(clock.start().is_none());
    }

    #[test]
    fn work_countdown_transitions_to_recover() {
        let mut clock = clock(time_config(2, 10.0, 30.0));
        for _ in 0..9 {
            assert!(clock.tick().is_none());
        }
        match clock.tick() {
            Some(Event::PhaseChanged {
                phase,
                interval,
                remaining,
                cue,
                ..
            }) => {
                assert_eq!(phase, Phase::Recover);
                assert_eq!(interval, 1);
                assert_eq!(remaining, 30.0);
                assert_eq!(cue, Cue::RecoverStart);
            }
            other => panic!("expected PhaseChanged, got {other:?}"),
        }
    }

    #[test]
    fn recover_countdown_advances_interval() {
        let mut clock = clock(time_config(2, 10.0, 10.0));
        for _ in 0..10 {
            clock.tick();
        }
        assert_eq!(clock.phase(), Phase::Recover);
        for _ in 0..10 {
            clock.tick();
        }
        assert_eq!(clock.phase(), Phase::Work);
        assert_eq!(clock.current_interval(), 2);
        assert_eq!(clock.remaining(), 10.0);
    }

    #[test]
    fn last_recovery_completes_the_session() {
        let mut clock = clock(time_config(1, 10.0, 10.0));
        let mut completed = None;
        for _ in 0..20 {
            if let Some(event @ Event::SessionCompleted { .. }) = clock.tick() {
                completed = Some(event);
            }
        }
        assert!(completed.is_some());
        assert_eq!(clock.phase(), Phase::Complete);
        assert!(!clock.running());
        // No further ticks alter state.
        assert!(clock.tick().is_none());
        assert_eq!(clock.remaining(), 0.0);
    }

    #[test]
    fn pause_and_resume_keep_state() {
        let mut clock = clock(time_config(5, 120.0, 60.0));
        clock.tick();
        let remaining = clock.remaining();

        assert!(clock.pause().is_some());
        assert!(!clock.running());
        assert!(clock.pause().is_none());
        assert!(clock.tick().is_none());
        assert_eq!(clock.remaining(), remaining);

        assert!(clock.resume().is_some());
        assert!(clock.running());
        assert!(clock.resume().is_none());
        assert_eq!(clock.remaining(), remaining);
        assert_eq!(clock.current_interval(), 1);
    }

    #[test]
    fn reset_restores_start_state_from_any_point() {
        let mut clock = clock(time_config(2, 10.0, 10.0));
        for _ in 0..15 {
            clock.tick();
        }
        assert_ne!(clock.phase(), Phase::Work);

        clock.reset().unwrap();
        assert_eq!(clock.phase(), Phase::Work);
        assert_eq!(clock.current_interval(), 1);
        assert_eq!(clock.remaining(), 10.0);
        assert!(!clock.running(), "reset must not auto-resume");
    }

    #[test]
    fn stop_is_terminal_and_idempotent() {
        let mut clock = clock(time_config(5, 120.0, 60.0));
        assert!(clock.stop().is_some());
        assert!(clock.stop().is_none());
        assert!(clock.tick().is_none());
        assert!(clock.resume().is_none());
    }

    #[test]
    fn cue_failure_never_blocks_transition() {
        let config = time_config(1, 10.0, 10.0);
        let mut clock = SessionClock::new(config, Box::new(FailingSink::default())).unwrap();
        clock.start();
        for _ in 0..20 {
            clock.tick();
        }
        assert_eq!(clock.phase(), Phase::Complete);
        // Recover start + completion, both failed, both absorbed.
        assert_eq!(clock.cue_failures(), 2);
        assert!(clock.last_cue_error().is_some());
    }

    #[test]
    fn audio_disabled_skips_the_sink() {
        let config = SessionConfig {
            audio_enabled: false,
            ..time_config(1, 10.0, 10.0)
        };
        let mut clock = SessionClock::new(config, Box::new(FailingSink::default())).unwrap();
        clock.start();
        for _ in 0..20 {
            clock.tick();
        }
        assert_eq!(clock.phase(), Phase::Complete);
        assert_eq!(clock.cue_failures(), 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = time_config(0, 120.0, 60.0);
        assert!(SessionClock::new(config, Box::new(NullSink)).is_err());
    }

    #[test]
    fn phase_progress_runs_zero_to_one() {
        let mut clock = clock(time_config(1, 10.0, 10.0));
        assert_eq!(clock.phase_progress(), 0.0);
        for _ in 0..5 {
            clock.tick();
        }
        assert!((clock.phase_progress() - 0.5).abs() < 1e-9);
    }
}
