use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cue::Cue;
use crate::error::LocationError;
use crate::session::{Measurement, Phase};

/// Every observable state change in the engine produces an Event.
/// Front ends render them; `--json` mode serializes them as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_id: Uuid,
        measurement: Measurement,
        interval_count: u32,
        remaining: f64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        remaining: f64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        remaining: f64,
        at: DateTime<Utc>,
    },
    /// A phase boundary was crossed. The cue was requested before this
    /// event became visible.
    PhaseChanged {
        phase: Phase,
        interval: u32,
        remaining: f64,
        cue: Cue,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        session_id: Uuid,
        intervals_completed: u32,
        elapsed_secs: u64,
        total_distance_m: Option<f64>,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    /// Terminal user exit; the front end should navigate back to setup.
    SessionStopped {
        at: DateTime<Utc>,
    },
    /// An accepted movement delta in distance mode.
    DistanceUpdated {
        total_m: f64,
        interval_m: f64,
        remaining_m: f64,
        at: DateTime<Utc>,
    },
    /// Location observation failed. Distance stops accumulating until the
    /// user retries; the session itself keeps its state.
    LocationFailed {
        message: String,
        terminal: bool,
        at: DateTime<Utc>,
    },
    /// Full read-only state for rendering.
    StateSnapshot {
        phase: Phase,
        interval: u32,
        interval_count: u32,
        remaining: f64,
        phase_total: f64,
        running: bool,
        /// 0.0 .. 1.0 progress within the current phase.
        phase_progress: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Build a [`Event::LocationFailed`] from a provider error.
    pub fn location_failed(err: &LocationError) -> Self {
        Event::LocationFailed {
            message: err.to_string(),
            terminal: err.is_terminal(),
            at: Utc::now(),
        }
    }
}
