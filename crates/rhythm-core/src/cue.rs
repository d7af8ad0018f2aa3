//! Phase-transition cues.
//!
//! Every phase boundary requests one cue: a tone frequency plus a vibration
//! pattern. Delivery is best-effort -- the [`CueSink`] contract is that a
//! failed cue never blocks the transition that requested it.
//!
//! Mobile autoplay policies require audio contexts to be created on first
//! user interaction; sink implementations own that lifecycle and dispose of
//! it on session exit.

use serde::{Deserialize, Serialize};

use crate::error::CueError;

/// Cue identifier for a phase boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// A work phase is starting.
    WorkStart,
    /// A recovery phase is starting.
    RecoverStart,
    /// The session finished.
    Complete,
}

impl Cue {
    /// Chime frequency in Hz.
    pub fn tone_hz(self) -> u32 {
        match self {
            Cue::WorkStart => 800,
            Cue::RecoverStart => 600,
            Cue::Complete => 1000,
        }
    }

    /// Vibration pattern as alternating on/off segments in milliseconds.
    pub fn vibration_pattern_ms(self) -> &'static [u64] {
        match self {
            // Double pulse announcing the next work interval.
            Cue::WorkStart => &[100, 60, 100],
            // Single short pulse easing into recovery.
            Cue::RecoverStart => &[200],
            // Long completion pattern.
            Cue::Complete => &[400, 100, 400, 100, 400],
        }
    }
}

/// Best-effort sink for audio/vibration cues.
pub trait CueSink: std::fmt::Debug + Send {
    /// Attempt to deliver `cue`. Errors are reported to the caller but must
    /// not leave the sink unusable for later cues.
    fn play(&mut self, cue: Cue) -> Result<(), CueError>;
}

/// Sink that drops every cue. Used when sound guidance is disabled and as
/// the quiet default in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl CueSink for NullSink {
    fn play(&mut self, _cue: Cue) -> Result<(), CueError> {
        Ok(())
    }
}
