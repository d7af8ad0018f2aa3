//! Location provider boundary.
//!
//! [`LocationProvider`] is the seam over platform geolocation: continuous
//! high-accuracy observation with permission-denied / unsupported failure
//! modes. [`ReplayProvider`] replays a recorded fix log in place of a live
//! GPS watch -- the desktop stand-in and the test vehicle.

use std::path::Path;

use tokio::time::{sleep, Duration};

use super::tracker::Fix;
use crate::error::LocationError;

/// Continuous position observation.
///
/// `start` is idempotent; `stop` is safe to call when observation never
/// began. Non-terminal poll errors leave observation running; a terminal
/// error (see [`LocationError::is_terminal`]) means it has already stopped.
pub trait LocationProvider: Send {
    /// Begin continuous high-accuracy observation.
    fn start(&mut self) -> Result<(), LocationError>;

    /// End observation.
    fn stop(&mut self);

    /// The next fix, if one arrived since the last poll.
    fn poll_fix(&mut self) -> Result<Option<Fix>, LocationError>;
}

/// Replays a recorded fix log in capture order.
#[derive(Debug, Clone)]
pub struct ReplayProvider {
    fixes: Vec<Fix>,
    cursor: usize,
    started: bool,
    deny_permission: bool,
}

impl ReplayProvider {
    pub fn new(fixes: Vec<Fix>) -> Self {
        Self {
            fixes,
            cursor: 0,
            started: false,
            deny_permission: false,
        }
    }

    /// Load a JSON array of fixes.
    pub fn from_path(path: &Path) -> Result<Self, LocationError> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            LocationError::PositionUnavailable(format!("cannot read fix log: {e}"))
        })?;
        let fixes: Vec<Fix> = serde_json::from_str(&data).map_err(|e| {
            LocationError::PositionUnavailable(format!("malformed fix log: {e}"))
        })?;
        Ok(Self::new(fixes))
    }

    /// A provider whose permission request always fails. Exercises the
    /// denied-permission paths without a real platform prompt.
    pub fn denied() -> Self {
        Self {
            fixes: Vec::new(),
            cursor: 0,
            started: false,
            deny_permission: true,
        }
    }

    /// Fixes not yet replayed.
    pub fn remaining(&self) -> usize {
        self.fixes.len().saturating_sub(self.cursor)
    }

    /// The next fix, after sleeping out the recorded gap since the previous
    /// one. Returns `Ok(None)` when the log is exhausted.
    pub async fn next_paced(&mut self) -> Result<Option<Fix>, LocationError> {
        if !self.started {
            return Err(LocationError::PositionUnavailable(
                "observation not started".into(),
            ));
        }
        let Some(fix) = self.fixes.get(self.cursor).copied() else {
            return Ok(None);
        };
        if self.cursor > 0 {
            let prev = self.fixes[self.cursor - 1];
            let gap_ms = (fix.captured_at - prev.captured_at).num_milliseconds().max(0) as u64;
            sleep(Duration::from_millis(gap_ms)).await;
        }
        self.cursor += 1;
        Ok(Some(fix))
    }
}

impl LocationProvider for ReplayProvider {
    fn start(&mut self) -> Result<(), LocationError> {
        if self.deny_permission {
            return Err(LocationError::PermissionDenied);
        }
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.started = false;
    }

    fn poll_fix(&mut self) -> Result<Option<Fix>, LocationError> {
        if !self.started {
            return Ok(None);
        }
        let fix = self.fixes.get(self.cursor).copied();
        if fix.is_some() {
            self.cursor += 1;
        }
        Ok(fix)
    }
}
