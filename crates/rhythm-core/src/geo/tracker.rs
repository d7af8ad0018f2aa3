//! Distance tracker -- noise-filtered displacement accumulation.
//!
//! Converts a stream of raw location fixes into cumulative and per-interval
//! distance. Movement below the noise floor and fixes with a coarse
//! accuracy radius are discarded, but every fix still becomes the new
//! reference point so a noisy reading never pins future deltas to a stale
//! position.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::haversine::haversine_distance;

/// Movement at or below this many meters is treated as GPS jitter.
pub const MIN_DELTA_M: f64 = 2.0;

/// Fixes reporting an accuracy radius at or above this are too coarse to
/// trust.
pub const MAX_ACCURACY_M: f64 = 50.0;

/// A single reading from the location provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
    /// Reported horizontal accuracy radius in meters.
    pub horizontal_accuracy_m: f64,
    pub captured_at: DateTime<Utc>,
}

/// An accepted movement delta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceUpdate {
    /// Distance covered since the previous reference point, meters.
    pub delta_m: f64,
    /// Session-lifetime cumulative distance, meters.
    pub total_m: f64,
    /// Distance within the current phase interval, meters.
    pub interval_m: f64,
}

/// Accumulates filtered displacement from location fixes.
///
/// `total_m` is monotonic for the session lifetime; `interval_m` restarts
/// at every phase transition via [`DistanceTracker::reset_interval`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistanceTracker {
    last_fix: Option<Fix>,
    total_m: f64,
    interval_m: f64,
}

impl DistanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn total_m(&self) -> f64 {
        self.total_m
    }

    pub fn interval_m(&self) -> f64 {
        self.interval_m
    }

    /// The current reference point, if any fix has arrived yet.
    pub fn last_fix(&self) -> Option<&Fix> {
        self.last_fix.as_ref()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Fold a new fix into the counters.
    ///
    /// Returns the accepted delta, or `None` when the movement was filtered
    /// as noise. The first fix after construction or [`reset_all`] only
    /// establishes the reference point and contributes zero distance.
    ///
    /// [`reset_all`]: DistanceTracker::reset_all
    pub fn record_fix(&mut self, fix: Fix) -> Option<DistanceUpdate> {
        let prev = self.last_fix.replace(fix)?;

        let delta = haversine_distance(prev.latitude, prev.longitude, fix.latitude, fix.longitude);
        if delta <= MIN_DELTA_M || fix.horizontal_accuracy_m >= MAX_ACCURACY_M {
            return None;
        }

        self.total_m += delta;
        self.interval_m += delta;
        Some(DistanceUpdate {
            delta_m: delta,
            total_m: self.total_m,
            interval_m: self.interval_m,
        })
    }

    /// Start a new phase interval. The total and the reference point are
    /// untouched.
    pub fn reset_interval(&mut self) {
        self.interval_m = 0.0;
    }

    /// Zero both counters and clear the reference point.
    pub fn reset_all(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(latitude: f64, longitude: f64, accuracy: f64) -> Fix {
        Fix {
            latitude,
            longitude,
            horizontal_accuracy_m: accuracy,
            captured_at: Utc::now(),
        }
    }

    // ~0.000045 degrees of latitude is about 5 meters.
    const FIVE_M_LAT: f64 = 0.000045;

    #[test]
    fn first_fix_only_sets_reference() {
        let mut tracker = DistanceTracker::new();
        assert!(tracker.record_fix(fix(51.0, 0.0, 10.0)).is_none());
        assert_eq!(tracker.total_m(), 0.0);
        assert!(tracker.last_fix().is_some());
    }

    #[test]
    fn accepts_clear_movement() {
        let mut tracker = DistanceTracker::new();
        tracker.record_fix(fix(51.0, 0.0, 10.0));
        let update = tracker.record_fix(fix(51.0 + FIVE_M_LAT, 0.0, 10.0)).unwrap();
        assert!((update.delta_m - 5.0).abs() < 0.5, "delta {}", update.delta_m);
        assert!((tracker.total_m() - 5.0).abs() < 0.5);
        assert!((tracker.interval_m() - 5.0).abs() < 0.5);
    }

    #[test]
    fn rejects_sub_noise_floor_movement() {
        let mut tracker = DistanceTracker::new();
        tracker.record_fix(fix(51.0, 0.0, 10.0));
        // ~1.5m north: under the 2m floor.
        assert!(tracker
            .record_fix(fix(51.0 + FIVE_M_LAT * 0.3, 0.0, 10.0))
            .is_none());
        assert_eq!(tracker.total_m(), 0.0);
    }

    #[test]
    fn rejects_coarse_accuracy() {
        let mut tracker = DistanceTracker::new();
        tracker.record_fix(fix(51.0, 0.0, 10.0));
        assert!(tracker
            .record_fix(fix(51.0 + FIVE_M_LAT, 0.0, 50.0))
            .is_none());
        assert_eq!(tracker.total_m(), 0.0);
    }

    #[test]
    fn rejected_fix_still_advances_reference() {
        let mut tracker = DistanceTracker::new();
        tracker.record_fix(fix(51.0, 0.0, 10.0));
        // Coarse fix 5m away: rejected, but becomes the new reference.
        tracker.record_fix(fix(51.0 + FIVE_M_LAT, 0.0, 80.0));
        // Next accurate fix another 5m on: measured against the coarse fix,
        // not the first point.
        let update = tracker
            .record_fix(fix(51.0 + 2.0 * FIVE_M_LAT, 0.0, 10.0))
            .unwrap();
        assert!((update.delta_m - 5.0).abs() < 0.5, "delta {}", update.delta_m);
    }

    #[test]
    fn interval_reset_keeps_total_and_reference() {
        let mut tracker = DistanceTracker::new();
        tracker.record_fix(fix(51.0, 0.0, 10.0));
        tracker.record_fix(fix(51.0 + FIVE_M_LAT, 0.0, 10.0));
        tracker.reset_interval();
        assert_eq!(tracker.interval_m(), 0.0);
        assert!(tracker.total_m() > 4.0);
        assert!(tracker.last_fix().is_some());
    }

    #[test]
    fn reset_all_clears_everything() {
        let mut tracker = DistanceTracker::new();
        tracker.record_fix(fix(51.0, 0.0, 10.0));
        tracker.record_fix(fix(51.0 + FIVE_M_LAT, 0.0, 10.0));
        tracker.reset_all();
        assert_eq!(tracker.total_m(), 0.0);
        assert_eq!(tracker.interval_m(), 0.0);
        assert!(tracker.last_fix().is_none());
        // The next fix is a fresh reference point again.
        assert!(tracker.record_fix(fix(51.0, 0.0, 10.0)).is_none());
    }
}
