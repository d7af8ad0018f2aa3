use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use super::clock::Phase;

/// How phase length is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measurement {
    Time,
    Distance,
}

/// Whether pausing also suspends distance accumulation.
///
/// The GPS watch keeps running across a pause either way; this only decides
/// whether fixes arriving while paused still count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PausePolicy {
    #[default]
    KeepTracking,
    SuspendTracking,
}

/// Setup range limits, from the setup form.
pub const MIN_INTERVALS: u32 = 1;
pub const MAX_INTERVALS: u32 = 20;

const TIME_WORK_RANGE: (f64, f64) = (10.0, 600.0);
const TIME_REST_RANGE: (f64, f64) = (10.0, 300.0);
const DIST_WORK_RANGE: (f64, f64) = (100.0, 2000.0);
const DIST_REST_RANGE: (f64, f64) = (50.0, 1000.0);

/// Immutable session parameters, fixed once a session starts.
///
/// Amounts are seconds in time mode and meters in distance mode. Time
/// amounts are always carried in seconds internally, whatever unit a setup
/// form presents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Total work+recovery repetitions.
    pub interval_count: u32,
    pub measurement: Measurement,
    pub work_amount: f64,
    pub rest_amount: f64,
    #[serde(default = "default_true")]
    pub audio_enabled: bool,
    #[serde(default)]
    pub pause_policy: PausePolicy,
    /// Refuse to start a distance session when location permission is
    /// denied. When false the session starts and waits for fixes.
    #[serde(default = "default_true")]
    pub block_on_denied: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            interval_count: 5,
            measurement: Measurement::Time,
            work_amount: 120.0,
            rest_amount: 60.0,
            audio_enabled: true,
            pause_policy: PausePolicy::default(),
            block_on_denied: true,
        }
    }
}

impl SessionConfig {
    pub fn is_time_based(&self) -> bool {
        self.measurement == Measurement::Time
    }

    /// The configured amount for a phase. `Complete` has no target.
    pub fn amount_for(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Work => self.work_amount,
            Phase::Recover => self.rest_amount,
            Phase::Complete => 0.0,
        }
    }

    /// Whole-session estimate: seconds in time mode, meters in distance
    /// mode.
    pub fn estimated_total(&self) -> f64 {
        (self.work_amount + self.rest_amount) * self.interval_count as f64
    }

    /// Check the parameters against the setup ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_INTERVALS..=MAX_INTERVALS).contains(&self.interval_count) {
            return Err(ValidationError::IntervalCountOutOfRange {
                min: MIN_INTERVALS,
                max: MAX_INTERVALS,
                got: self.interval_count,
            });
        }
        let (work_range, rest_range) = match self.measurement {
            Measurement::Time => (TIME_WORK_RANGE, TIME_REST_RANGE),
            Measurement::Distance => (DIST_WORK_RANGE, DIST_REST_RANGE),
        };
        check_amount("work_amount", self.work_amount, work_range, self.measurement)?;
        check_amount("rest_amount", self.rest_amount, rest_range, self.measurement)?;
        Ok(())
    }
}

fn check_amount(
    field: &str,
    amount: f64,
    (min, max): (f64, f64),
    measurement: Measurement,
) -> Result<(), ValidationError> {
    if !amount.is_finite() || amount < min || amount > max {
        let unit = match measurement {
            Measurement::Time => "seconds",
            Measurement::Distance => "meters",
        };
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("must be between {min} and {max} {unit}, got {amount}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_intervals() {
        let config = SessionConfig {
            interval_count: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::IntervalCountOutOfRange { got: 0, .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_work_amount() {
        let config = SessionConfig {
            work_amount: 5.0,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn distance_ranges_differ_from_time_ranges() {
        // 400m is a valid work distance but not a valid work time.
        let mut config = SessionConfig {
            measurement: Measurement::Distance,
            work_amount: 400.0,
            rest_amount: 200.0,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_ok());
        config.measurement = Measurement::Time;
        assert!(config.validate().is_err());
    }

    #[test]
    fn estimated_total_multiplies_out() {
        let config = SessionConfig {
            interval_count: 2,
            work_amount: 120.0,
            rest_amount: 60.0,
            ..SessionConfig::default()
        };
        assert_eq!(config.estimated_total(), 360.0);
    }
}
