//! Display formatting shared by front ends.

use crate::session::{Measurement, SessionConfig};

/// `M:SS` clock rendering.
pub fn format_clock(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Meters under one kilometer, one-decimal kilometers above.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{}m", meters.round() as i64)
    } else {
        format!("{:.1}km", meters / 1000.0)
    }
}

/// Compact setup-style rendering: `45s`, `2min`, `2:30`, or `400m`.
pub fn format_amount(amount: f64, measurement: Measurement) -> String {
    match measurement {
        Measurement::Time => {
            let secs = amount.max(0.0).round() as u64;
            if secs < 60 {
                format!("{secs}s")
            } else if secs % 60 == 0 {
                format!("{}min", secs / 60)
            } else {
                format!("{}:{:02}", secs / 60, secs % 60)
            }
        }
        Measurement::Distance => format_distance(amount),
    }
}

/// The setup screen's "Total Session" estimate line.
pub fn format_session_estimate(config: &SessionConfig) -> String {
    let total = config.estimated_total();
    match config.measurement {
        Measurement::Time => format!("~{} minutes", (total / 60.0).round() as u64),
        Measurement::Distance => format!("~{} total", format_distance(total)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pads_seconds() {
        assert_eq!(format_clock(125.0), "2:05");
        assert_eq!(format_clock(60.0), "1:00");
        assert_eq!(format_clock(9.0), "0:09");
        assert_eq!(format_clock(-3.0), "0:00");
    }

    #[test]
    fn distance_switches_to_km() {
        assert_eq!(format_distance(42.4), "42m");
        assert_eq!(format_distance(999.0), "999m");
        assert_eq!(format_distance(1500.0), "1.5km");
    }

    #[test]
    fn amount_rendering() {
        assert_eq!(format_amount(45.0, Measurement::Time), "45s");
        assert_eq!(format_amount(120.0, Measurement::Time), "2min");
        assert_eq!(format_amount(150.0, Measurement::Time), "2:30");
        assert_eq!(format_amount(400.0, Measurement::Distance), "400m");
    }

    #[test]
    fn session_estimates() {
        let time = SessionConfig {
            interval_count: 5,
            work_amount: 120.0,
            rest_amount: 60.0,
            ..SessionConfig::default()
        };
        assert_eq!(format_session_estimate(&time), "~15 minutes");

        let distance = SessionConfig {
            interval_count: 5,
            measurement: Measurement::Distance,
            work_amount: 400.0,
            rest_amount: 200.0,
            ..SessionConfig::default()
        };
        assert_eq!(format_session_estimate(&distance), "~3.0km total");
    }
}
