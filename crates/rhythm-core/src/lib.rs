//! # Rhythm Core Library
//!
//! This library provides the core logic for Rhythm, an interval-training
//! timer: work/recovery phases measured by time or by GPS distance, with
//! audio/vibration cues at every phase boundary. All operations are
//! available from a standalone CLI binary; graphical front ends are thin
//! layers over the same engine.
//!
//! ## Architecture
//!
//! - **Session Clock**: a caller-driven state machine that requires the
//!   front end to invoke `tick()` periodically (time mode) or feed it
//!   location fixes (distance mode)
//! - **Distance Tracker**: noise-filtered displacement accumulation over a
//!   stream of GPS fixes
//! - **Cues**: best-effort tone/vibration requests behind a sink trait;
//!   delivery failure never blocks a phase transition
//! - **Storage**: TOML-based configuration for setup defaults and policies
//!
//! ## Key Components
//!
//! - [`SessionClock`]: phase sequencer owning all session state
//! - [`DistanceTracker`]: total/per-interval distance counters
//! - [`LocationProvider`]: platform geolocation seam
//! - [`Config`]: application configuration management

pub mod cue;
pub mod error;
pub mod events;
pub mod format;
pub mod geo;
pub mod session;
pub mod storage;

pub use cue::{Cue, CueSink, NullSink};
pub use error::{
    ConfigError, CoreError, CueError, LocationError, Result, ValidationError,
};
pub use events::Event;
pub use geo::{
    haversine_distance, DistanceTracker, DistanceUpdate, Fix, LocationProvider, ReplayProvider,
};
pub use session::{
    Countdown, CountdownStep, Measurement, PausePolicy, Phase, SessionClock, SessionConfig,
};
pub use storage::Config;
