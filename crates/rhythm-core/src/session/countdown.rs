//! Pre-session lead-in countdown ("Get Ready -- 3, 2, 1, GO").
//!
//! Never part of the session state machine: the front end runs it to
//! completion before calling [`SessionClock::start`], and cancels it by
//! dropping it.
//!
//! [`SessionClock::start`]: super::clock::SessionClock::start

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownStep {
    /// Seconds still to display.
    Counting(u32),
    /// Lead-in finished; start the session.
    Go,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    pub const DEFAULT_SECS: u32 = 3;

    pub fn new(secs: u32) -> Self {
        Self { remaining: secs.max(1) }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Advance one second.
    pub fn tick(&mut self) -> CountdownStep {
        if self.remaining > 1 {
            self.remaining -= 1;
            CountdownStep::Counting(self.remaining)
        } else {
            self.remaining = 0;
            CountdownStep::Go
        }
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_then_goes() {
        let mut countdown = Countdown::new(3);
        assert_eq!(countdown.remaining(), 3);
        assert_eq!(countdown.tick(), CountdownStep::Counting(2));
        assert_eq!(countdown.tick(), CountdownStep::Counting(1));
        assert_eq!(countdown.tick(), CountdownStep::Go);
    }

    #[test]
    fn zero_lead_in_goes_immediately()  {
        let mut countdown = Countdown::new(0);
        assert_eq!(countdown.tick(), CountdownStep::Go);
    }
}
