//! Playback pacing that accelerates as a run progresses.

use std::time::Duration;

use simon_core::{
    DECELERATION_STEP, DISPLAY_INTERVAL_FLOOR, INITIAL_DECELERATION, INITIAL_DISPLAY_INTERVAL,
};

/// Display interval and the amount it shrinks after the next round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Difficulty {
    display_interval: Duration,
    deceleration: Duration,
}

impl Difficulty {
    /// Pacing used at the start of every run.
    #[must_use]
    pub const fn initial() -> Self {
        Self {
            display_interval: INITIAL_DISPLAY_INTERVAL,
            deceleration: INITIAL_DECELERATION,
        }
    }

    /// Interval between playback steps.
    #[must_use]
    pub const fn display_interval(&self) -> Duration {
        self.display_interval
    }

    /// Amount the interval shrinks after the next completed round.
    #[must_use]
    pub const fn deceleration(&self) -> Duration {
        self.deceleration
    }

    /// Applies one completed round worth of acceleration.
    pub(crate) fn advance(&mut self) {
        self.display_interval = self
            .display_interval
            .saturating_sub(self.deceleration)
            .max(DISPLAY_INTERVAL_FLOOR);
        self.deceleration = self.deceleration.saturating_sub(DECELERATION_STEP);
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::initial()
    }
}
