#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Lose-animation system that blinks every button after a wrong press.
//!
//! Each cycle keeps the buttons lit for two thirds of its length and dark for
//! the remaining third. A blink counts once its dark third has passed; after
//! the configured number of blinks the system asks the world to release the
//! game into the game-over menu.

use std::time::Duration;

use simon_core::{Command, Event, LOSE_BLINK_COUNT, LOSE_BLINK_CYCLE};

/// Configuration parameters required to construct the lose animation.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    cycle: Duration,
    blinks: u32,
}

impl Config {
    /// Creates a configuration with the provided cycle length and blink count.
    #[must_use]
    pub const fn new(cycle: Duration, blinks: u32) -> Self {
        Self { cycle, blinks }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(LOSE_BLINK_CYCLE, LOSE_BLINK_COUNT)
    }
}

/// Progress of the lose animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoseAnimationState {
    /// No animation is running.
    Idle,
    /// Buttons are blinking.
    Blinking {
        /// Time elapsed since the animation started.
        elapsed: Duration,
        /// Lit state most recently requested from the world.
        lit: bool,
    },
}

/// Pure system that drives the blink cycle from world events.
#[derive(Debug)]
pub struct LoseAnimation {
    config: Config,
    state: LoseAnimationState,
}

impl LoseAnimation {
    /// Creates an idle lose animation.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: LoseAnimationState::Idle,
        }
    }

    /// Current animation state.
    #[must_use]
    pub fn state(&self) -> LoseAnimationState {
        self.state
    }

    /// Number of completed blinks.
    #[must_use]
    pub fn blinks(&self) -> u32 {
        match self.state {
            LoseAnimationState::Idle => 0,
            LoseAnimationState::Blinking { elapsed, .. } => self.completed_blinks(elapsed),
        }
    }

    /// Consumes world events and emits lighting commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let mut dt = Duration::ZERO;
        for event in events {
            match event {
                Event::LoseAnimationStarted => {
                    self.state = LoseAnimationState::Blinking {
                        elapsed: Duration::ZERO,
                        lit: false,
                    };
                }
                Event::LoseAnimationFinished => self.state = LoseAnimationState::Idle,
                Event::TimeAdvanced { dt: step } => dt = dt.saturating_add(*step),
                _ => {}
            }
        }

        let LoseAnimationState::Blinking { elapsed, lit } = self.state else {
            return;
        };
        if dt.is_zero() {
            return;
        }

        let elapsed = elapsed.saturating_add(dt);
        if self.completed_blinks(elapsed) >= self.config.blinks {
            self.state = LoseAnimationState::Idle;
            out.push(Command::FinishLoseAnimation);
            return;
        }

        let lit_now = self.is_lit_at(elapsed);
        if lit_now != lit {
            out.push(Command::SetAllButtonsLit { lit: lit_now });
        }
        self.state = LoseAnimationState::Blinking {
            elapsed,
            lit: lit_now,
        };
    }

    fn completed_blinks(&self, elapsed: Duration) -> u32 {
        let cycle = self.config.cycle.as_nanos();
        if cycle == 0 {
            return self.config.blinks;
        }
        u32::try_from(elapsed.as_nanos() / cycle).unwrap_or(u32::MAX)
    }

    fn is_lit_at(&self, elapsed: Duration) -> bool {
        let cycle = self.config.cycle.as_nanos();
        if cycle == 0 {
            return false;
        }
        let within = elapsed.as_nanos() % cycle;
        within * 3 < cycle * 2
    }
}

impl Default for LoseAnimation {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(ms: u64) -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(ms),
        }]
    }

    #[test]
    fn idle_animation_ignores_time() {
        let mut animation = LoseAnimation::default();
        let mut out = Vec::new();
        animation.handle(&tick(500), &mut out);
        assert!(out.is_empty());
        assert_eq!(animation.state(), LoseAnimationState::Idle);
    }

    #[test]
    fn lights_for_two_thirds_of_each_cycle() {
        let mut animation = LoseAnimation::default();
        let mut out = Vec::new();
        animation.handle(&[Event::LoseAnimationStarted], &mut out);

        animation.handle(&tick(100), &mut out);
        assert_eq!(out, vec![Command::SetAllButtonsLit { lit: true }]);
        out.clear();

        animation.handle(&tick(290), &mut out);
        assert!(out.is_empty(), "still within the lit two thirds");

        animation.handle(&tick(20), &mut out);
        assert_eq!(out, vec![Command::SetAllButtonsLit { lit: false }]);
        assert_eq!(animation.blinks(), 0);
        out.clear();

        animation.handle(&tick(200), &mut out);
        assert_eq!(out, vec![Command::SetAllButtonsLit { lit: true }]);
        assert_eq!(animation.blinks(), 1);
    }

    #[test]
    fn finishes_after_configured_blinks() {
        let mut animation = LoseAnimation::default();
        let mut out = Vec::new();
        animation.handle(&[Event::LoseAnimationStarted], &mut out);

        animation.handle(&tick(1_790), &mut out);
        assert!(!out.contains(&Command::FinishLoseAnimation));

        animation.handle(&tick(10), &mut out);
        assert_eq!(out.last(), Some(&Command::FinishLoseAnimation));
        assert_eq!(animation.state(), LoseAnimationState::Idle);
    }

    #[test]
    fn world_finish_event_stops_blinking() {
        let mut animation = LoseAnimation::default();
        let mut out = Vec::new();
        animation.handle(&[Event::LoseAnimationStarted], &mut out);
        animation.handle(&[Event::LoseAnimationFinished], &mut out);
        animation.handle(&tick(100), &mut out);
        assert!(out.is_empty());
    }
}
