#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Playback system that lights the sequence one button at a time.

use std::time::Duration;

use simon_core::{Command, Event, PlaybackView, LIGHT_PHASE_RATIO};

/// Progress of the sequence playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing is being shown.
    Idle,
    /// All buttons are dark; the button at `cursor` lights next.
    Gap {
        /// Number of buttons already shown.
        cursor: usize,
    },
    /// The button at `cursor - 1` is lit.
    Lit {
        /// Number of buttons already shown.
        cursor: usize,
    },
    /// Every button was shown and control was handed to the player.
    Done,
}

impl PlaybackState {
    /// Number of buttons already shown, when playback is running.
    #[must_use]
    pub const fn cursor(&self) -> Option<usize> {
        match self {
            Self::Gap { cursor } | Self::Lit { cursor } => Some(*cursor),
            Self::Idle | Self::Done => None,
        }
    }
}

/// Pure system that reacts to world events and emits lighting commands.
#[derive(Debug)]
pub struct Playback {
    state: PlaybackState,
    accumulator: Duration,
}

impl Playback {
    /// Creates an idle playback system.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
            accumulator: Duration::ZERO,
        }
    }

    /// Current playback state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Consumes world events and the playback view to emit commands.
    pub fn handle(&mut self, events: &[Event], view: PlaybackView<'_>, out: &mut Vec<Command>) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            match event {
                Event::PlaybackStarted { .. }
                | Event::SequenceDisplayToggled { showing: true } => self.restart(),
                Event::PlaybackFinished => {
                    self.state = PlaybackState::Idle;
                    self.accumulator = Duration::ZERO;
                }
                Event::TimeAdvanced { dt } => elapsed = elapsed.saturating_add(*dt),
                _ => {}
            }
        }

        if !view.is_active() || elapsed.is_zero() {
            return;
        }

        if self.state == PlaybackState::Idle {
            self.restart();
        }

        self.advance(elapsed, view, out);
    }

    fn restart(&mut self) {
        self.state = PlaybackState::Gap { cursor: 0 };
        self.accumulator = Duration::ZERO;
    }

    fn advance(&mut self, dt: Duration, view: PlaybackView<'_>, out: &mut Vec<Command>) {
        let step = match self.state {
            PlaybackState::Gap { .. } => dt.saturating_mul(LIGHT_PHASE_RATIO),
            PlaybackState::Lit { .. } => dt,
            PlaybackState::Idle | PlaybackState::Done => return,
        };

        self.accumulator = self.accumulator.saturating_add(step);
        if self.accumulator <= view.display_interval() {
            return;
        }
        self.accumulator = Duration::ZERO;

        let sequence = view.sequence();
        match self.state {
            PlaybackState::Gap { cursor } | PlaybackState::Lit { cursor }
                if cursor >= sequence.len() =>
            {
                self.state = PlaybackState::Done;
                out.push(Command::FinishPlayback);
            }
            PlaybackState::Gap { cursor } => {
                out.push(Command::LightButton {
                    button: sequence[cursor],
                });
                self.state = PlaybackState::Lit { cursor: cursor + 1 };
            }
            PlaybackState::Lit { cursor } => {
                out.push(Command::ClearButtons);
                self.state = PlaybackState::Gap { cursor };
            }
            PlaybackState::Idle | PlaybackState::Done => {}
        }
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self::new()
    }
}
