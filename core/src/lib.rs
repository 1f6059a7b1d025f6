#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Simon engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Title used for the window and the idle banner.
pub const APP_TITLE: &str = "Simon";

/// Banner shown while waiting for the first run to start.
pub const MENU_BANNER: &str = "Press any button to start";

/// Banner shown after a run ended with a wrong press.
pub const GAME_OVER_BANNER: &str = "Game over";

/// Number of colored buttons on the board.
pub const BUTTON_COUNT: usize = 4;

/// Maximum number of buttons a sequence may hold.
pub const SEQUENCE_CAPACITY: usize = 100;

/// Interval used to display each sequence element at the start of a run.
pub const INITIAL_DISPLAY_INTERVAL: Duration = Duration::from_millis(600);

/// Lowest display interval reachable through deceleration.
pub const DISPLAY_INTERVAL_FLOOR: Duration = Duration::from_millis(300);

/// Amount the display interval shrinks after the first completed round.
pub const INITIAL_DECELERATION: Duration = Duration::from_millis(40);

/// Amount the deceleration itself shrinks after every completed round.
pub const DECELERATION_STEP: Duration = Duration::from_micros(2_500);

/// Factor applied to frame time while waiting to light the next button.
pub const LIGHT_PHASE_RATIO: u32 = 3;

/// Pause held between a completed round and the next playback.
pub const ROUND_PAUSE: Duration = Duration::from_millis(200);

/// Pause held between a wrong press and the game-over menu.
pub const LOSS_PAUSE: Duration = Duration::from_secs(2);

/// Length of a single lose-animation blink cycle.
pub const LOSE_BLINK_CYCLE: Duration = Duration::from_millis(600);

/// Number of blinks shown before the lose animation releases the game.
pub const LOSE_BLINK_COUNT: u32 = 3;

/// Identifier of one of the four colored buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ButtonId(u8);

impl ButtonId {
    /// Every button in evaluation order.
    pub const ALL: [ButtonId; BUTTON_COUNT] = [ButtonId(0), ButtonId(1), ButtonId(2), ButtonId(3)];

    /// Creates a button identifier when the index lies within the board.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < BUTTON_COUNT {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Zero-based index of the button, suitable for array access.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Phase the waiting state hands control to once it elapses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResumePhase {
    /// Continue playing with the next round.
    Game,
    /// Return to the menu after a lost run.
    MenuGameOver,
}

impl ResumePhase {
    /// Phase entered when the wait completes.
    #[must_use]
    pub const fn phase(self) -> Phase {
        match self {
            Self::Game => Phase::Game,
            Self::MenuGameOver => Phase::MenuGameOver,
        }
    }
}

/// Timed hold that precedes a phase change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Wait {
    resume: ResumePhase,
    duration: Duration,
    elapsed: Duration,
}

impl Wait {
    /// Creates a wait that resumes `resume` after `duration`.
    #[must_use]
    pub const fn new(resume: ResumePhase, duration: Duration) -> Self {
        Self {
            resume,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    /// Phase entered when the wait completes.
    #[must_use]
    pub const fn resume(&self) -> ResumePhase {
        self.resume
    }

    /// Accumulates `dt` and reports whether the wait has run out.
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed = self.elapsed.saturating_add(dt);
        self.elapsed > self.duration
    }
}

/// Top-level state of the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Idle menu shown before the first run.
    Menu,
    /// Menu shown after a lost run.
    MenuGameOver,
    /// A round is being played back or reproduced.
    Game,
    /// A timed hold before resuming another phase.
    Waiting(Wait),
}

impl Phase {
    /// Reports whether the phase shows one of the menu banners.
    #[must_use]
    pub const fn is_menu(&self) -> bool {
        matches!(self, Self::Menu | Self::MenuGameOver)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Raises the best score to a previously persisted value.
    RestoreBestScore {
        /// Best score read from storage.
        best: u32,
    },
    /// Leaves the menu and starts playing the prepared run.
    StartRun,
    /// Reports which buttons the player currently holds.
    SetHeldButtons {
        /// Held flag per button, indexed by [`ButtonId::index`].
        held: [bool; BUTTON_COUNT],
    },
    /// Reports a button press edge observed this frame.
    PressButton {
        /// Button that was pressed.
        button: ButtonId,
    },
    /// Flips whether the sequence is being shown.
    ToggleSequenceDisplay,
    /// Lights a single button during playback, clearing the others.
    LightButton {
        /// Button to light.
        button: ButtonId,
    },
    /// Turns every button off.
    ClearButtons,
    /// Ends playback and hands control to the player.
    FinishPlayback,
    /// Accepts a correct press that does not finish the sequence.
    AcceptPress,
    /// Accepts the press that reproduces the whole sequence.
    CompleteRound,
    /// Ends the run after a wrong press.
    FailRun {
        /// Button the player pressed.
        pressed: ButtonId,
    },
    /// Sets every button to the same lit state during the lose animation.
    SetAllButtonsLit {
        /// Whether the buttons should be lit.
        lit: bool,
    },
    /// Ends the lose animation and releases the game to the menu.
    FinishLoseAnimation,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the game entered a new phase.
    PhaseChanged {
        /// Phase that became active.
        phase: Phase,
    },
    /// Announces that the sequence starts playing from its first element.
    PlaybackStarted {
        /// Number of buttons that will be shown.
        length: usize,
    },
    /// Confirms that a button was lit by playback.
    ButtonLit {
        /// Button that was lit.
        button: ButtonId,
    },
    /// Confirms that every button was turned off.
    ButtonsCleared,
    /// Announces that playback ended and the player may respond.
    PlaybackFinished,
    /// Reports that the sequence display was flipped manually.
    SequenceDisplayToggled {
        /// Whether the sequence is now shown.
        showing: bool,
    },
    /// Reports a button press edge.
    ButtonPressed {
        /// Button that was pressed.
        button: ButtonId,
    },
    /// Reports that a correct press moved the progress cursor.
    ProgressAdvanced {
        /// Number of correct presses in the current attempt.
        cursor: usize,
    },
    /// Reports that the player reproduced the whole sequence.
    RoundCompleted {
        /// Length of the sequence that was reproduced.
        length: usize,
        /// Run score after the round was counted.
        score: u32,
    },
    /// Reports that the best score increased.
    BestScoreChanged {
        /// New best score.
        best: u32,
    },
    /// Reports that a new button was appended to the sequence.
    SequenceExtended {
        /// Length of the sequence after growth.
        length: usize,
    },
    /// Reports that the sequence is full and will not grow further.
    SequenceCapacityReached,
    /// Reports that a wrong press ended the run.
    RunFailed {
        /// Button the sequence expected.
        expected: ButtonId,
        /// Button the player pressed.
        pressed: ButtonId,
        /// Score the run ended with.
        score: u32,
    },
    /// Announces that the lose animation began.
    LoseAnimationStarted,
    /// Announces that the lose animation ended.
    LoseAnimationFinished,
}

/// Read-only view consumed by the playback system.
#[derive(Clone, Copy, Debug)]
pub struct PlaybackView<'a> {
    sequence: &'a [ButtonId],
    display_interval: Duration,
    active: bool,
}

impl<'a> PlaybackView<'a> {
    /// Creates a playback view.
    #[must_use]
    pub const fn new(sequence: &'a [ButtonId], display_interval: Duration, active: bool) -> Self {
        Self {
            sequence,
            display_interval,
            active,
        }
    }

    /// Sequence that should be shown.
    #[must_use]
    pub const fn sequence(&self) -> &'a [ButtonId] {
        self.sequence
    }

    /// Current interval between playback steps.
    #[must_use]
    pub const fn display_interval(&self) -> Duration {
        self.display_interval
    }

    /// Whether playback may advance this frame.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

/// Read-only view consumed by the judge system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JudgeView {
    expected: Option<ButtonId>,
    progress: usize,
    length: usize,
    accepting: bool,
}

impl JudgeView {
    /// Creates a judge view.
    #[must_use]
    pub const fn new(
        expected: Option<ButtonId>,
        progress: usize,
        length: usize,
        accepting: bool,
    ) -> Self {
        Self {
            expected,
            progress,
            length,
            accepting,
        }
    }

    /// Button the player must press next.
    #[must_use]
    pub const fn expected(&self) -> Option<ButtonId> {
        self.expected
    }

    /// Number of correct presses in the current attempt.
    #[must_use]
    pub const fn progress(&self) -> usize {
        self.progress
    }

    /// Length of the sequence being reproduced.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    /// Whether presses are currently judged.
    #[must_use]
    pub const fn is_accepting(&self) -> bool {
        self.accepting
    }
}

/// Face, shoulder, and system buttons found on a gamepad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadButton {
    /// Bottom face button (A on Xbox layouts).
    South,
    /// Right face button (B on Xbox layouts).
    East,
    /// Top face button (Y on Xbox layouts).
    North,
    /// Left face button (X on Xbox layouts).
    West,
    /// Left bumper.
    LeftShoulder,
    /// Right bumper.
    RightShoulder,
    /// Left trigger reported as a digital button.
    LeftTrigger,
    /// Right trigger reported as a digital button.
    RightTrigger,
    /// Directional pad up.
    DPadUp,
    /// Directional pad down.
    DPadDown,
    /// Directional pad left.
    DPadLeft,
    /// Directional pad right.
    DPadRight,
    /// Left middle button (Select, Back, View).
    Select,
    /// Right middle button (Start, Menu).
    Start,
}

/// Analog axes found on a gamepad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadAxis {
    /// Left stick horizontal axis.
    LeftStickX,
    /// Left stick vertical axis.
    LeftStickY,
    /// Right stick horizontal axis.
    RightStickX,
    /// Right stick vertical axis.
    RightStickY,
    /// Left analog trigger.
    LeftTrigger,
    /// Right analog trigger.
    RightTrigger,
}

/// Keyboard keys the game can bind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Enter or Return.
    Enter,
    /// Space bar.
    Space,
    /// Escape.
    Escape,
    /// Number row zero.
    Digit0,
    /// Letter W.
    W,
    /// Letter A.
    A,
    /// Letter S.
    S,
    /// Letter D.
    D,
}

/// State of a single connected controller sampled for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ControllerSnapshot {
    /// Identity of the controller, stable while it stays connected.
    pub id: usize,
    /// Buttons held down on the controller.
    pub buttons_down: Vec<PadButton>,
    /// Axis values in the range -1.0..=1.0.
    pub axes: Vec<(PadAxis, f32)>,
}

impl ControllerSnapshot {
    /// Reports whether the button is held.
    #[must_use]
    pub fn is_down(&self, button: PadButton) -> bool {
        self.buttons_down.contains(&button)
    }

    /// Value of the axis, or zero when the controller does not report it.
    #[must_use]
    pub fn axis(&self, axis: PadAxis) -> f32 {
        self.axes
            .iter()
            .find(|(candidate, _)| *candidate == axis)
            .map_or(0.0, |(_, value)| *value)
    }
}

/// Raw device state gathered by an adapter before aggregation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawInput {
    /// Connected controllers.
    pub controllers: Vec<ControllerSnapshot>,
    /// Keyboard keys held down.
    pub keys_down: Vec<Key>,
    /// Whether the platform asked the application to close.
    pub shutdown_requested: bool,
}

impl RawInput {
    /// Reports whether the key is held.
    #[must_use]
    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_ids_cover_the_board() {
        assert_eq!(ButtonId::from_index(3), Some(ButtonId::ALL[3]));
        assert_eq!(ButtonId::from_index(BUTTON_COUNT), None);
        for (index, button) in ButtonId::ALL.iter().enumerate() {
            assert_eq!(button.index(), index);
        }
    }

    #[test]
    fn wait_elapses_only_after_exceeding_duration() {
        let mut wait = Wait::new(ResumePhase::Game, Duration::from_millis(200));
        assert!(!wait.advance(Duration::from_millis(100)));
        assert!(!wait.advance(Duration::from_millis(100)));
        assert!(wait.advance(Duration::from_millis(1)));
        assert_eq!(wait.resume().phase(), Phase::Game);
    }

    #[test]
    fn missing_axis_reads_as_rest() {
        let controller = ControllerSnapshot {
            id: 0,
            buttons_down: vec![PadButton::West],
            axes: vec![(PadAxis::LeftTrigger, 0.75)],
        };
        assert!(controller.is_down(PadButton::West));
        assert_eq!(controller.axis(PadAxis::LeftTrigger), 0.75);
        assert_eq!(controller.axis(PadAxis::RightTrigger), 0.0);
    }
}
