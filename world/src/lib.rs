#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state management for Simon.
//!
//! The [`World`] aggregate owns the sequence, both cursors, difficulty,
//! scores, the current [`Phase`], and the gameplay-authoritative lit flags.
//! It is only ever mutated through [`apply`], which reports every observable
//! change as an [`Event`].

mod difficulty;
mod sequence;

use simon_core::{
    ButtonId, Command, Event, Phase, ResumePhase, Wait, BUTTON_COUNT, LOSS_PAUSE, ROUND_PAUSE,
};
use tracing::{debug, info, warn};

pub use difficulty::Difficulty;
pub use sequence::SequenceError;

use sequence::{ButtonGenerator, Sequence};

const DEFAULT_MASTER_SEED: u64 = 0x51a0_4c3e_9b27_d6f1;

/// Whether the sequence is currently being played back to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceDisplay {
    /// The player reproduces the sequence.
    Hidden,
    /// The playback system lights the sequence.
    Showing,
}

impl SequenceDisplay {
    fn toggled(self) -> Self {
        match self {
            Self::Hidden => Self::Showing,
            Self::Showing => Self::Hidden,
        }
    }
}

/// Animation currently controlling the button lights.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Animation {
    /// No animation; lights follow playback or held buttons.
    None,
    /// Buttons blink after a wrong press.
    LoseBlink,
}

/// Represents the authoritative Simon game state.
#[derive(Debug)]
pub struct World {
    sequence: Sequence,
    generator: ButtonGenerator,
    progress: usize,
    difficulty: Difficulty,
    score: u32,
    best_score: u32,
    last_score: u32,
    phase: Phase,
    display: SequenceDisplay,
    animation: Animation,
    lit: [bool; BUTTON_COUNT],
    held: [bool; BUTTON_COUNT],
}

impl World {
    /// Creates a new world in the menu using the built-in master seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_MASTER_SEED)
    }

    /// Creates a new world whose run seeds derive from `master_seed`.
    #[must_use]
    pub fn with_seed(master_seed: u64) -> Self {
        let mut generator = ButtonGenerator::new(master_seed);
        let first = generator.draw_button();
        Self {
            sequence: Sequence::starting_with(first),
            generator,
            progress: 0,
            difficulty: Difficulty::initial(),
            score: 0,
            best_score: 0,
            last_score: 0,
            phase: Phase::Menu,
            display: SequenceDisplay::Hidden,
            animation: Animation::None,
            lit: [false; BUTTON_COUNT],
            held: [false; BUTTON_COUNT],
        }
    }

    /// Rebuilds the run from scratch: one-button sequence, zero score,
    /// initial pacing.
    fn reset(&mut self) {
        self.generator.start_run();
        let first = self.generator.draw_button();
        self.sequence.restart(first);
        self.progress = 0;
        self.score = 0;
        self.difficulty = Difficulty::initial();
        self.display = SequenceDisplay::Hidden;
        self.lit = [false; BUTTON_COUNT];
    }

    /// Prepares a new attempt at the current sequence.
    fn soft_reset(&mut self) {
        self.progress = 0;
        self.lit = [false; BUTTON_COUNT];
    }

    fn append_to_sequence(&mut self, out_events: &mut Vec<Event>) {
        let button = self.generator.draw_button();
        match self.sequence.push(button) {
            Ok(()) => out_events.push(Event::SequenceExtended {
                length: self.sequence.len(),
            }),
            Err(error) => {
                warn!(%error, "sequence stopped growing");
                out_events.push(Event::SequenceCapacityReached);
            }
        }
    }

    fn enter_phase(&mut self, phase: Phase, out_events: &mut Vec<Event>) {
        debug!(from = ?self.phase, to = ?phase, "phase transition");
        self.phase = phase;
        out_events.push(Event::PhaseChanged { phase });
        if phase == Phase::Game {
            self.display = SequenceDisplay::Showing;
            out_events.push(Event::PlaybackStarted {
                length: self.sequence.len(),
            });
        }
    }

    fn finish_wait(&mut self, resume: ResumePhase, out_events: &mut Vec<Event>) {
        self.soft_reset();
        self.stop_animation(out_events);
        self.enter_phase(resume.phase(), out_events);
    }

    fn stop_animation(&mut self, out_events: &mut Vec<Event>) {
        if self.animation != Animation::None {
            self.animation = Animation::None;
            self.lit = [false; BUTTON_COUNT];
            out_events.push(Event::LoseAnimationFinished);
        }
    }

    fn is_judging(&self) -> bool {
        self.phase == Phase::Game
            && self.display == SequenceDisplay::Hidden
            && self.animation == Animation::None
    }

    fn lights_follow_held(&self) -> bool {
        self.display == SequenceDisplay::Hidden && self.animation == Animation::None
    }

    fn expected_button(&self) -> Option<ButtonId> {
        self.sequence.get(self.progress)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            if let Phase::Waiting(mut wait) = world.phase {
                if wait.advance(dt) {
                    world.finish_wait(wait.resume(), out_events);
                } else {
                    world.phase = Phase::Waiting(wait);
                }
            }
        }
        Command::RestoreBestScore { best } => {
            if best > world.best_score {
                world.best_score = best;
                out_events.push(Event::BestScoreChanged { best });
            }
        }
        Command::StartRun => {
            if world.phase.is_menu() {
                world.soft_reset();
                world.enter_phase(Phase::Game, out_events);
            } else {
                debug!(phase = ?world.phase, "start ignored outside the menu");
            }
        }
        Command::SetHeldButtons { held } => {
            world.held = held;
            if world.lights_follow_held() {
                world.lit = held;
            }
        }
        Command::PressButton { button } => {
            out_events.push(Event::ButtonPressed { button });
        }
        Command::ToggleSequenceDisplay => {
            world.display = world.display.toggled();
            if world.lights_follow_held() {
                world.lit = world.held;
            }
            out_events.push(Event::SequenceDisplayToggled {
                showing: world.display == SequenceDisplay::Showing,
            });
        }
        Command::LightButton { button } => {
            if world.display == SequenceDisplay::Showing {
                world.lit = [false; BUTTON_COUNT];
                world.lit[button.index()] = true;
                out_events.push(Event::ButtonLit { button });
            }
        }
        Command::ClearButtons => {
            if world.display == SequenceDisplay::Showing || world.animation != Animation::None {
                world.lit = [false; BUTTON_COUNT];
                out_events.push(Event::ButtonsCleared);
            }
        }
        Command::FinishPlayback => {
            if world.display == SequenceDisplay::Showing {
                world.display = SequenceDisplay::Hidden;
                world.soft_reset();
                out_events.push(Event::PlaybackFinished);
            }
        }
        Command::AcceptPress => {
            if world.is_judging() && world.progress + 1 < world.sequence.len() {
                world.progress += 1;
                out_events.push(Event::ProgressAdvanced {
                    cursor: world.progress,
                });
            }
        }
        Command::CompleteRound => {
            if !world.is_judging() || world.progress + 1 != world.sequence.len() {
                debug!(progress = world.progress, "round completion ignored");
                return;
            }
            world.progress += 1;
            out_events.push(Event::ProgressAdvanced {
                cursor: world.progress,
            });

            let length = world.progress;
            world.difficulty.advance();
            world.score = world.score.saturating_add(length as u32);
            out_events.push(Event::RoundCompleted {
                length,
                score: world.score,
            });
            if world.score > world.best_score {
                world.best_score = world.score;
                out_events.push(Event::BestScoreChanged {
                    best: world.best_score,
                });
            }

            world.soft_reset();
            world.append_to_sequence(out_events);
            world.enter_phase(
                Phase::Waiting(Wait::new(ResumePhase::Game, ROUND_PAUSE)),
                out_events,
            );
        }
        Command::FailRun { pressed } => {
            if !world.is_judging() {
                return;
            }
            let Some(expected) = world.expected_button() else {
                return;
            };
            let score = world.score;
            info!(score, length = world.sequence.len(), "run failed");
            out_events.push(Event::RunFailed {
                expected,
                pressed,
                score,
            });

            world.last_score = score;
            world.reset();
            world.animation = Animation::LoseBlink;
            out_events.push(Event::LoseAnimationStarted);
            world.enter_phase(
                Phase::Waiting(Wait::new(ResumePhase::MenuGameOver, LOSS_PAUSE)),
                out_events,
            );
        }
        Command::SetAllButtonsLit { lit } => {
            if world.animation != Animation::None {
                world.lit = [lit; BUTTON_COUNT];
            }
        }
        Command::FinishLoseAnimation => {
            if world.animation == Animation::None {
                return;
            }
            match world.phase {
                Phase::Waiting(wait) if wait.resume() == ResumePhase::MenuGameOver => {
                    world.finish_wait(wait.resume(), out_events);
                }
                _ => world.stop_animation(out_events),
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{Animation, Difficulty, SequenceDisplay, World};
    use simon_core::{ButtonId, JudgeView, Phase, PlaybackView, BUTTON_COUNT};

    /// Current top-level phase.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Buttons the player must reproduce.
    #[must_use]
    pub fn sequence(world: &World) -> &[ButtonId] {
        world.sequence.as_slice()
    }

    /// Number of correct presses in the current attempt.
    #[must_use]
    pub fn progress(world: &World) -> usize {
        world.progress
    }

    /// Score of the active run.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Highest score reached so far.
    #[must_use]
    pub fn best_score(world: &World) -> u32 {
        world.best_score
    }

    /// Score the most recently lost run ended with.
    #[must_use]
    pub fn last_score(world: &World) -> u32 {
        world.last_score
    }

    /// Current playback pacing.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.difficulty
    }

    /// Interval between playback steps.
    #[must_use]
    pub fn display_interval(world: &World) -> Duration {
        world.difficulty.display_interval()
    }

    /// Whether the sequence is being played back.
    #[must_use]
    pub fn sequence_display(world: &World) -> SequenceDisplay {
        world.display
    }

    /// Animation currently controlling the lights.
    #[must_use]
    pub fn animation(world: &World) -> Animation {
        world.animation
    }

    /// Gameplay-authoritative lit flag per button.
    #[must_use]
    pub fn lit_buttons(world: &World) -> [bool; BUTTON_COUNT] {
        world.lit
    }

    /// Captures what the playback system needs for this frame.
    #[must_use]
    pub fn playback_view(world: &World) -> PlaybackView<'_> {
        let active = world.phase == Phase::Game
            && world.display == SequenceDisplay::Showing
            && world.animation == Animation::None;
        PlaybackView::new(
            world.sequence.as_slice(),
            world.difficulty.display_interval(),
            active,
        )
    }

    /// Captures what the judge system needs for this frame.
    #[must_use]
    pub fn judge_view(world: &World) -> JudgeView {
        JudgeView::new(
            world.expected_button(),
            world.progress,
            world.sequence.len(),
            world.is_judging(),
        )
    }
}
