#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame orchestration for Simon.
//!
//! A [`Session`] owns the world and every system. Each call to
//! [`Session::step`] aggregates device input, advances the world clock,
//! forwards input as commands, and then lets the playback, judge, and
//! lose-animation systems react to the resulting events until no further
//! commands are produced.

use std::time::Duration;

use simon_core::{Command, Event, RawInput};
use simon_system_animation::LoseAnimation;
use simon_system_input::{FrameInput, InputAggregator, InputMapping};
use simon_system_judge::Judge;
use simon_system_playback::Playback;
use simon_world::{self as world, query, World};
use tracing::{debug, warn};

const MAX_SYSTEM_PASSES: usize = 8;

/// Configuration parameters required to construct a session.
#[derive(Clone, Debug, Default)]
pub struct Config {
    master_seed: Option<u64>,
    mapping: InputMapping,
    best_score: u32,
}

impl Config {
    /// Creates a configuration using the provided input mapping.
    #[must_use]
    pub fn new(mapping: InputMapping) -> Self {
        Self {
            master_seed: None,
            mapping,
            best_score: 0,
        }
    }

    /// Fixes the master seed from which every run seed is drawn.
    #[must_use]
    pub fn with_master_seed(mut self, seed: u64) -> Self {
        self.master_seed = Some(seed);
        self
    }

    /// Starts the session with a previously persisted best score.
    #[must_use]
    pub fn with_best_score(mut self, best_score: u32) -> Self {
        self.best_score = best_score;
        self
    }
}

/// Everything that happened during a single frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Logical input derived from the devices.
    pub input: FrameInput,
    /// Events broadcast by the world, in order.
    pub events: Vec<Event>,
    /// Whether the application should shut down once the frame is drawn.
    pub exit_requested: bool,
}

/// Owns the world and the systems that drive it.
#[derive(Debug)]
pub struct Session {
    world: World,
    input: InputAggregator,
    playback: Playback,
    judge: Judge,
    lose_animation: LoseAnimation,
}

impl Session {
    /// Creates a session sitting in the menu.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let Config {
            master_seed,
            mapping,
            best_score,
        } = config;

        let mut world = match master_seed {
            Some(seed) => World::with_seed(seed),
            None => World::new(),
        };
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::RestoreBestScore { best: best_score },
            &mut events,
        );

        Self {
            world,
            input: InputAggregator::new(mapping),
            playback: Playback::new(),
            judge: Judge::new(),
            lose_animation: LoseAnimation::default(),
        }
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Advances the game by one frame.
    pub fn step(&mut self, dt: Duration, raw: &RawInput) -> FrameReport {
        let input = self.input.aggregate(raw);
        let mut commands = vec![
            Command::Tick { dt },
            Command::SetHeldButtons { held: input.held },
        ];
        if input.toggle_sequence {
            commands.push(Command::ToggleSequenceDisplay);
        }
        if query::phase(&self.world).is_menu() {
            if input.start || input.pressed.is_some() {
                commands.push(Command::StartRun);
            }
        } else if let Some(button) = input.pressed {
            commands.push(Command::PressButton { button });
        }

        let events = self.run(commands);
        if input.exit_requested {
            debug!("shutdown requested");
        }

        FrameReport {
            input,
            events,
            exit_requested: input.exit_requested,
        }
    }

    fn run(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut pending = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut pending);
        }

        let mut broadcast = Vec::new();
        for _ in 0..MAX_SYSTEM_PASSES {
            if pending.is_empty() {
                return broadcast;
            }

            let mut responses = Vec::new();
            self.playback.handle(
                &pending,
                query::playback_view(&self.world),
                &mut responses,
            );
            self.judge
                .handle(&pending, query::judge_view(&self.world), &mut responses);
            self.lose_animation.handle(&pending, &mut responses);

            broadcast.append(&mut pending);
            for command in responses {
                world::apply(&mut self.world, command, &mut pending);
            }
        }

        if !pending.is_empty() {
            warn!(
                remaining = pending.len(),
                "systems still reacting after the last pass"
            );
            broadcast.append(&mut pending);
        }
        broadcast
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simon_core::{Key, Phase};

    #[test]
    fn restored_best_score_is_visible_immediately() {
        let session = Session::new(Config::default().with_best_score(42));
        assert_eq!(query::best_score(session.world()), 42);
    }

    #[test]
    fn any_button_starts_from_menu_without_being_judged() {
        let mut session = Session::new(Config::default().with_master_seed(1));
        let report = session.step(
            Duration::from_millis(16),
            &RawInput {
                keys_down: vec![Key::Left],
                ..RawInput::default()
            },
        );
        assert_eq!(query::phase(session.world()), Phase::Game);
        assert!(!report
            .events
            .iter()
            .any(|event| matches!(event, Event::ButtonPressed { .. })));
    }
}
