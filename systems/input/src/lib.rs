#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Input aggregation system that folds every controller and the keyboard
//! into one logical event per frame.
//!
//! Adapters sample devices into a [`RawInput`] snapshot. The
//! [`InputAggregator`] resolves that snapshot through an [`InputMapping`]
//! table, unions held states across devices, and detects press edges using a
//! latch per binding source so analog axes do not repeat presses while held.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use simon_core::{ButtonId, Key, PadAxis, PadButton, RawInput, BUTTON_COUNT};
use thiserror::Error;

/// Physical input that activates a logical action.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Binding {
    /// A digital gamepad button on any connected controller.
    Pad {
        /// Button that must be held.
        button: PadButton,
    },
    /// A keyboard key.
    Key {
        /// Key that must be held.
        key: Key,
    },
    /// A gamepad axis treated as a digital button.
    ///
    /// Positive thresholds activate at or above the value, negative
    /// thresholds at or below it.
    Axis {
        /// Axis that is sampled.
        axis: PadAxis,
        /// Activation threshold in the range -1.0..=1.0, excluding zero.
        threshold: f32,
    },
}

impl Binding {
    const fn pad(button: PadButton) -> Self {
        Self::Pad { button }
    }

    const fn key(key: Key) -> Self {
        Self::Key { key }
    }
}

/// Table translating physical inputs into game actions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputMapping {
    /// Bindings per colored button, indexed by [`ButtonId::index`].
    pub buttons: [Vec<Binding>; BUTTON_COUNT],
    /// Bindings that leave the menu.
    pub start: Vec<Binding>,
    /// Bindings that flip the sequence display.
    pub toggle_sequence: Vec<Binding>,
    /// Controller buttons that must all be held on one controller to quit.
    pub exit_chord: Vec<PadButton>,
    /// Keys that quit while held.
    pub exit_keys: Vec<Key>,
}

impl Default for InputMapping {
    fn default() -> Self {
        Self {
            buttons: [
                vec![Binding::pad(PadButton::West), Binding::key(Key::Left)],
                vec![Binding::pad(PadButton::North), Binding::key(Key::Up)],
                vec![Binding::pad(PadButton::East), Binding::key(Key::Right)],
                vec![Binding::pad(PadButton::South), Binding::key(Key::Down)],
            ],
            start: vec![
                Binding::pad(PadButton::Start),
                Binding::key(Key::Enter),
                Binding::key(Key::Space),
            ],
            toggle_sequence: vec![Binding::key(Key::Digit0)],
            exit_chord: vec![PadButton::Select],
            exit_keys: vec![Key::Escape],
        }
    }
}

impl InputMapping {
    /// Checks that every action can be triggered and thresholds are usable.
    pub fn validate(&self) -> Result<(), MappingError> {
        for (index, bindings) in self.buttons.iter().enumerate() {
            if bindings.is_empty() {
                return Err(MappingError::UnboundButton { button: index });
            }
        }
        if self.exit_chord.is_empty() {
            return Err(MappingError::EmptyExitChord);
        }

        let all_bindings = self
            .buttons
            .iter()
            .flatten()
            .chain(&self.start)
            .chain(&self.toggle_sequence);
        for binding in all_bindings {
            if let Binding::Axis { axis, threshold } = *binding {
                if threshold == 0.0 || !(-1.0..=1.0).contains(&threshold) {
                    return Err(MappingError::InvalidAxisThreshold { axis, threshold });
                }
            }
        }
        Ok(())
    }
}

/// Errors reported when an input mapping cannot drive the game.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum MappingError {
    /// A colored button has no bindings.
    #[error("button {button} has no bindings")]
    UnboundButton {
        /// Index of the unbound button.
        button: usize,
    },
    /// The exit chord lists no controller buttons.
    #[error("exit chord must contain at least one controller button")]
    EmptyExitChord,
    /// An axis binding uses a threshold outside -1.0..=1.0 or zero.
    #[error("axis {axis:?} threshold {threshold} must be non-zero and within -1.0..=1.0")]
    InvalidAxisThreshold {
        /// Axis with the invalid threshold.
        axis: PadAxis,
        /// Offending threshold.
        threshold: f32,
    },
}

/// Logical input produced for a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Whether each button is held on any device.
    pub held: [bool; BUTTON_COUNT],
    /// Button newly pressed this frame; the highest index wins ties.
    pub pressed: Option<ButtonId>,
    /// Whether a start binding was newly pressed.
    pub start: bool,
    /// Whether a toggle binding was newly pressed.
    pub toggle_sequence: bool,
    /// Whether the application should shut down after this frame.
    pub exit_requested: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Action {
    Button(usize),
    Start,
    ToggleSequence,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Device {
    Keyboard,
    Controller(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Source {
    action: Action,
    device: Device,
    binding: usize,
}

#[derive(Debug, Default)]
struct Latches {
    previous: HashSet<Source>,
    current: HashSet<Source>,
}

impl Latches {
    fn observe(&mut self, source: Source, active: bool, sample: &mut Sample) {
        if !active {
            return;
        }
        sample.held = true;
        if !self.previous.contains(&source) {
            sample.pressed = true;
        }
        let _ = self.current.insert(source);
    }

    fn commit(&mut self) {
        std::mem::swap(&mut self.previous, &mut self.current);
        self.current.clear();
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Sample {
    held: bool,
    pressed: bool,
}

/// Pure system that turns raw device snapshots into [`FrameInput`] values.
#[derive(Debug)]
pub struct InputAggregator {
    mapping: InputMapping,
    latches: Latches,
}

impl InputAggregator {
    /// Creates an aggregator driven by the provided mapping.
    #[must_use]
    pub fn new(mapping: InputMapping) -> Self {
        Self {
            mapping,
            latches: Latches::default(),
        }
    }

    /// Folds the raw snapshot into this frame's logical input.
    pub fn aggregate(&mut self, raw: &RawInput) -> FrameInput {
        let mut frame = FrameInput::default();

        for (index, bindings) in self.mapping.buttons.iter().enumerate() {
            let sample = sample_action(&mut self.latches, Action::Button(index), bindings, raw);
            frame.held[index] = sample.held;
            if sample.pressed {
                frame.pressed = ButtonId::from_index(index);
            }
        }
        frame.start =
            sample_action(&mut self.latches, Action::Start, &self.mapping.start, raw).pressed;
        frame.toggle_sequence = sample_action(
            &mut self.latches,
            Action::ToggleSequence,
            &self.mapping.toggle_sequence,
            raw,
        )
        .pressed;
        frame.exit_requested = raw.shutdown_requested || self.exit_held(raw);

        self.latches.commit();
        frame
    }

    fn exit_held(&self, raw: &RawInput) -> bool {
        let chord_held = raw.controllers.iter().any(|controller| {
            self.mapping
                .exit_chord
                .iter()
                .all(|button| controller.is_down(*button))
        });
        chord_held || self.mapping.exit_keys.iter().any(|key| raw.is_key_down(*key))
    }
}

impl Default for InputAggregator {
    fn default() -> Self {
        Self::new(InputMapping::default())
    }
}

fn sample_action(
    latches: &mut Latches,
    action: Action,
    bindings: &[Binding],
    raw: &RawInput,
) -> Sample {
    let mut sample = Sample::default();
    for (binding_index, binding) in bindings.iter().enumerate() {
        match *binding {
            Binding::Key { key } => {
                let source = Source {
                    action,
                    device: Device::Keyboard,
                    binding: binding_index,
                };
                latches.observe(source, raw.is_key_down(key), &mut sample);
            }
            Binding::Pad { button } => {
                for controller in &raw.controllers {
                    let source = Source {
                        action,
                        device: Device::Controller(controller.id),
                        binding: binding_index,
                    };
                    latches.observe(source, controller.is_down(button), &mut sample);
                }
            }
            Binding::Axis { axis, threshold } => {
                for controller in &raw.controllers {
                    let source = Source {
                        action,
                        device: Device::Controller(controller.id),
                        binding: binding_index,
                    };
                    let active = axis_active(controller.axis(axis), threshold);
                    latches.observe(source, active, &mut sample);
                }
            }
        }
    }
    sample
}

fn axis_active(value: f32, threshold: f32) -> bool {
    if threshold > 0.0 {
        value >= threshold
    } else if threshold < 0.0 {
        value <= threshold
    } else {
        false
    }
}
