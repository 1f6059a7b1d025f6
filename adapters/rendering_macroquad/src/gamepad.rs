//! Gamepad polling through gilrs.
//!
//! macroquad 0.3 exposes no controller API, so controllers are read through
//! gilrs and flattened into [`ControllerSnapshot`] values. When gilrs cannot
//! start the adapter carries on with keyboard input alone.

use gilrs::{Axis, Button, Gilrs};
use simon_core::{ControllerSnapshot, PadAxis, PadButton};
use tracing::{debug, warn};

const BUTTONS: [(PadButton, Button); 14] = [
    (PadButton::South, Button::South),
    (PadButton::East, Button::East),
    (PadButton::North, Button::North),
    (PadButton::West, Button::West),
    (PadButton::LeftShoulder, Button::LeftTrigger),
    (PadButton::RightShoulder, Button::RightTrigger),
    (PadButton::LeftTrigger, Button::LeftTrigger2),
    (PadButton::RightTrigger, Button::RightTrigger2),
    (PadButton::DPadUp, Button::DPadUp),
    (PadButton::DPadDown, Button::DPadDown),
    (PadButton::DPadLeft, Button::DPadLeft),
    (PadButton::DPadRight, Button::DPadRight),
    (PadButton::Select, Button::Select),
    (PadButton::Start, Button::Start),
];

const AXES: [(PadAxis, Axis); 6] = [
    (PadAxis::LeftStickX, Axis::LeftStickX),
    (PadAxis::LeftStickY, Axis::LeftStickY),
    (PadAxis::RightStickX, Axis::RightStickX),
    (PadAxis::RightStickY, Axis::RightStickY),
    (PadAxis::LeftTrigger, Axis::LeftZ),
    (PadAxis::RightTrigger, Axis::RightZ),
];

/// Builds the snapshot of controller `id` from per-button and per-axis probes.
#[doc(hidden)]
pub fn controller_snapshot<P, V>(id: usize, is_pressed: P, value: V) -> ControllerSnapshot
where
    P: Fn(Button) -> bool,
    V: Fn(Axis) -> f32,
{
    let buttons_down = BUTTONS
        .iter()
        .filter(|(_, button)| is_pressed(*button))
        .map(|(pad, _)| *pad)
        .collect();
    let axes = AXES
        .iter()
        .map(|(pad, axis)| (*pad, value(*axis)))
        .filter(|(_, value)| *value != 0.0)
        .collect();
    ControllerSnapshot {
        id,
        buttons_down,
        axes,
    }
}

pub(crate) struct GamepadPoller {
    gilrs: Option<Gilrs>,
}

impl GamepadPoller {
    pub(crate) fn new(enabled: bool) -> Self {
        if !enabled {
            return Self { gilrs: None };
        }
        let gilrs = match Gilrs::new() {
            Ok(gilrs) => Some(gilrs),
            Err(gilrs::Error::NotImplemented(dummy)) => {
                warn!("gamepads are not supported on this platform");
                Some(dummy)
            }
            Err(error) => {
                warn!(%error, "gamepad support unavailable, using keyboard only");
                None
            }
        };
        Self { gilrs }
    }

    pub(crate) fn poll(&mut self) -> Vec<ControllerSnapshot> {
        let Some(gilrs) = self.gilrs.as_mut() else {
            return Vec::new();
        };
        while let Some(event) = gilrs.next_event() {
            if matches!(
                event.event,
                gilrs::EventType::Connected | gilrs::EventType::Disconnected
            ) {
                debug!(id = ?event.id, kind = ?event.event, "controller hotplug");
            }
        }
        gilrs
            .gamepads()
            .map(|(id, gamepad)| {
                controller_snapshot(
                    usize::from(id),
                    |button| gamepad.is_pressed(button),
                    |axis| gamepad.value(axis),
                )
            })
            .collect()
    }
}
