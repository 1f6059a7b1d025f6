use gilrs::{Axis, Button};
use simon_core::{PadAxis, PadButton, RawInput};
use simon_rendering_macroquad::controller_snapshot;
use simon_system_input::InputAggregator;

#[test]
fn face_buttons_map_to_pad_buttons() {
    let snapshot = controller_snapshot(
        0,
        |button| matches!(button, Button::West | Button::Select),
        |_| 0.0,
    );
    assert!(snapshot.is_down(PadButton::West));
    assert!(snapshot.is_down(PadButton::Select));
    assert!(!snapshot.is_down(PadButton::South));
    assert!(snapshot.axes.is_empty());
}

#[test]
fn resting_axes_are_omitted() {
    let snapshot = controller_snapshot(
        3,
        |_| false,
        |axis| if axis == Axis::LeftZ { 0.75 } else { 0.0 },
    );
    assert_eq!(snapshot.id, 3);
    assert_eq!(snapshot.axes, vec![(PadAxis::LeftTrigger, 0.75)]);
    assert_eq!(snapshot.axis(PadAxis::RightTrigger), 0.0);
}

#[test]
fn held_face_button_presses_once() {
    let mut input = InputAggregator::default();
    let held = RawInput {
        controllers: vec![controller_snapshot(
            0,
            |button| button == Button::North,
            |_| 0.0,
        )],
        ..RawInput::default()
    };

    let first = input.aggregate(&held);
    let second = input.aggregate(&held);
    assert_eq!(first.pressed.map(|button| button.index()), Some(1));
    assert_eq!(second.pressed, None);
    assert!(second.held[1]);
}
