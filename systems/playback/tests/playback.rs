use std::time::Duration;

use simon_core::{ButtonId, Command, Event, Phase, PlaybackView};
use simon_system_playback::{Playback, PlaybackState};
use simon_world::{self as world, query, SequenceDisplay, World};

const FRAME: Duration = Duration::from_micros(16_667);

#[test]
fn three_button_sequence_lights_in_order_with_gaps() {
    let sequence = [ButtonId::ALL[2], ButtonId::ALL[0], ButtonId::ALL[2]];
    let view = PlaybackView::new(&sequence, Duration::from_millis(600), true);
    let mut playback = Playback::new();
    let mut commands = Vec::new();
    playback.handle(&[Event::PlaybackStarted { length: 3 }], view, &mut commands);

    let mut elapsed = Duration::ZERO;
    let mut finished_at = None;
    for _ in 0..600 {
        elapsed += FRAME;
        let before = commands.len();
        playback.handle(&[Event::TimeAdvanced { dt: FRAME }], view, &mut commands);
        if commands[before..].contains(&Command::FinishPlayback) {
            finished_at = Some(elapsed);
            break;
        }
        if let Some(cursor) = playback.state().cursor() {
            assert!(cursor <= sequence.len());
        }
    }

    assert_eq!(
        commands,
        vec![
            Command::LightButton {
                button: ButtonId::ALL[2]
            },
            Command::ClearButtons,
            Command::LightButton {
                button: ButtonId::ALL[0]
            },
            Command::ClearButtons,
            Command::LightButton {
                button: ButtonId::ALL[2]
            },
            Command::FinishPlayback,
        ]
    );
    assert_eq!(playback.state(), PlaybackState::Done);

    let finished_at = finished_at.expect("playback should finish");
    assert!(finished_at > Duration::from_millis(2_400));
    assert!(finished_at < Duration::from_millis(2_500));
}

#[test]
fn playback_hands_control_to_the_player() {
    let mut world = World::with_seed(21);
    let mut playback = Playback::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartRun, &mut events);

    let mut lit_frames = 0;
    for _ in 0..600 {
        events.push(Event::TimeAdvanced { dt: FRAME });
        let mut commands = Vec::new();
        playback.handle(&events, query::playback_view(&world), &mut commands);
        events.clear();
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        if query::lit_buttons(&world).iter().any(|lit| *lit) {
            lit_frames += 1;
        }
        if query::sequence_display(&world) == SequenceDisplay::Hidden {
            break;
        }
    }

    playback.handle(&events, query::playback_view(&world), &mut Vec::new());

    assert!(lit_frames > 0, "the single button should have been shown");
    assert_eq!(query::phase(&world), Phase::Game);
    assert_eq!(query::progress(&world), 0);
    assert_eq!(query::lit_buttons(&world), [false; 4]);
    assert!(query::judge_view(&world).is_accepting());
    assert_eq!(playback.state(), PlaybackState::Idle);
}

#[test]
fn toggling_display_back_on_replays_from_the_start() {
    let sequence = [ButtonId::ALL[1]];
    let view = PlaybackView::new(&sequence, Duration::from_millis(600), true);
    let mut playback = Playback::new();
    let mut commands = Vec::new();
    playback.handle(&[Event::PlaybackFinished], view, &mut commands);
    assert_eq!(playback.state(), PlaybackState::Idle);

    playback.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_millis(250),
        }],
        view,
        &mut commands,
    );
    assert_eq!(
        commands,
        vec![Command::LightButton {
            button: ButtonId::ALL[1]
        }]
    );
}
