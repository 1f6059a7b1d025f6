#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Simon.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Keyboard state comes from macroquad; controllers are polled through the
//! local `gamepad` module.

mod gamepad;

pub use self::gamepad::controller_snapshot;

use anyhow::Result;
use glam::Vec2;
use macroquad::input::{is_key_down, is_quit_requested, prevent_quit, KeyCode};
use simon_core::{ButtonId, Key, RawInput};
use simon_rendering::{
    Banner, ButtonLayout, Color, FrameControl, Presentation, RenderingBackend, Scene, TEXT_COLOR,
};
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};
use tracing::info;

use self::gamepad::GamepadPoller;

const BANNER_FONT_SIZE: u16 = 40;
const STATUS_FONT_SIZE: u16 = 30;
const TEXT_MARGIN: f32 = 20.0;
const LINE_SPACING: f32 = 1.3;

const KEY_CODES: [(Key, KeyCode); 12] = [
    (Key::Up, KeyCode::Up),
    (Key::Down, KeyCode::Down),
    (Key::Left, KeyCode::Left),
    (Key::Right, KeyCode::Right),
    (Key::Enter, KeyCode::Enter),
    (Key::Space, KeyCode::Space),
    (Key::Escape, KeyCode::Escape),
    (Key::Digit0, KeyCode::Key0),
    (Key::W, KeyCode::W),
    (Key::A, KeyCode::A),
    (Key::S, KeyCode::S),
    (Key::D, KeyCode::D),
];

/// Keys currently held according to `is_down`.
#[doc(hidden)]
pub fn keys_down<F>(is_down: F) -> Vec<Key>
where
    F: Fn(KeyCode) -> bool,
{
    KEY_CODES
        .iter()
        .filter(|(_, code)| is_down(*code))
        .map(|(key, _)| *key)
        .collect()
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    fullscreen: bool,
    gamepads: bool,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            fullscreen: true,
            gamepads: true,
        }
    }
}

impl MacroquadBackend {
    /// Returns a fullscreen backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures whether the window covers the whole screen.
    #[must_use]
    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    /// Configures whether controllers are polled.
    #[must_use]
    pub fn with_gamepads(mut self, enabled: bool) -> Self {
        self.gamepads = enabled;
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    update: Duration,
    render: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_update: Duration,
    avg_render: Duration,
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    update_accum: Duration,
    render_accum: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.update_accum += breakdown.update;
        self.render_accum += breakdown.render;

        self.frame_times.push_back(breakdown.frame);
        self.window_duration += breakdown.frame;
        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            match self.frame_times.pop_front() {
                Some(removed) => {
                    self.window_duration = self.window_duration.saturating_sub(removed);
                }
                None => break,
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames.max(1);
        let per_second = self.frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let metrics = FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_update: self.update_accum / frames,
            avg_render: self.render_accum / frames,
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.update_accum = Duration::ZERO;
        self.render_accum = Duration::ZERO;
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, &RawInput, &mut Scene) -> FrameControl + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            fullscreen,
            gamepads,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 960,
            window_height: 720,
            fullscreen,
            sample_count: 4,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let mut poller = GamepadPoller::new(gamepads);
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            prevent_quit();

            loop {
                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let raw = RawInput {
                    controllers: poller.poll(),
                    keys_down: keys_down(is_key_down),
                    shutdown_requested: is_quit_requested(),
                };

                let update_start = Instant::now();
                let control = update_scene(frame_dt, &raw, &mut scene);
                let update = update_start.elapsed();

                let render_start = Instant::now();
                macroquad::window::clear_background(background);
                let center = Vec2::new(
                    macroquad::window::screen_width() / 2.0,
                    macroquad::window::screen_height() / 2.0,
                );
                draw_buttons(&scene, center);
                if let Some(banner) = scene.banner {
                    draw_banner(banner, &scene.layout, center);
                }
                draw_status(&scene);
                let render = render_start.elapsed();

                let metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    update,
                    render,
                });
                if show_fps {
                    if let Some(metrics) = metrics {
                        info!(
                            fps = f64::from(metrics.per_second),
                            fps_10s = f64::from(metrics.trailing_ten_seconds),
                            update_ms = metrics.avg_update.as_secs_f64() * 1_000.0,
                            render_ms = metrics.avg_render.as_secs_f64() * 1_000.0,
                            "frame timing"
                        );
                    }
                }

                macroquad::window::next_frame().await;
                if control == FrameControl::Exit {
                    break;
                }
            }
        });

        Ok(())
    }
}

fn draw_buttons(scene: &Scene, center: Vec2) {
    for button in ButtonId::ALL {
        let visual = scene.visuals.get(button);
        let position = scene.layout.position(button, center);
        macroquad::shapes::draw_circle(
            position.x,
            position.y,
            scene.layout.radius * visual.scale,
            to_macroquad_color(visual.color),
        );
    }
}

fn draw_banner(banner: Banner, layout: &ButtonLayout, center: Vec2) {
    let lines = banner.lines();
    let line_height = f32::from(BANNER_FONT_SIZE) * LINE_SPACING;
    let block_height = line_height * lines.len() as f32;
    let mut baseline = center.y - layout.half_height() - TEXT_MARGIN - block_height;
    for line in lines {
        baseline += line_height;
        draw_centered_text(&line, center.x, baseline, BANNER_FONT_SIZE);
    }
}

fn draw_status(scene: &Scene) {
    let line = scene.status_line();
    let dimensions = macroquad::text::measure_text(&line, None, STATUS_FONT_SIZE, 1.0);
    macroquad::text::draw_text(
        &line,
        TEXT_MARGIN,
        TEXT_MARGIN + dimensions.offset_y,
        f32::from(STATUS_FONT_SIZE),
        to_macroquad_color(TEXT_COLOR),
    );
}

fn draw_centered_text(text: &str, center_x: f32, baseline: f32, font_size: u16) {
    let dimensions = macroquad::text::measure_text(text, None, font_size, 1.0);
    macroquad::text::draw_text(
        text,
        center_x - dimensions.width / 2.0,
        baseline,
        f32::from(font_size),
        to_macroquad_color(TEXT_COLOR),
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(ms: u64) -> FrameBreakdown {
        FrameBreakdown {
            frame: Duration::from_millis(ms),
            update: Duration::from_millis(1),
            render: Duration::from_millis(2),
        }
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let mut counter = FpsCounter::default();
        for _ in 0..49 {
            assert_eq!(counter.record_frame(frame(20)), None);
        }
        let metrics = counter
            .record_frame(frame(20))
            .expect("one second has elapsed");
        assert!((metrics.per_second - 50.0).abs() < 1e-3);
        assert_eq!(metrics.avg_update, Duration::from_millis(1));
        assert_eq!(metrics.avg_render, Duration::from_millis(2));

        assert_eq!(counter.record_frame(frame(20)), None);
    }

    #[test]
    fn trailing_window_drops_old_frames() {
        let mut counter = FpsCounter::default();
        for _ in 0..11 {
            let _ = counter.record_frame(frame(1_000));
        }
        assert!(counter.window_duration <= Duration::from_secs(10));
        assert_eq!(counter.frame_times.len(), 10);
    }

    #[test]
    fn key_table_covers_every_key_once() {
        let keys = keys_down(|_| true);
        assert_eq!(keys.len(), KEY_CODES.len());
        for (index, key) in keys.iter().enumerate() {
            assert!(!keys[index + 1..].contains(key));
        }
        assert_eq!(keys_down(|code| code == KeyCode::Key0), vec![Key::Digit0]);
    }
}
