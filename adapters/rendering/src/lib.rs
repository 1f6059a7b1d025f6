#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Simon adapters.
//!
//! Everything here is presentation-only. The lit flags come from the world;
//! the smoothed colors and radii tracked by [`ButtonVisuals`] are never read
//! back by gameplay.

use anyhow::Result as AnyResult;
use glam::Vec2;
use simon_core::{ButtonId, RawInput, BUTTON_COUNT, GAME_OVER_BANNER, MENU_BANNER};
use std::time::Duration;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        self.lerp(Self::new(1.0, 1.0, 1.0, self.alpha), amount)
    }

    /// Moves each channel towards `target` by the fraction `t`.
    #[must_use]
    pub fn lerp(self, target: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            red: lerp(self.red, target.red, t),
            green: lerp(self.green, target.green, t),
            blue: lerp(self.blue, target.blue, t),
            alpha: lerp(self.alpha, target.alpha, t),
        }
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Background painted behind the board.
pub const BACKGROUND: Color = Color::from_rgb_u8(245, 245, 245);

/// Color used for banner and score text.
pub const TEXT_COLOR: Color = Color::from_rgb_u8(80, 80, 80);

const PALETTE: [Color; BUTTON_COUNT] = [
    Color::from_rgb_u8(0, 228, 48),
    Color::from_rgb_u8(253, 249, 0),
    Color::from_rgb_u8(230, 41, 55),
    Color::from_rgb_u8(255, 161, 0),
];

const UNLIT_TINT: f32 = 0.85;
const LIT_GROWTH: f32 = 1.12;

/// Full-strength color of a lit button.
#[must_use]
pub fn button_color(button: ButtonId) -> Color {
    PALETTE[button.index()]
}

/// Places the four buttons in a cross around the screen center.
///
/// Buttons appear left, up, right and down in [`ButtonId::ALL`] order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ButtonLayout {
    /// Distance from the center to each button.
    pub spacing: f32,
    /// Radius of an unlit button.
    pub radius: f32,
}

impl ButtonLayout {
    /// Creates a layout from spacing and radius in pixels.
    #[must_use]
    pub const fn new(spacing: f32, radius: f32) -> Self {
        Self { spacing, radius }
    }

    /// Screen position of `button` for a board centered at `center`.
    #[must_use]
    pub fn position(&self, button: ButtonId, center: Vec2) -> Vec2 {
        let direction = match button.index() {
            0 => Vec2::NEG_X,
            1 => Vec2::NEG_Y,
            2 => Vec2::X,
            _ => Vec2::Y,
        };
        center + direction * self.spacing
    }

    /// Vertical extent of the board around its center.
    #[must_use]
    pub fn half_height(&self) -> f32 {
        self.spacing + self.radius * LIT_GROWTH
    }
}

impl Default for ButtonLayout {
    fn default() -> Self {
        Self::new(100.0, 50.0)
    }
}

/// Animated appearance of one button.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ButtonVisual {
    /// Fill color.
    pub color: Color,
    /// Radius as a multiple of the layout radius.
    pub scale: f32,
}

impl ButtonVisual {
    /// Appearance the button settles at for the given lit flag.
    #[must_use]
    pub fn target(button: ButtonId, lit: bool) -> Self {
        let color = button_color(button);
        if lit {
            Self {
                color,
                scale: LIT_GROWTH,
            }
        } else {
            Self {
                color: color.lighten(UNLIT_TINT),
                scale: 1.0,
            }
        }
    }
}

/// Smoothed visuals for every button.
#[derive(Clone, Debug, PartialEq)]
pub struct ButtonVisuals {
    visuals: [ButtonVisual; BUTTON_COUNT],
    rate: f32,
}

impl ButtonVisuals {
    /// Approach rate used when none is configured, per second.
    pub const DEFAULT_RATE: f32 = 30.0;

    /// Creates unlit visuals that approach their targets at `rate` per second.
    #[must_use]
    pub fn new(rate: f32) -> Self {
        Self {
            visuals: ButtonId::ALL.map(|button| ButtonVisual::target(button, false)),
            rate,
        }
    }

    /// Current appearance of `button`.
    #[must_use]
    pub fn get(&self, button: ButtonId) -> ButtonVisual {
        self.visuals[button.index()]
    }

    /// Moves every visual towards the target for its lit flag.
    pub fn update(&mut self, lit: [bool; BUTTON_COUNT], dt: Duration) {
        let t = 1.0 - (-self.rate * dt.as_secs_f32()).exp();
        for button in ButtonId::ALL {
            let target = ButtonVisual::target(button, lit[button.index()]);
            let visual = &mut self.visuals[button.index()];
            visual.color = visual.color.lerp(target.color, t);
            visual.scale = lerp(visual.scale, target.scale, t);
        }
    }
}

impl Default for ButtonVisuals {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RATE)
    }
}

/// Message drawn above the board while in a menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Banner {
    /// Waiting for the first run.
    Start,
    /// A run has just been lost.
    GameOver {
        /// Score the lost run ended with.
        score: u32,
    },
}

impl Banner {
    /// Lines of text to draw, top to bottom.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Start => vec![MENU_BANNER.to_owned()],
            Self::GameOver { score } => vec![
                GAME_OVER_BANNER.to_owned(),
                format!("Score: {score}"),
                MENU_BANNER.to_owned(),
            ],
        }
    }
}

/// Everything a backend needs to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Button placement.
    pub layout: ButtonLayout,
    /// Smoothed button appearance.
    pub visuals: ButtonVisuals,
    /// Menu banner, if any.
    pub banner: Option<Banner>,
    /// Score of the active run.
    pub score: u32,
    /// Best score reached so far.
    pub best_score: u32,
}

impl Scene {
    /// Creates an empty scene using `layout`.
    #[must_use]
    pub fn new(layout: ButtonLayout) -> Self {
        Self {
            layout,
            visuals: ButtonVisuals::default(),
            banner: Some(Banner::Start),
            score: 0,
            best_score: 0,
        }
    }

    /// Status line drawn in the corner.
    #[must_use]
    pub fn status_line(&self) -> String {
        format!("Score: {}   Best: {}", self.score, self.best_score)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(ButtonLayout::default())
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Whether the backend keeps running after the current frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Present the frame and continue.
    Continue,
    /// Present the frame, then shut down.
    Exit,
}

/// Rendering backend capable of presenting Simon scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until the update closure asks it to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// raw device state sampled by the adapter, and may mutate the scene
    /// before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &RawInput, &mut Scene) -> FrameControl + 'static;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lighten_moves_towards_white() {
        let color = Color::from_rgb_u8(0, 0, 0).lighten(0.5);
        assert_eq!(color, Color::new(0.5, 0.5, 0.5, 1.0));
        let clamped = Color::from_rgb_u8(10, 20, 30).lighten(2.0);
        assert!((clamped.red - 1.0).abs() < f32::EPSILON);
        assert!((clamped.blue - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn layout_places_buttons_in_a_cross() {
        let layout = ButtonLayout::default();
        let center = Vec2::new(400.0, 300.0);
        let positions = ButtonId::ALL.map(|button| layout.position(button, center));
        assert_eq!(
            positions,
            [
                Vec2::new(300.0, 300.0),
                Vec2::new(400.0, 200.0),
                Vec2::new(500.0, 300.0),
                Vec2::new(400.0, 400.0),
            ]
        );
    }

    #[test]
    fn visuals_converge_on_lit_target() {
        let mut visuals = ButtonVisuals::default();
        let lit = [false, true, false, false];
        let button = ButtonId::ALL[1];

        visuals.update(lit, Duration::from_millis(16));
        let early = visuals.get(button);
        assert!(early.scale > 1.0 && early.scale < LIT_GROWTH);

        for _ in 0..120 {
            visuals.update(lit, Duration::from_millis(16));
        }
        let settled = visuals.get(button);
        assert!((settled.scale - LIT_GROWTH).abs() < 1e-3);
        assert!((settled.color.red - button_color(button).red).abs() < 1e-3);
        assert_eq!(visuals.get(ButtonId::ALL[0]), ButtonVisual::target(ButtonId::ALL[0], false));
    }

    #[test]
    fn zero_frame_time_leaves_visuals_unchanged() {
        let mut visuals = ButtonVisuals::default();
        let before = visuals.clone();
        visuals.update([true; BUTTON_COUNT], Duration::ZERO);
        assert_eq!(visuals, before);
    }

    #[test]
    fn game_over_banner_reports_last_score() {
        let lines = Banner::GameOver { score: 12 }.lines();
        assert_eq!(lines[0], GAME_OVER_BANNER);
        assert!(lines.contains(&"Score: 12".to_owned()));
        assert_eq!(Banner::Start.lines(), vec![MENU_BANNER.to_owned()]);
    }
}
