//! TOML configuration file support.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use simon_rendering::{ButtonLayout, ButtonVisuals};
use simon_system_input::InputMapping;

/// Settings read from the optional configuration file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    /// Bindings for every game action.
    pub(crate) input: InputMapping,
    /// Placement and animation of the board.
    pub(crate) board: BoardConfig,
}

/// Board geometry in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct BoardConfig {
    pub(crate) spacing: f32,
    pub(crate) radius: f32,
    /// Rate at which button visuals approach their target, per second.
    pub(crate) smoothing: f32,
}

impl BoardConfig {
    pub(crate) fn layout(&self) -> ButtonLayout {
        ButtonLayout::new(self.spacing, self.radius)
    }

    pub(crate) fn visuals(&self) -> ButtonVisuals {
        ButtonVisuals::new(self.smoothing)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        let layout = ButtonLayout::default();
        Self {
            spacing: layout.spacing,
            radius: layout.radius,
            smoothing: ButtonVisuals::DEFAULT_RATE,
        }
    }
}

impl FileConfig {
    /// Loads the configuration at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.input.validate()?;
        if config.board.radius <= 0.0 || config.board.spacing <= 0.0 {
            anyhow::bail!("board spacing and radius must be positive");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simon_core::{Key, PadButton};
    use simon_system_input::{Binding, MappingError};
    use std::io::Write;

    #[test]
    fn missing_path_uses_defaults() {
        let config = FileConfig::load(None).expect("defaults");
        assert_eq!(config, FileConfig::default());
        assert_eq!(config.board.layout(), ButtonLayout::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let config = FileConfig::parse(
            r#"
            [input]
            exit_keys = ["escape", "s"]

            [board]
            radius = 70.0
            "#,
        )
        .expect("valid config");

        assert_eq!(config.input.exit_keys, vec![Key::Escape, Key::S]);
        assert_eq!(config.input.exit_chord, vec![PadButton::Select]);
        assert_eq!(config.board.radius, 70.0);
        assert_eq!(config.board.spacing, ButtonLayout::default().spacing);
    }

    #[test]
    fn unbound_button_aborts_loading() {
        let error = FileConfig::parse(
            r#"
            [input]
            buttons = [[{ kind = "key", key = "a" }], [], [], []]
            "#,
        )
        .expect_err("unbound buttons must be rejected");

        assert_eq!(
            error.downcast_ref::<MappingError>(),
            Some(&MappingError::UnboundButton { button: 1 })
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::parse("[window]\nwidth = 3\n").is_err());
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "[input]\nstart = [{{ kind = \"pad\", button = \"start\" }}]"
        )
        .expect("write config");

        let config = FileConfig::load(Some(file.path())).expect("valid config");
        assert_eq!(
            config.input.start,
            vec![Binding::Pad {
                button: PadButton::Start
            }]
        );
    }
}
