//! YAML configuration for the viewer binary.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::color::{Palette, parse_hex};
use crate::error::Error;

/// Top-level viewer configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Configuration {
    /// Clear color behind the image, `#RRGGBB`.
    #[serde(default = "Configuration::default_background")]
    pub background: String,

    /// First transparency-grid color; defaults to the background.
    #[serde(default)]
    pub grid0: Option<String>,

    /// Second transparency-grid color; defaults to `grid0`.
    #[serde(default)]
    pub grid1: Option<String>,

    #[serde(default)]
    pub window: WindowOptions,

    /// Image to open at startup.
    #[serde(default)]
    pub image: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct WindowOptions {
    #[serde(default = "WindowOptions::default_title")]
    pub title: String,

    #[serde(default = "WindowOptions::default_width")]
    pub width: u32,

    #[serde(default = "WindowOptions::default_height")]
    pub height: u32,
}

impl WindowOptions {
    fn default_title() -> String {
        "rasterview".to_owned()
    }

    const fn default_width() -> u32 {
        1280
    }

    const fn default_height() -> u32 {
        800
    }
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
            width: Self::default_width(),
            height: Self::default_height(),
        }
    }
}

impl Configuration {
    fn default_background() -> String {
        "#FFFFFF".to_owned()
    }

    /// Validate color syntax and window dimensions.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] describing the first offending field.
    pub fn validate(&self) -> Result<(), Error> {
        for (field, value) in [
            ("background", Some(&self.background)),
            ("grid0", self.grid0.as_ref()),
            ("grid1", self.grid1.as_ref()),
        ] {
            if let Some(hex) = value
                && parse_hex(hex).is_none()
            {
                return Err(Error::InvalidConfig(format!(
                    "{field}: `{hex}` is not a #RRGGBB color"
                )));
            }
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(Error::InvalidConfig(
                "window dimensions must be at least 1x1".to_owned(),
            ));
        }
        Ok(())
    }

    /// Resolved background and grid colors.
    #[must_use]
    pub fn palette(&self) -> Palette {
        Palette::from_hex(
            &self.background,
            self.grid0.as_deref(),
            self.grid1.as_deref(),
        )
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            background: Self::default_background(),
            grid0: None,
            grid1: None,
            window: WindowOptions::default(),
            image: None,
        }
    }
}

/// Load a [`Configuration`] from a YAML file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn from_yaml_file(path: &Path) -> Result<Configuration, Error> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&text)?)
}
