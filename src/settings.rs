use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{RsvpError, RsvpResult};

/// Lowest accepted reading speed.
pub const MIN_WPM: u32 = 100;
/// Highest accepted reading speed.
pub const MAX_WPM: u32 = 1000;
/// Accepted values for [`ReaderSettings::wpm_jump_step`].
pub const WPM_JUMP_STEPS: [u32; 4] = [10, 25, 50, 100];

/// Font family class used for word frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Mono,
    Sans,
    Serif,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    #[default]
    Bold,
}

impl FontWeight {
    /// CSS-style numeric weight.
    pub fn value(self) -> u16 {
        match self {
            Self::Normal => 400,
            Self::Bold => 700,
        }
    }
}

/// Reader configuration, read once per tick by playback and once per export.
///
/// Bounds are enforced by [`ReaderSettings::validate`] at the configuration edge; the
/// timing code trusts whatever it is handed.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReaderSettings {
    /// Reading speed when the gradual ramp is off.
    pub wpm: u32,
    /// Interpolate speed from `initial_wpm` to `target_wpm` across the text.
    pub enable_gradual_increase: bool,
    pub initial_wpm: u32,
    pub target_wpm: u32,
    /// Granularity of interactive speed jumps.
    pub wpm_jump_step: u32,
    /// Opacity of the prefix and suffix around the focal char.
    pub side_opacity: f32,
    pub font: FontFamily,
    pub font_weight: FontWeight,
    /// Compact, distraction-free layout.
    pub zen_mode: bool,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            wpm: 300,
            enable_gradual_increase: false,
            initial_wpm: 200,
            target_wpm: 500,
            wpm_jump_step: 50,
            side_opacity: 0.9,
            font: FontFamily::Mono,
            font_weight: FontWeight::Bold,
            zen_mode: false,
        }
    }
}

impl ReaderSettings {
    /// Read settings from a JSON file; missing fields take their defaults.
    pub fn load_json(path: &Path) -> RsvpResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read settings '{}'", path.display()))?;
        let settings: Self = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse settings JSON '{}'", path.display()))?;
        Ok(settings)
    }

    /// Reject values outside their documented bounds.
    pub fn validate(&self) -> RsvpResult<()> {
        check_wpm("wpm", self.wpm)?;
        check_wpm("initial_wpm", self.initial_wpm)?;
        check_wpm("target_wpm", self.target_wpm)?;
        if !WPM_JUMP_STEPS.contains(&self.wpm_jump_step) {
            return Err(RsvpError::config(format!(
                "wpm_jump_step must be one of {WPM_JUMP_STEPS:?}, got {}",
                self.wpm_jump_step
            )));
        }
        if !(0.1..=1.0).contains(&self.side_opacity) {
            return Err(RsvpError::config(format!(
                "side_opacity must be in [0.1, 1.0], got {}",
                self.side_opacity
            )));
        }
        Ok(())
    }

    /// Speed used for labels and artifact names: the target speed when ramping.
    pub fn display_wpm(&self) -> u32 {
        if self.enable_gradual_increase {
            self.target_wpm
        } else {
            self.wpm
        }
    }

    /// Move `wpm` by `steps` jump steps, clamped to the accepted range.
    pub fn stepped_wpm(&self, steps: i32) -> u32 {
        let delta = i64::from(steps) * i64::from(self.wpm_jump_step);
        (i64::from(self.wpm) + delta).clamp(i64::from(MIN_WPM), i64::from(MAX_WPM)) as u32
    }
}

fn check_wpm(name: &str, value: u32) -> RsvpResult<()> {
    if !(MIN_WPM..=MAX_WPM).contains(&value) {
        return Err(RsvpError::config(format!(
            "{name} must be in [{MIN_WPM}, {MAX_WPM}], got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/settings.rs"]
mod tests;
