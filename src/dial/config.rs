use std::path::PathBuf;

use crate::dial::clock::ClockTime;
use crate::foundation::error::{DialError, DialResult};
use crate::paint::color::{Rgba, hex_to_rgba};

/// Dial output settings, loadable from JSON. Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DialConfig {
    /// Output width and height in pixels.
    pub size: u32,
    pub sunrise: ClockTime,
    pub sunset: ClockTime,
    /// Font file for the hour labels and time readout.
    pub font: Option<PathBuf>,
    /// Hex clear color; transparent when absent.
    pub background: Option<String>,
    /// Simulated seconds between consecutive frames.
    pub step_secs: u64,
}

impl Default for DialConfig {
    fn default() -> Self {
        Self {
            size: 400,
            sunrise: ClockTime::new(6, 38, 0).unwrap_or_default(),
            sunset: ClockTime::new(20, 10, 0).unwrap_or_default(),
            font: None,
            background: None,
            step_secs: 20,
        }
    }
}

impl DialConfig {
    pub fn from_json_str(s: &str) -> DialResult<Self> {
        let config: Self = serde_json::from_str(s)
            .map_err(|e| DialError::validation(format!("parse dial config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DialResult<()> {
        if self.size == 0 || self.size > u32::from(u16::MAX) {
            return Err(DialError::validation(format!(
                "dial size must be in 1..={}",
                u16::MAX
            )));
        }
        if self.step_secs == 0 {
            return Err(DialError::validation("step_secs must be > 0"));
        }
        self.background_color()?;
        Ok(())
    }

    pub fn background_color(&self) -> DialResult<Option<Rgba>> {
        self.background.as_deref().map(hex_to_rgba).transpose()
    }
}
