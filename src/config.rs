use std::path::Path;

use serde::Deserialize;

use crate::affordance::Rect;
use crate::layout;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub midi: MidiConfig,
    pub window: WindowConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MidiConfig {
    /// Substring of the output port name.
    pub port: String,
    /// 0-based MIDI channel.
    pub channel: u8,
}

impl Default for MidiConfig {
    fn default() -> Self {
        MidiConfig {
            port: "loopMIDI Port 1".to_string(),
            channel: 0,
        }
    }
}

/// Where the instrument window currently sits on screen.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        let r = layout::REFERENCE;
        WindowConfig {
            left: r.left,
            top: r.top,
            right: r.right,
            bottom: r.bottom,
        }
    }
}

impl WindowConfig {
    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.right, self.bottom)
    }
}

pub fn load(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.midi.channel > 15 {
            anyhow::bail!("MIDI channel must be 0-15, got {}", self.midi.channel);
        }
        let w = &self.window;
        let (Some(width), Some(height)) = (w.right.checked_sub(w.left), w.bottom.checked_sub(w.top))
        else {
            anyhow::bail!("Window rectangle {} is too large", w.rect());
        };
        if width <= 0 || height <= 0 {
            anyhow::bail!("Window rectangle {} is empty", w.rect());
        }
        Ok(())
    }
}
