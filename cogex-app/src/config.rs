use anyhow::{Context, Result};
use cogex_core::TaskKind;
use cogex_experiment::{NBackConfig, SessionConfig, StroopConfig};
use cogex_render::Colors;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub title: String,
    pub fullscreen: bool,
    /// Window size when not fullscreen.
    pub width: u32,
    pub height: u32,
    pub font_path: Option<PathBuf>,
    pub background: [u8; 3],
    pub foreground: [u8; 3],
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: "Cogex".to_string(),
            fullscreen: true,
            width: 1280,
            height: 720,
            font_path: None,
            background: [255, 255, 255],
            foreground: [0, 0, 0],
        }
    }
}

impl DisplayConfig {
    pub fn colors(&self) -> Colors {
        let [br, bg, bb] = self.background;
        let [fr, fg, fb] = self.foreground;
        Colors {
            background: [br, bg, bb, 255],
            foreground: [fr, fg, fb, 255],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub display: DisplayConfig,
    pub n_back: NBackConfig,
    pub stroop: StroopConfig,
    pub inter_trial_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            n_back: NBackConfig::default(),
            stroop: StroopConfig::default(),
            inter_trial_interval_ms: SessionConfig::default().inter_trial_interval_ms,
        }
    }
}

impl AppConfig {
    /// Defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn session_config(&self, task: TaskKind, trials: Option<usize>) -> SessionConfig {
        let configured = match task {
            TaskKind::NBack => self.n_back.trials,
            TaskKind::Stroop => self.stroop.trials,
        };
        SessionConfig {
            trial_count: trials.unwrap_or(configured),
            inter_trial_interval_ms: self.inter_trial_interval_ms,
        }
    }
}
