use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::assets::Assets;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub general: GeneralConfig,
    pub assets: Assets,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    /// Also write logs to a per-run file under `log_directory`
    #[serde(default)]
    pub save_logs: bool,
    /// Log tracked user actions (/start, /help, gender answers, text)
    #[serde(default = "default_enable_tracking")]
    pub enable_tracking: bool,
    /// Acknowledge stickers, animations, audio and voice messages
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            save_logs: false,
            enable_tracking: default_enable_tracking(),
            test_mode: false,
            log_directory: default_log_directory(),
        }
    }
}

fn default_enable_tracking() -> bool {
    true
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("logs")
}

impl Config {
    pub fn token(&self) -> &str {
        &self.telegram.bot_token
    }

    pub fn save_logs(&self) -> bool {
        self.general.save_logs
    }

    pub fn enable_tracking(&self) -> bool {
        self.general.enable_tracking
    }

    pub fn test_mode(&self) -> bool {
        self.general.test_mode
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::parse(&content)?;

        // Relative asset paths resolve against the working directory
        config.assets.validate()?;

        Ok(config)
    }

    /// Parse and check a config document without touching the filesystem.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;

        if config.telegram.bot_token.trim().is_empty() {
            anyhow::bail!("telegram.bot_token must not be empty");
        }

        Ok(config)
    }
}
