use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::engine::engine::DEFAULT_TURN_LIMIT;
use crate::engine::responses::ResponseBanks;

pub const URL_ENV: &str = "GIFT_ORACLE_URL";
pub const LOCAL_ENV: &str = "GIFT_ORACLE_LOCAL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OracleMode {
    Remote { base_url: String },
    Local,
}

impl Default for OracleMode {
    fn default() -> Self {
        OracleMode::Remote {
            base_url: "http://localhost:8001/api".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub oracle: OracleMode,
    pub turn_limit: u32,
    pub poll_interval_ms: u64,
    pub reveal_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub ui_scale: f32,
    pub responses: ResponseBanks,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            oracle: OracleMode::default(),
            turn_limit: DEFAULT_TURN_LIMIT,
            poll_interval_ms: 2000,
            reveal_delay_ms: 2500,
            request_timeout_secs: 10,
            ui_scale: 1.0,
            responses: ResponseBanks::default(),
        }
    }
}

impl GameConfig {
    /// Applies `GIFT_ORACLE_URL` / `GIFT_ORACLE_LOCAL`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var(URL_ENV) {
            if !url.trim().is_empty() {
                self.oracle = OracleMode::Remote {
                    base_url: url.trim().to_string(),
                };
            }
        }
        if env::var(LOCAL_ENV).is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true")) {
            self.oracle = OracleMode::Local;
        }
        self
    }
}

pub fn config_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("gift_oracle");
    path.push("config.json");
    path
}

/// Missing file means defaults; a broken one is reported and replaced by
/// defaults for this run.
pub fn load_config() -> GameConfig {
    let path = config_path();
    let Ok(text) = fs::read_to_string(&path) else {
        return GameConfig::default();
    };
    match serde_json::from_str(&text) {
        Ok(config) => config,
        Err(err) => {
            warn!("ignoring malformed config {}: {err}", path.display());
            GameConfig::default()
        }
    }
}

pub fn save_config(config: &GameConfig) -> Result<()> {
    let path = config_path();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
