use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "gfkcoach.toml";

/// Runtime configuration, loaded once at startup and injected into the
/// pipeline. Nothing past `load()` reads the process environment.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CoachConfig {
    #[serde(skip)]
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub port: u16,
    pub daily_quota: u32,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_output_tokens: 800,
            port: 8787,
            daily_quota: 20,
        }
    }
}

impl CoachConfig {
    pub fn load() -> Result<Self> {
        let mut config = if Path::new(CONFIG_FILE).exists() {
            let raw = fs::read_to_string(CONFIG_FILE)
                .with_context(|| format!("Failed to read {}", CONFIG_FILE))?;
            toml::from_str(&raw).with_context(|| format!("Invalid {}", CONFIG_FILE))?
        } else {
            Self::default()
        };

        config.api_key = env::var("GFKCOACH_API_KEY")
            .context("CRITICAL: GFKCOACH_API_KEY not found in .env or environment")?;

        Ok(config)
    }
}
