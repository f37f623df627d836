use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use social::SocialConfig;
use std::env;
use std::path::Path;

pub const DECLINED_BLOCKS_VAR: &str = "FORUM_DECLINED_BLOCKS_REREQUEST";
pub const OUTPUT_FORMAT_VAR: &str = "FORUM_OUTPUT_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

impl OutputFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "yaml" => Some(OutputFormat::Yaml),
            _ => None,
        }
    }
}

/// Effective CLI settings, from the environment and an optional `.env`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub social: SocialConfig,
    pub output_format: OutputFormat,
}

impl Settings {
    /// Load settings, reading `.env` from the current directory first if present
    pub fn load() -> Result<Self> {
        let cwd = env::current_dir().context("Failed to get current directory")?;
        Self::load_from_dir(&cwd)
    }

    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let env_file = dir.join(".env");
        if env_file.exists() {
            dotenv::from_path(&env_file)
                .with_context(|| format!("Failed to read {}", env_file.display()))?;
        }
        Self::from_env()
    }

    pub fn from_env() -> Result<Self> {
        let declined_blocks_rerequest = match env::var(DECLINED_BLOCKS_VAR) {
            Ok(value) => parse_bool(&value)
                .ok_or_else(|| anyhow!("{} must be true or false, got '{}'", DECLINED_BLOCKS_VAR, value))?,
            Err(_) => false,
        };

        let output_format = match env::var(OUTPUT_FORMAT_VAR) {
            Ok(value) => OutputFormat::parse(&value).ok_or_else(|| {
                anyhow!("{} must be one of text, json, yaml, got '{}'", OUTPUT_FORMAT_VAR, value)
            })?,
            Err(_) => OutputFormat::Text,
        };

        Ok(Self {
            social: SocialConfig::new(declined_blocks_rerequest),
            output_format,
        })
    }

    /// The command-line flag wins over the configured default.
    pub fn format_or_default(&self, flag: Option<OutputFormat>) -> OutputFormat {
        flag.unwrap_or(self.output_format)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
