use std::{fs, io::ErrorKind, path::Path};

use anyhow::Context;
use client_core::contract::{DEFAULT_CONTRACT_ADDRESS, REQUIRED_CHAIN_ID};
use serde::Deserialize;

pub const DEFAULT_SETTINGS_FILE: &str = "allowlist.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub contract_address: String,
    pub required_chain_id: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT_ADDRESS.into(),
            required_chain_id: REQUIRED_CHAIN_ID.0,
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    contract_address: Option<String>,
    required_chain_id: Option<u64>,
    log_filter: Option<String>,
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = Settings::default();
    apply_file(&mut settings, Path::new(DEFAULT_SETTINGS_FILE))?;
    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

/// Missing files are fine; unreadable or malformed ones are not.
fn apply_file(settings: &mut Settings, path: &Path) -> anyhow::Result<()> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
        Err(err) => {
            return Err(err).with_context(|| {
                format!("failed to read settings file '{}'", path.display())
            })
        }
    };
    let file_cfg: FileSettings = toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;

    if let Some(v) = file_cfg.contract_address {
        settings.contract_address = v;
    }
    if let Some(v) = file_cfg.required_chain_id {
        settings.required_chain_id = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("APP__CONTRACT_ADDRESS") {
        settings.contract_address = v;
    }
    if let Some(v) = var("APP__REQUIRED_CHAIN_ID") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.required_chain_id = parsed;
        }
    }
    if let Some(v) = var("RUST_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = var("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
