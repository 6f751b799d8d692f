//! XML configuration support (quick_xml + serde).
//!
//! Notes:
//! - Every field is optional; missing fields keep their defaults.
//! - Unknown fields are an error, so typos surface instead of being ignored.
//! - A missing file at the default location means "use defaults". A missing file named
//!   by `$LOCKED_FIO_CONFIG` is an error.

use anyhow::{Context, Result, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::paths::{config_path_is_explicit, resolve_config_path};
use super::types::{Config, LogLevel, parse_mode};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    log_level: Option<String>,
    log_file: Option<String>,
    json: Option<bool>,
    default_mode: Option<String>,
    log_operations: Option<bool>,
}

fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(s) = parsed.log_level.as_deref() {
        cfg.log_level = s.parse::<LogLevel>().map_err(anyhow::Error::msg)?;
    }
    if let Some(s) = parsed.log_file.as_deref() {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            cfg.log_file = Some(PathBuf::from(trimmed));
        }
    }
    if let Some(s) = parsed.default_mode.as_deref() {
        cfg.default_mode = parse_mode(s).map_err(anyhow::Error::msg)?;
    }
    cfg.json = parsed.json.unwrap_or(cfg.json);
    cfg.log_operations = parsed.log_operations.unwrap_or(cfg.log_operations);
    Ok(cfg)
}

/// Parse config XML text.
pub fn parse_config(contents: &str) -> Result<Config> {
    let parsed: XmlConfig = if contents.trim().is_empty() {
        XmlConfig::default()
    } else {
        from_xml_str(contents)?
    };
    xml_to_config(parsed)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    parse_config(&contents).with_context(|| format!("parse config xml '{}'", path.display()))
}

/// Load the effective config file, or defaults when there is none.
pub fn load_config() -> Result<Config> {
    let Some(path) = resolve_config_path() else {
        debug!("no config directory available; using defaults");
        return Ok(Config::default());
    };
    if !path.exists() {
        if config_path_is_explicit() {
            bail!("config file '{}' does not exist", path.display());
        }
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(Config::default());
    }
    debug!(path = %path.display(), "loading config");
    load_config_from_xml_path(&path)
}
