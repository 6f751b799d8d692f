//! Core configuration types.
//! - Config holds runtime settings for the binary with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::fs_api::{DEFAULT_MODE, MAX_MODE};

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// One line per completed operation (default)
    #[default]
    Normal,
    /// Adds lower-level diagnostics
    Info,
    /// Debug/trace, including every open/lock/close
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Parse permission bits written in octal: `640`, `0640` or `0o640`.
pub fn parse_mode(s: &str) -> Result<u32, String> {
    let t = s.trim();
    let digits = t.strip_prefix("0o").or_else(|| t.strip_prefix("0O")).unwrap_or(t);
    let mode = u32::from_str_radix(digits, 8).map_err(|_| format!("invalid octal mode: '{s}'"))?;
    if mode > MAX_MODE {
        return Err(format!("mode {mode:#o} out of range (max {MAX_MODE:#o})"));
    }
    Ok(mode)
}

/// Runtime configuration for the `locked_fio` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file (in addition to stderr)
    pub log_file: Option<PathBuf>,
    /// Structured JSON log lines
    pub json: bool,
    /// Mode for files created by `write`
    pub default_mode: u32,
    /// Emit the one-line summary after each committed operation
    pub log_operations: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Normal,
            log_file: None,
            json: false,
            default_mode: DEFAULT_MODE,
            log_operations: true,
        }
    }
}
