//! CLI definition and parsing.
//! Defines Args (global flags + one subcommand per operation) and provides parse().
//!
//! Notes:
//! - --debug is a shorthand for --log-level debug and wins over it.
//! - Flags override the XML config; unset flags leave config values alone.

use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, LogLevel, parse_mode};

/// Advisory-locked file operations.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Read, write, copy and move files under advisory locks"
)]
pub struct Args {
    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        global = true,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(
        long,
        global = true,
        value_parser = clap::value_parser!(LogLevel),
        help = "Set log level: quiet, normal, info, debug"
    )]
    pub log_level: Option<LogLevel>,

    /// Emit logs in structured JSON.
    #[arg(long, global = true, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Also append logs to this file.
    #[arg(long, global = true, value_hint = ValueHint::FilePath, help = "Also append logs to this file")]
    pub log_file: Option<PathBuf>,

    /// Suppress the one-line summary printed after each completed operation.
    #[arg(long, global = true, help = "Do not log completed operations")]
    pub no_op_log: bool,

    /// Print where locked_fio will look for the config file, then exit.
    #[arg(long, help = "Print the config file location used by locked_fio and exit")]
    pub print_config: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print a file's contents to stdout (shared lock).
    Read {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
    },
    /// Replace a file's contents with --data or stdin (exclusive lock).
    Write {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
        /// Permission bits (octal) for a newly created file.
        #[arg(long, value_parser = parse_mode)]
        mode: Option<u32>,
        /// Literal content; stdin is read when absent.
        #[arg(long)]
        data: Option<String>,
    },
    /// Copy FROM to TO, keeping FROM's permission bits.
    Copy {
        #[arg(value_hint = ValueHint::FilePath)]
        from: PathBuf,
        #[arg(value_hint = ValueHint::FilePath)]
        to: PathBuf,
    },
    /// Copy FROM to TO, then remove FROM (works across filesystems).
    Move {
        #[arg(value_hint = ValueHint::FilePath)]
        from: PathBuf,
        #[arg(value_hint = ValueHint::FilePath)]
        to: PathBuf,
    },
    /// Remove a file; a missing file is not an error.
    Remove {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
    },
    /// Rename within one filesystem (no locks taken).
    Rename {
        #[arg(value_hint = ValueHint::FilePath)]
        from: PathBuf,
        #[arg(value_hint = ValueHint::FilePath)]
        to: PathBuf,
    },
    /// Take a lock and hold it until the time runs out or Ctrl-C.
    Hold {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
        /// Take a shared (read) lock instead of an exclusive one.
        #[arg(long)]
        shared: bool,
        /// Release after this many seconds (default: wait for Ctrl-C).
        #[arg(long)]
        seconds: Option<u64>,
    },
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(p) = &self.log_file {
            cfg.log_file = Some(p.clone());
        }
        if self.json {
            cfg.json = true;
        }
        if self.no_op_log {
            cfg.log_operations = false;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
