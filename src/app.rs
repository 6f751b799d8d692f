//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the signal handler and
//! dispatches the subcommand to `Fio`.

use anyhow::{Context, Result, bail};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error};

use locked_fio::cli::{Args, Command};
use locked_fio::config::{CONFIG_ENV, load_config, resolve_config_path};
use locked_fio::output as out;
use locked_fio::{AccessIntent, Fio, FioError, OpenRequest, shutdown};

use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle --print-config before logging init
    if args.print_config {
        print_config_location();
        return Ok(());
    }

    let Some(command) = args.command.clone() else {
        bail!("no command given; see --help");
    };

    let mut cfg = load_config()?;
    args.apply_overrides(&mut cfg);

    // Initialize logging and capture the guard so we can drop it on signal
    let guard_opt = init_tracing(cfg.log_level, cfg.log_file.as_deref(), cfg.json)
        .context("initialize logging")?;

    // Guard needs to be dropped on SIGINT to flush logs
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; shutting down gracefully...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take(); // drop guard here to flush tracing_appender
            }
        })
        .context("install signal handler")?;
    }

    debug!(?args, ?cfg, "starting locked_fio");

    let fio = Fio::new()
        .with_logging(cfg.log_operations)
        .with_default_mode(cfg.default_mode);

    let result = dispatch(&fio, command);
    if let Err(e) = &result {
        match e.downcast_ref::<FioError>() {
            Some(fe) => error!(code = fe.code(), kind = ?fe.kind(), error = %fe, "operation failed"),
            None => error!(error = %format!("{e:#}"), "operation failed"),
        }
    }

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    result
}

fn dispatch(fio: &Fio, command: Command) -> Result<()> {
    match command {
        Command::Read { path } => {
            let data = fio.read_file(&path)?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(&data).context("write to stdout")?;
            stdout.flush().context("flush stdout")?;
        }
        Command::Write { path, mode, data } => {
            let mode = mode.unwrap_or(fio.default_mode());
            let n = match data {
                Some(text) => fio.write_file_perm(&path, text.as_bytes(), mode)?,
                None => fio.write_from_reader_perm(&path, &mut io::stdin().lock(), mode)?,
            };
            debug!(path = %path.display(), bytes = n, "write complete");
        }
        Command::Copy { from, to } => {
            fio.copy_file(&from, &to)?;
        }
        Command::Move { from, to } => {
            fio.move_file(&from, &to)?;
        }
        Command::Remove { path } => {
            if !fio.remove_file(&path)? {
                debug!(path = %path.display(), "nothing to remove");
            }
        }
        Command::Rename { from, to } => {
            fio.rename_file(&from, &to)?;
        }
        Command::Hold { path, shared, seconds } => {
            let req = if shared {
                OpenRequest::read_only()
            } else {
                OpenRequest::new(AccessIntent::ReadWrite)
                    .create(true)
                    .mode(fio.default_mode())
            };
            let held = fio.open_file(&path, &req)?;
            out::print_user(&format!("holding {} lock on '{}'", held.lock_type(), path.display()));
            let interrupted = shutdown::wait(seconds.map(Duration::from_secs));
            debug!(path = %path.display(), interrupted, "releasing lock");
            held.close();
        }
    }
    Ok(())
}

fn print_config_location() {
    if let Some(p) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        out::print_info(&format!("Using {CONFIG_ENV} (explicit):\n  {}", p.to_string_lossy()));
        return;
    }
    match resolve_config_path() {
        Some(p) => {
            out::print_info(&format!("Default locked_fio config path:\n  {}", p.display()));
            if p.exists() {
                out::print_info("A config file exists at that location.");
            } else {
                out::print_info("No config file exists there; built-in defaults are used.");
            }
        }
        None => out::print_error("Could not determine a default config path"),
    }
}
