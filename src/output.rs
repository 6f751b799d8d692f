//! User-facing messages for the binary, separate from tracing logs.
//!
//! `info` lines go to stdout, `warn`/`error` to stderr. Colors are used only
//! when the target stream is a TTY. `read` writes raw file bytes to stdout, so it
//! must not print anything else there.

use owo_colors::OwoColorize;

fn stdout_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

fn stderr_tty() -> bool {
    atty::is(atty::Stream::Stderr)
}

fn prefixed(tag: &str, msg: &str, colored: Option<String>) -> String {
    format!("{} {msg}", colored.as_deref().unwrap_or(tag))
}

pub fn print_info(msg: &str) {
    let tag = stdout_tty().then(|| "info:".cyan().bold().to_string());
    println!("{}", prefixed("info:", msg, tag));
}

pub fn print_warn(msg: &str) {
    let tag = stderr_tty().then(|| "warn:".yellow().bold().to_string());
    eprintln!("{}", prefixed("warn:", msg, tag));
}

pub fn print_error(msg: &str) {
    let tag = stderr_tty().then(|| "error:".red().bold().to_string());
    eprintln!("{}", prefixed("error:", msg, tag));
}

/// Print a plain line (no prefix) that scripts may parse, such as the `hold` ready line.
pub fn print_user(msg: &str) {
    println!("{msg}");
}
