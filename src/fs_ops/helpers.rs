//! I/O helper utilities.
//!
//! Enriches io::Error text with actionable, platform-aware hints. Used by the
//! `FioError` Display impls so every surfaced failure reads the same way.
//!
//! Usage:
//!   format!("open '{}': {}", path.display(), describe_io(&err))

use std::io;

/// Hint for a raw OS error code, if we have one worth showing.
fn hint_for_code(code: i32) -> Option<&'static str> {
    #[cfg(unix)]
    {
        match code {
            libc::EACCES | libc::EPERM => {
                Some("permission denied; check ownership and write permissions")
            }
            libc::ENOENT => Some("path not found; verify it exists"),
            libc::EISDIR => Some("is a directory; only regular files are supported"),
            libc::EBUSY => Some("resource busy; ensure no other process is writing"),
            libc::ENOSPC => Some("insufficient space on device"),
            libc::EROFS => Some("read-only filesystem; cannot write here"),
            libc::ENAMETOOLONG => Some("filename or path too long; shorten path segments"),
            libc::EMFILE => Some("process file descriptor limit reached; close files or raise limits"),
            libc::ENOLCK => Some("no locks available; the filesystem may not support advisory locks"),
            libc::EXDEV => Some("cross-filesystem; use move instead of rename"),
            _ => None,
        }
    }
    #[cfg(windows)]
    {
        match code {
            5 => Some("access denied; check permissions"),             // ERROR_ACCESS_DENIED
            2 | 3 => Some("path not found; verify it exists"),         // FILE/PATH NOT FOUND
            17 => Some("not same device; use move instead of rename"), // ERROR_NOT_SAME_DEVICE
            32 => Some("sharing violation; file is in use"),           // ERROR_SHARING_VIOLATION
            33 => Some("region locked by another process"),            // ERROR_LOCK_VIOLATION
            112 => Some("insufficient disk space"),                    // ERROR_DISK_FULL
            _ => None,
        }
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = code;
        None
    }
}

/// Hint derived from the error kind when no OS code is attached.
fn hint_for_kind(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::PermissionDenied => {
            Some("permission denied; check ownership and write permissions")
        }
        io::ErrorKind::NotFound => Some("path not found; verify it exists"),
        io::ErrorKind::WouldBlock => {
            Some("held by another process; retry after it releases the lock")
        }
        _ => None,
    }
}

/// Render `e` with a hint and, when available, the raw OS code.
pub fn describe_io(e: &io::Error) -> String {
    let mut msg = e.to_string();

    match e.raw_os_error() {
        Some(code) => {
            if let Some(hint) = hint_for_code(code) {
                msg.push_str(&format!(" ({hint})"));
            }
            msg.push_str(&format!(" [os code: {code}]"));
        }
        None => {
            if let Some(hint) = hint_for_kind(e.kind()) {
                msg.push_str(&format!(" ({hint})"));
            }
        }
    }

    msg
}
