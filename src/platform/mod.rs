//! Platform-specific helpers.
//! This module hides OS differences (Unix/Windows) behind a uniform API so
//! the rest of the codebase can remain platform-agnostic.

use std::fs::File;
use std::io;

use fs2::FileExt;

use crate::fs_ops::policy::{LockDescriptor, LockType};

#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use unix::{file_id, mode_bits, open_log_file_secure_append, set_create_mode, set_exact_mode, try_lock};

#[cfg(not(unix))]
pub use windows::{file_id, mode_bits, open_log_file_secure_append, set_create_mode, set_exact_mode, try_lock};

/// Whole-file, non-blocking lock through fs2 (flock on Unix, LockFileEx on Windows).
/// Contention is normalized to `io::ErrorKind::WouldBlock`.
fn try_lock_whole_file(file: &File, lock: &LockDescriptor) -> io::Result<()> {
    debug_assert!(lock.is_whole_file(), "fs2 locks cannot express byte ranges");
    let res = match lock.lock_type {
        LockType::Shared => FileExt::try_lock_shared(file),
        LockType::Exclusive => FileExt::try_lock_exclusive(file),
    };
    res.map_err(|e| {
        if e.kind() == io::ErrorKind::WouldBlock
            || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
        {
            io::Error::new(io::ErrorKind::WouldBlock, e)
        } else {
            e
        }
    })
}
