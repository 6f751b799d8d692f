//! Windows implementations of platform helpers (best-effort, minimal ACL awareness).
//!
//! Notes:
//! - Windows lacks POSIX mode semantics; permission bits map onto the READONLY attribute.
//! - Locks use LockFileEx with LOCKFILE_FAIL_IMMEDIATELY (via fs2). Unlike Unix these are
//!   enforced by the OS for other handles, which is stricter than advisory.

use std::fs::{File, Metadata, OpenOptions};
use std::io;
use std::path::Path;

use crate::fs_ops::policy::LockDescriptor;

/// Open log file for appending (best-effort; no symlink defense available via std on Windows).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// No-op on Windows; the mode is applied after creation instead.
pub fn set_create_mode(_opts: &mut OpenOptions, _mode: u32) {}

/// Map "no write bit for anyone" onto the READONLY attribute.
pub fn set_exact_mode(file: &File, mode: u32) -> io::Result<()> {
    let mut perms = file.metadata()?.permissions();
    perms.set_readonly(mode & 0o222 == 0);
    file.set_permissions(perms)
}

/// Synthesized POSIX-style bits: 0o444 for READONLY files, 0o666 otherwise.
pub fn mode_bits(meta: &Metadata) -> u32 {
    if meta.permissions().readonly() { 0o444 } else { 0o666 }
}

/// File index numbers are not exposed by stable std; callers fall back to comparing paths.
pub fn file_id(_meta: &Metadata) -> Option<(u64, u64)> {
    None
}

pub fn try_lock(file: &File, lock: &LockDescriptor) -> io::Result<()> {
    super::try_lock_whole_file(file, lock)
}
