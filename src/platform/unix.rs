//! Unix implementations of platform helpers.
//!
//! Locking:
//! - Linux: open-file-description record locks (`F_OFD_SETLK`). Non-blocking, honour the
//!   descriptor's byte range, and belong to the open handle rather than the process, so two
//!   handles inside one process exclude each other just like two processes do.
//! - Other Unix targets (or kernels without OFD locks): `flock(LOCK_NB)` via fs2.

use std::fs::{self, File, Metadata, OpenOptions};
use std::io;
use std::os::unix::fs::{MetadataExt, OpenOptionsExt, PermissionsExt};
use std::path::Path;

use crate::fs_ops::policy::LockDescriptor;

/// Open log file for appending; set 0600 only when creating a new file.
/// If the file already exists, we preserve its existing permissions to avoid
/// clobbering administrator adjustments (e.g. group-readable for log shipping).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let existed = path.exists();
    let f = OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o600) // applies on create
        .open(path)?;
    if !existed {
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(f)
}

/// Mode passed to open(2) when the call creates the file.
pub fn set_create_mode(opts: &mut OpenOptions, mode: u32) {
    opts.mode(mode);
}

/// Apply `mode` exactly (fchmod), bypassing the process umask.
pub fn set_exact_mode(file: &File, mode: u32) -> io::Result<()> {
    file.set_permissions(fs::Permissions::from_mode(mode))
}

/// Permission bits of a file (setuid/setgid/sticky included).
pub fn mode_bits(meta: &Metadata) -> u32 {
    meta.permissions().mode() & 0o7777
}

/// Device and inode number; equal pairs mean the same file, hard links included.
pub fn file_id(meta: &Metadata) -> Option<(u64, u64)> {
    Some((meta.dev(), meta.ino()))
}

/// Non-blocking advisory lock over the descriptor's range.
#[cfg(target_os = "linux")]
pub fn try_lock(file: &File, lock: &LockDescriptor) -> io::Result<()> {
    use crate::fs_ops::policy::LockType;
    use std::os::fd::AsRawFd;

    // l_pid must stay 0 for OFD locks.
    let mut fl: libc::flock = unsafe { std::mem::zeroed() };
    fl.l_type = match lock.lock_type {
        LockType::Shared => libc::F_RDLCK,
        LockType::Exclusive => libc::F_WRLCK,
    } as libc::c_short;
    fl.l_whence = libc::SEEK_SET as libc::c_short;
    fl.l_start = lock.start as libc::off_t;
    fl.l_len = lock.len as libc::off_t;

    let rc = unsafe { libc::fcntl(file.as_raw_fd(), libc::F_OFD_SETLK, &fl as *const libc::flock) };
    if rc == 0 {
        return Ok(());
    }

    let err = io::Error::last_os_error();
    match err.raw_os_error() {
        Some(code) if code == libc::EAGAIN || code == libc::EACCES => {
            Err(io::Error::new(io::ErrorKind::WouldBlock, err))
        }
        // Kernels before 3.15 have no OFD locks.
        Some(code) if code == libc::EINVAL && lock.is_whole_file() => {
            tracing::debug!(error = %err, "F_OFD_SETLK unsupported; falling back to flock");
            super::try_lock_whole_file(file, lock)
        }
        _ => Err(err),
    }
}

#[cfg(not(target_os = "linux"))]
pub fn try_lock(file: &File, lock: &LockDescriptor) -> io::Result<()> {
    super::try_lock_whole_file(file, lock)
}
