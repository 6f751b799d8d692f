//! Filesystem abstraction.
//!
//! The primitive operations the locking core needs, behind one trait so the core
//! can be exercised without touching a real filesystem:
//! - open-with-flags, advisory-lock-a-handle, truncate, remove, stat (and rename).
//!
//! Contract:
//! - No operation retries internally; retry policy belongs to callers.
//! - `open` never truncates. `OpenRequest::truncate` is applied by the caller through
//!   `truncate` once the handle holds its lock.
//! - `lock` never blocks. Contention is reported as `io::ErrorKind::WouldBlock`.
//! - `remove`/`stat` report a missing path as `io::ErrorKind::NotFound`.
//!
//! `OsFileSystem` is the production implementation. `MockFileSystem` (test builds or
//! the `test-helpers` feature) is an in-memory double with a lock table and an event journal.

use std::io::{self, Read, Write};
use std::path::Path;

use crate::errors::FioError;
use crate::fs_ops::policy::{AccessIntent, LockDescriptor};

#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;
mod os;

pub use os::OsFileSystem;

/// Mode used for newly created files when the caller does not pass one.
pub const DEFAULT_MODE: u32 = 0o660;

/// Highest permission value accepted (rwx for u/g/o plus setuid/setgid/sticky).
pub const MAX_MODE: u32 = 0o7777;

/// Everything `FileSystem::open` needs to know about how to open a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenRequest {
    pub intent: AccessIntent,
    pub create: bool,
    pub truncate: bool,
    pub mode: u32,
}

impl OpenRequest {
    pub fn new(intent: AccessIntent) -> Self {
        Self {
            intent,
            create: false,
            truncate: false,
            mode: DEFAULT_MODE,
        }
    }

    pub fn read_only() -> Self {
        Self::new(AccessIntent::ReadOnly)
    }

    /// Write-only, create if missing, truncate if present.
    pub fn create_truncate(mode: u32) -> Self {
        Self {
            intent: AccessIntent::WriteOnly,
            create: true,
            truncate: true,
            mode,
        }
    }

    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    pub fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Build a request from raw `open(2)` flags, e.g. `O_WRONLY | O_CREAT | O_TRUNC`.
    #[cfg(unix)]
    pub fn from_open_flags(flags: libc::c_int, mode: u32) -> Result<Self, FioError> {
        Ok(Self {
            intent: AccessIntent::from_open_flags(flags)?,
            create: flags & libc::O_CREAT != 0,
            truncate: flags & libc::O_TRUNC != 0,
            mode,
        })
    }

    /// Reject requests no implementation can honour.
    pub fn validate(&self, path: &Path) -> Result<(), FioError> {
        if path.as_os_str().is_empty() {
            return Err(FioError::InvalidRequest {
                path: path.to_path_buf(),
                reason: "path is empty".into(),
            });
        }
        if self.mode > MAX_MODE {
            return Err(FioError::InvalidRequest {
                path: path.to_path_buf(),
                reason: format!("permission bits {:#o} out of range", self.mode),
            });
        }
        if self.truncate && !self.intent.writes() {
            return Err(FioError::InvalidRequest {
                path: path.to_path_buf(),
                reason: "truncate requires write access".into(),
            });
        }
        Ok(())
    }
}

/// The subset of metadata the core relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    /// Permission bits (`0o7777` mask on Unix).
    pub mode: u32,
    pub is_file: bool,
    /// Device and inode where the platform exposes them.
    pub id: Option<(u64, u64)>,
}

impl FileStat {
    /// True when both stats name the same underlying file. Unknown identities never match.
    pub fn same_file(&self, other: &FileStat) -> bool {
        matches!((self.id, other.id), (Some(a), Some(b)) if a == b)
    }
}

/// Result of `FileSystem::open`.
#[derive(Debug)]
pub struct Opened<H> {
    pub handle: H,
    /// This call created the file.
    pub created: bool,
}

/// Swappable boundary around the OS primitives.
pub trait FileSystem {
    /// An open file. Dropping it closes it and releases any advisory lock it holds.
    type Handle: Read + Write;

    fn open(&self, path: &Path, req: &OpenRequest) -> io::Result<Opened<Self::Handle>>;

    /// Try to attach an advisory lock to `handle`. Must not block.
    fn lock(&self, handle: &Self::Handle, lock: &LockDescriptor) -> io::Result<()>;

    /// Cut the file behind `handle` to zero length.
    fn truncate(&self, handle: &Self::Handle) -> io::Result<()>;

    fn remove(&self, path: &Path) -> io::Result<()>;

    fn stat(&self, path: &Path) -> io::Result<FileStat>;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}
