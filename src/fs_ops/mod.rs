//! Locked file operations.
//!
//! `Fio` binds a `FileSystem` (the real one by default) and exposes the
//! top-level operations. Each successful read, write, copy, move, remove or
//! rename emits exactly one `info!` line once it has fully committed; failures
//! emit nothing at that level and are returned to the caller.

pub mod helpers;
pub mod locked;
pub mod policy;
pub mod transfer;
pub mod writer;

pub use locked::{LockedFile, open_locked};
pub use policy::{AccessIntent, LockDescriptor, LockType, lock_type_for};

use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::errors::FioError;
use crate::fs_api::{DEFAULT_MODE, FileSystem, OpenRequest, OsFileSystem};

/// Locked file I/O bound to one filesystem implementation.
#[derive(Debug, Clone)]
pub struct Fio<F: FileSystem = OsFileSystem> {
    fs: F,
    log_operations: bool,
    default_mode: u32,
}

impl Fio<OsFileSystem> {
    /// Operations against the host filesystem.
    pub fn new() -> Self {
        Self::with_fs(OsFileSystem)
    }
}

impl Default for Fio<OsFileSystem> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FileSystem> Fio<F> {
    pub fn with_fs(fs: F) -> Self {
        Self {
            fs,
            log_operations: true,
            default_mode: DEFAULT_MODE,
        }
    }

    /// Turn the per-operation `info!` lines on or off.
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.log_operations = enabled;
        self
    }

    /// Mode given to files created by `write_file`/`write_from_reader`.
    pub fn with_default_mode(mut self, mode: u32) -> Self {
        self.default_mode = mode;
        self
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    pub fn default_mode(&self) -> u32 {
        self.default_mode
    }

    fn committed(&self, msg: std::fmt::Arguments<'_>) {
        if self.log_operations {
            info!("{}", msg);
        }
    }

    /// Open `path` as described by `req` and take the matching advisory lock.
    /// The caller owns the handle; dropping or closing it releases the lock.
    pub fn open_file(&self, path: impl AsRef<Path>, req: &OpenRequest) -> Result<LockedFile<F::Handle>, FioError> {
        open_locked(&self.fs, path.as_ref(), req)
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, FioError> {
        let path = path.as_ref();
        let data = transfer::read_all(&self.fs, path)?;
        self.committed(format_args!("Read '{}'.", path.display()));
        Ok(data)
    }

    /// Replace the contents of `path` with `data`, creating it with the default mode.
    pub fn write_file(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<u64, FioError> {
        self.write_file_perm(path, data, self.default_mode)
    }

    pub fn write_file_perm(&self, path: impl AsRef<Path>, data: &[u8], mode: u32) -> Result<u64, FioError> {
        let mut reader = data;
        self.write_from_reader_perm(path, &mut reader, mode)
    }

    pub fn write_from_reader<R: Read + ?Sized>(&self, path: impl AsRef<Path>, reader: &mut R) -> Result<u64, FioError> {
        self.write_from_reader_perm(path, reader, self.default_mode)
    }

    /// Stream `reader` into `path`. On failure no partial file is left behind.
    pub fn write_from_reader_perm<R: Read + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        reader: &mut R,
        mode: u32,
    ) -> Result<u64, FioError> {
        let path = path.as_ref();
        let n = writer::write_into(&self.fs, path, reader, mode)?;
        self.committed(format_args!("Wrote '{}'.", path.display()));
        Ok(n)
    }

    pub fn copy_file(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<u64, FioError> {
        let (from, to) = (from.as_ref(), to.as_ref());
        let n = transfer::copy(&self.fs, from, to)?;
        self.committed(format_args!("Copied '{}' to '{}'.", from.display(), to.display()));
        Ok(n)
    }

    pub fn move_file(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<u64, FioError> {
        let (from, to) = (from.as_ref(), to.as_ref());
        let n = transfer::move_file(&self.fs, from, to)?;
        self.committed(format_args!("Moved '{}' to '{}'.", from.display(), to.display()));
        Ok(n)
    }

    /// Remove `path`. Returns `false` (and logs nothing) if it did not exist.
    pub fn remove_file(&self, path: impl AsRef<Path>) -> Result<bool, FioError> {
        let path = path.as_ref();
        let removed = transfer::remove(&self.fs, path)?;
        if removed {
            self.committed(format_args!("Removed '{}'.", path.display()));
        }
        Ok(removed)
    }

    pub fn rename_file(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<(), FioError> {
        let (from, to) = (from.as_ref(), to.as_ref());
        transfer::rename(&self.fs, from, to)?;
        self.committed(format_args!("Renamed '{}' to '{}'.", from.display(), to.display()));
        Ok(())
    }
}
