//! Locked-open primitive.
//!
//! Opens a path and claims the advisory lock matching the access intent
//! (read -> shared, write/read-write -> exclusive) on the resulting handle.
//!
//! Notes:
//! - Opening and locking are two separate steps, not one atomic one. A process that
//!   ignores the locking protocol can act on the file in between. Callers that need strict
//!   exclusion must coordinate above this layer (e.g. a separate lock file taken first).
//! - A truncate request is applied only after the lock is held, so a refused open never
//!   touches another holder's contents.
//! - A file created by this call is removed again if locking or truncation fails for any
//!   reason other than contention. A contended new file belongs to whoever locked it.
//! - The lock is never released explicitly: it lives exactly as long as the handle.
//!   Dropping (or `close`-ing) the `LockedFile` closes the descriptor and releases it.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

use super::policy::{AccessIntent, LockDescriptor, LockType};
use crate::errors::{FioError, Phase};
use crate::fs_api::{FileSystem, OpenRequest};

/// An open handle that holds its advisory lock.
///
/// Only exists in the "locked" state; `close` consumes it, so a closed handle
/// cannot be used again.
pub struct LockedFile<H> {
    handle: H,
    path: PathBuf,
    intent: AccessIntent,
    lock: LockDescriptor,
}

impl<H> LockedFile<H> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn intent(&self) -> AccessIntent {
        self.intent
    }

    pub fn lock_type(&self) -> LockType {
        self.lock.lock_type
    }

    pub fn get_ref(&self) -> &H {
        &self.handle
    }

    pub fn get_mut(&mut self) -> &mut H {
        &mut self.handle
    }

    /// Close the handle, releasing the lock.
    pub fn close(self) {
        trace!(path = %self.path.display(), lock = %self.lock.lock_type, "closing locked file");
        drop(self);
    }
}

impl<H: Read> Read for LockedFile<H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.handle.read(buf)
    }
}

impl<H: Write> Write for LockedFile<H> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.handle.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.handle.flush()
    }
}

/// Open `path` and try to take the matching lock without waiting.
///
/// On lock failure the freshly opened handle is closed before the error is returned.
/// `req.truncate` empties the file once the lock is held.
pub fn open_locked<F: FileSystem>(
    fs: &F,
    path: &Path,
    req: &OpenRequest,
) -> Result<LockedFile<F::Handle>, FioError> {
    req.validate(path)?;

    let opened = fs
        .open(path, req)
        .map_err(|e| FioError::from_io(path, Phase::Open, e))?;
    let (handle, created) = (opened.handle, opened.created);

    let lock = LockDescriptor::for_intent(req.intent);
    if let Err(e) = fs.lock(&handle, &lock) {
        drop(handle);
        trace!(path = %path.display(), lock = %lock.lock_type, error = %e, "lock not acquired; handle closed");
        if created && e.kind() != io::ErrorKind::WouldBlock {
            discard_created(fs, path);
        }
        return Err(FioError::from_lock(path, lock.lock_type, e));
    }
    trace!(path = %path.display(), lock = %lock.lock_type, "lock acquired");

    if req.truncate {
        if let Err(e) = fs.truncate(&handle) {
            drop(handle);
            if created {
                discard_created(fs, path);
            }
            return Err(FioError::from_io(path, Phase::Truncate, e));
        }
    }

    Ok(LockedFile {
        handle,
        path: path.to_path_buf(),
        intent: req.intent,
        lock,
    })
}

/// Best-effort removal of a file this call created but could not hand out.
fn discard_created<F: FileSystem>(fs: &F, path: &Path) {
    match fs.remove(path) {
        Ok(()) => trace!(path = %path.display(), "removed newly created file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "could not remove newly created file"),
    }
}
