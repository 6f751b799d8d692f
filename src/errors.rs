//! Typed error definitions for locked_fio.
//! Every failure carries the path and the phase (stat/open/lock/...) it happened in,
//! so callers can diagnose without re-deriving call order.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::fs_ops::helpers::describe_io;
use crate::fs_ops::policy::LockType;

/// Step of an operation in which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Stat,
    Open,
    Lock,
    Truncate,
    Read,
    Copy,
    Remove,
    Rename,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Stat => "stat",
            Phase::Open => "open",
            Phase::Lock => "lock",
            Phase::Truncate => "truncate",
            Phase::Read => "read",
            Phase::Copy => "copy",
            Phase::Remove => "remove",
            Phase::Rename => "rename",
        };
        f.write_str(s)
    }
}

/// Coarse failure taxonomy, independent of which wrapper carried the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FioErrorKind {
    NotFound,
    PermissionDenied,
    LockUnavailable,
    IoFailure,
    InvalidInput,
    Other,
}

#[derive(Debug, Error)]
pub enum FioError {
    #[error("{phase} '{}': {}", .path.display(), describe_io(.source))]
    NotFound {
        path: PathBuf,
        phase: Phase,
        source: io::Error,
    },

    #[error("{phase} '{}': {}", .path.display(), describe_io(.source))]
    PermissionDenied {
        path: PathBuf,
        phase: Phase,
        source: io::Error,
    },

    #[error("open '{}': acquire {lock} lock: {}", .path.display(), describe_io(.source))]
    LockUnavailable {
        path: PathBuf,
        lock: LockType,
        source: io::Error,
    },

    #[error("{phase} '{}': {}", .path.display(), describe_io(.source))]
    Io {
        path: PathBuf,
        phase: Phase,
        source: io::Error,
    },

    #[error("{phase} '{}': {}", .path.display(), describe_io(.source))]
    Other {
        path: PathBuf,
        phase: Phase,
        source: io::Error,
    },

    #[error("acquire lock: bad access mode in flags {0:#o}")]
    InvalidAccessMode(i32),

    #[error("open '{}': {reason}", .path.display())]
    InvalidRequest { path: PathBuf, reason: String },

    /// The write failed and removing the partial destination failed too.
    #[error("{source}. Then: remove '{}': {}", .path.display(), describe_io(.cleanup))]
    Rollback {
        path: PathBuf,
        #[source]
        source: Box<FioError>,
        cleanup: io::Error,
    },

    #[error("{op} '{}' to '{}': {step}: {source}", .from.display(), .to.display())]
    Transfer {
        op: &'static str,
        from: PathBuf,
        to: PathBuf,
        step: &'static str,
        #[source]
        source: Box<FioError>,
    },
}

impl FioError {
    /// Classify an io::Error raised during `phase` on `path`.
    pub fn from_io(path: &Path, phase: Phase, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => FioError::NotFound { path, phase, source },
            io::ErrorKind::PermissionDenied => FioError::PermissionDenied { path, phase, source },
            _ => match phase {
                Phase::Truncate | Phase::Read | Phase::Copy => FioError::Io { path, phase, source },
                _ => FioError::Other { path, phase, source },
            },
        }
    }

    /// Classify a failed lock attempt. Contention is reported by the filesystem as WouldBlock.
    pub fn from_lock(path: &Path, lock: LockType, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::WouldBlock {
            FioError::LockUnavailable {
                path: path.to_path_buf(),
                lock,
                source,
            }
        } else {
            FioError::from_io(path, Phase::Lock, source)
        }
    }

    pub(crate) fn transfer(
        op: &'static str,
        from: &Path,
        to: &Path,
        step: &'static str,
    ) -> impl FnOnce(FioError) -> FioError {
        let from = from.to_path_buf();
        let to = to.to_path_buf();
        move |source| FioError::Transfer {
            op,
            from,
            to,
            step,
            source: Box::new(source),
        }
    }

    /// Failure kind, looking through rollback/transfer wrappers to the original cause.
    pub fn kind(&self) -> FioErrorKind {
        match self {
            FioError::NotFound { .. } => FioErrorKind::NotFound,
            FioError::PermissionDenied { .. } => FioErrorKind::PermissionDenied,
            FioError::LockUnavailable { .. } => FioErrorKind::LockUnavailable,
            FioError::Io { .. } => FioErrorKind::IoFailure,
            FioError::Other { .. } => FioErrorKind::Other,
            FioError::InvalidAccessMode(_) | FioError::InvalidRequest { .. } => {
                FioErrorKind::InvalidInput
            }
            FioError::Rollback { source, .. } | FioError::Transfer { source, .. } => source.kind(),
        }
    }

    /// Stable numeric code, used by the CLI as its exit status.
    pub fn code(&self) -> i32 {
        match self.kind() {
            FioErrorKind::NotFound => 2,
            FioErrorKind::PermissionDenied => 3,
            FioErrorKind::LockUnavailable => 4,
            FioErrorKind::IoFailure => 5,
            FioErrorKind::InvalidInput => 6,
            FioErrorKind::Other => 7,
        }
    }

    pub fn is_lock_unavailable(&self) -> bool {
        self.kind() == FioErrorKind::LockUnavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_io_kind_and_phase() {
        let p = Path::new("foo");
        let e = FioError::from_io(p, Phase::Open, io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(e.kind(), FioErrorKind::NotFound);

        let e = FioError::from_io(p, Phase::Open, io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(e.kind(), FioErrorKind::PermissionDenied);

        let e = FioError::from_io(p, Phase::Copy, io::Error::other("disk on fire"));
        assert_eq!(e.kind(), FioErrorKind::IoFailure);

        let e = FioError::from_io(p, Phase::Remove, io::Error::other("busy"));
        assert_eq!(e.kind(), FioErrorKind::Other);
    }

    #[test]
    fn would_block_on_lock_is_contention() {
        let p = Path::new("foo");
        let e = FioError::from_lock(p, LockType::Exclusive, io::Error::from(io::ErrorKind::WouldBlock));
        assert!(e.is_lock_unavailable());
        assert_eq!(e.code(), 4);

        let e = FioError::from_lock(p, LockType::Shared, io::Error::other("EBADF"));
        assert_eq!(e.kind(), FioErrorKind::Other);
    }

    #[test]
    fn wrappers_keep_original_kind_and_context() {
        let inner = FioError::from_lock(
            Path::new("bar"),
            LockType::Exclusive,
            io::Error::from(io::ErrorKind::WouldBlock),
        );
        let wrapped = FioError::transfer("copy", Path::new("foo"), Path::new("bar"), "write destination")(inner);
        assert!(wrapped.is_lock_unavailable());
        let msg = wrapped.to_string();
        assert!(msg.starts_with("copy 'foo' to 'bar': write destination: open 'bar'"), "{msg}");
    }

    #[test]
    fn rollback_reports_both_failures() {
        let original = FioError::from_io(Path::new("bar"), Phase::Copy, io::Error::other("short read"));
        let e = FioError::Rollback {
            path: PathBuf::from("bar"),
            source: Box::new(original),
            cleanup: io::Error::other("device busy"),
        };
        assert_eq!(e.kind(), FioErrorKind::IoFailure);
        let msg = e.to_string();
        assert!(msg.contains("short read"), "{msg}");
        assert!(msg.contains("Then: remove 'bar'"), "{msg}");
        assert!(msg.contains("device busy"), "{msg}");
    }
}
