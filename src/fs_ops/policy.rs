//! Lock policy: which advisory lock an open intent requires.
//!
//! - ReadOnly  -> Shared
//! - WriteOnly -> Exclusive
//! - ReadWrite -> Exclusive
//!
//! Descriptors always cover the whole file (offset 0, unbounded length) and are
//! built fresh for every acquisition.

use std::fmt;

use crate::errors::FioError;

/// How a file is being opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessIntent {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessIntent {
    /// Reduce read/write booleans to exactly one intent.
    pub fn from_rw(read: bool, write: bool) -> Result<Self, FioError> {
        match (read, write) {
            (true, false) => Ok(AccessIntent::ReadOnly),
            (false, true) => Ok(AccessIntent::WriteOnly),
            (true, true) => Ok(AccessIntent::ReadWrite),
            (false, false) => Err(FioError::InvalidAccessMode(0)),
        }
    }

    /// Derive the intent from raw `open(2)` flags (`O_RDONLY`/`O_WRONLY`/`O_RDWR`).
    #[cfg(unix)]
    pub fn from_open_flags(flags: libc::c_int) -> Result<Self, FioError> {
        match flags & libc::O_ACCMODE {
            libc::O_RDONLY => Ok(AccessIntent::ReadOnly),
            libc::O_WRONLY => Ok(AccessIntent::WriteOnly),
            libc::O_RDWR => Ok(AccessIntent::ReadWrite),
            _ => Err(FioError::InvalidAccessMode(flags)),
        }
    }

    pub fn reads(self) -> bool {
        matches!(self, AccessIntent::ReadOnly | AccessIntent::ReadWrite)
    }

    pub fn writes(self) -> bool {
        matches!(self, AccessIntent::WriteOnly | AccessIntent::ReadWrite)
    }
}

/// Advisory lock flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockType {
    /// Read lock; any number of holders.
    Shared,
    /// Write lock; excludes every other holder.
    Exclusive,
}

impl fmt::Display for LockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockType::Shared => f.write_str("read"),
            LockType::Exclusive => f.write_str("write"),
        }
    }
}

#[inline]
pub fn lock_type_for(intent: AccessIntent) -> LockType {
    match intent {
        AccessIntent::ReadOnly => LockType::Shared,
        AccessIntent::WriteOnly | AccessIntent::ReadWrite => LockType::Exclusive,
    }
}

/// A lock request over a byte range. `len == 0` means "to end of file, unbounded".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockDescriptor {
    pub lock_type: LockType,
    pub start: u64,
    pub len: u64,
}

impl LockDescriptor {
    pub fn whole_file(lock_type: LockType) -> Self {
        Self {
            lock_type,
            start: 0,
            len: 0,
        }
    }

    pub fn for_intent(intent: AccessIntent) -> Self {
        Self::whole_file(lock_type_for(intent))
    }

    pub fn is_whole_file(&self) -> bool {
        self.start == 0 && self.len == 0
    }
}
