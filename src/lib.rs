//! Core library for `locked_fio`.
//!
//! Advisory-locked file operations for processes that share paths:
//! - reads take a shared lock, writes an exclusive one, both without waiting;
//! - a failed write removes the partial destination instead of leaving it behind;
//! - copy/move hold the source and destination locks for the whole transfer.
//!
//! Start from [`Fio`]; the `must` module offers panicking wrappers.

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs_api;
pub mod fs_ops;
pub mod must;
pub mod output;
pub mod platform;
pub mod shutdown;

pub use config::{Config, LogLevel, default_config_path, path_has_symlink_ancestor};
pub use errors::{FioError, FioErrorKind, Phase};
pub use fs_api::{DEFAULT_MODE, FileStat, FileSystem, OpenRequest, Opened, OsFileSystem};
pub use fs_ops::{AccessIntent, Fio, LockDescriptor, LockType, LockedFile, lock_type_for};
pub use must::OrAbort;
