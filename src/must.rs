//! Abort-on-error wrappers for callers (scripts, tests, one-shot tools) that
//! prefer a panic carrying the full error message over handling `FioError`.
//!
//! The core never panics; everything here goes through `OrAbort`.

use std::io::Read;
use std::path::Path;

use crate::errors::FioError;
use crate::fs_ops::Fio;

pub trait OrAbort<T> {
    /// Unwrap the value or panic with the error's full message.
    fn or_abort(self) -> T;
}

impl<T> OrAbort<T> for Result<T, FioError> {
    #[track_caller]
    fn or_abort(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

#[track_caller]
pub fn read_file(path: impl AsRef<Path>) -> Vec<u8> {
    Fio::new().read_file(path).or_abort()
}

#[track_caller]
pub fn write_file(path: impl AsRef<Path>, data: &[u8]) -> u64 {
    Fio::new().write_file(path, data).or_abort()
}

#[track_caller]
pub fn write_file_perm(path: impl AsRef<Path>, data: &[u8], mode: u32) -> u64 {
    Fio::new().write_file_perm(path, data, mode).or_abort()
}

#[track_caller]
pub fn write_from_reader<R: Read + ?Sized>(path: impl AsRef<Path>, reader: &mut R) -> u64 {
    Fio::new().write_from_reader(path, reader).or_abort()
}

#[track_caller]
pub fn copy_file(from: impl AsRef<Path>, to: impl AsRef<Path>) -> u64 {
    Fio::new().copy_file(from, to).or_abort()
}

#[track_caller]
pub fn move_file(from: impl AsRef<Path>, to: impl AsRef<Path>) -> u64 {
    Fio::new().move_file(from, to).or_abort()
}

#[track_caller]
pub fn remove_file(path: impl AsRef<Path>) -> bool {
    Fio::new().remove_file(path).or_abort()
}
