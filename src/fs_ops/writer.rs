//! Streaming writer with rollback.
//!
//! - Always creates-or-truncates the destination (never appends). Truncation happens only
//!   once the exclusive lock is held; a refused lock leaves the holder's bytes alone.
//! - Streams the whole reader into it, then closes the destination unconditionally.
//! - On any failure while streaming, removes the destination, so callers observe either
//!   the full content or no file at all.
//!
//! A destination that existed before the call has already been truncated by the time a
//! streaming failure can happen; it is removed too, never restored to its old bytes.

use std::io::{self, Read, Write};
use std::path::Path;
use tracing::{debug, warn};

use super::locked::open_locked;
use crate::errors::{FioError, Phase};
use crate::fs_api::{FileSystem, OpenRequest};

/// Write everything `reader` yields into `path`, creating it with `mode` if missing.
/// Returns the number of bytes written.
pub fn write_into<F, R>(fs: &F, path: &Path, reader: &mut R, mode: u32) -> Result<u64, FioError>
where
    F: FileSystem,
    R: Read + ?Sized,
{
    let mut dst = open_locked(fs, path, &OpenRequest::create_truncate(mode))?;

    let copied = io::copy(reader, &mut dst).and_then(|n| dst.flush().map(|()| n));
    dst.close();

    match copied {
        Ok(n) => Ok(n),
        Err(e) => {
            let err = FioError::from_io(path, Phase::Copy, e);
            debug!(path = %path.display(), error = %err, "write failed; removing partial destination");
            match fs.remove(path) {
                Ok(()) => Err(err),
                Err(rm) if rm.kind() == io::ErrorKind::NotFound => Err(err),
                Err(rm) => {
                    warn!(path = %path.display(), error = %rm, "could not remove partial destination");
                    Err(FioError::Rollback {
                        path: path.to_path_buf(),
                        source: Box::new(err),
                        cleanup: rm,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FioErrorKind;
    use crate::fs_api::mock::{Event, MockFileSystem};
    use crate::fs_ops::policy::{AccessIntent, LockType};

    /// Yields `ok` bytes, then fails.
    struct FailingReader {
        ok: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.ok == 0 {
                return Err(io::Error::other("source went away"));
            }
            let n = self.ok.min(buf.len());
            buf[..n].fill(b'x');
            self.ok -= n;
            Ok(n)
        }
    }

    #[test]
    fn writes_all_bytes_and_reports_count() {
        let fs = MockFileSystem::new();
        let n = write_into(&fs, Path::new("bar"), &mut &b"Hello World"[..], 0o660).unwrap();
        assert_eq!(n, 11);
        assert_eq!(fs.contents("bar").unwrap(), b"Hello World");
        assert_eq!(fs.mode_of("bar"), Some(0o660));
    }

    #[test]
    fn opens_exclusive_create_truncate_and_closes() {
        let fs = MockFileSystem::new().with_file("bar", b"old and longer contents", 0o600);
        write_into(&fs, Path::new("bar"), &mut &b"new"[..], 0o644).unwrap();

        assert_eq!(fs.contents("bar").unwrap(), b"new");
        // Existing file keeps its mode.
        assert_eq!(fs.mode_of("bar"), Some(0o600));
        let journal = fs.journal();
        assert_eq!(journal[0], Event::Open("bar".into(), AccessIntent::WriteOnly));
        assert_eq!(journal[1], Event::Lock("bar".into(), LockType::Exclusive));
        assert_eq!(journal[2], Event::Truncate("bar".into()));
        assert_eq!(journal.last(), Some(&Event::Close("bar".into())));
    }

    #[test]
    fn failing_reader_leaves_no_destination() {
        let fs = MockFileSystem::new();
        let err = write_into(&fs, Path::new("bar"), &mut FailingReader { ok: 5 }, 0o660).unwrap_err();
        assert_eq!(err.kind(), FioErrorKind::IoFailure);
        assert!(!fs.exists("bar"));

        let journal = fs.journal();
        let close = journal.iter().position(|e| *e == Event::Close("bar".into())).unwrap();
        let remove = journal.iter().position(|e| *e == Event::Remove("bar".into())).unwrap();
        assert!(close < remove, "destination must be closed before removal: {journal:?}");
    }

    #[test]
    fn failing_write_removes_truncated_existing_file() {
        let fs = MockFileSystem::new().with_file("bar", b"previous", 0o660);
        fs.fail_write_after("bar", 2);
        let err = write_into(&fs, Path::new("bar"), &mut &b"Hello World"[..], 0o660).unwrap_err();
        assert_eq!(err.kind(), FioErrorKind::IoFailure);
        assert!(!fs.exists("bar"), "truncated destination is removed, not restored");
    }

    #[test]
    fn cleanup_failure_is_merged_into_error() {
        let fs = MockFileSystem::new();
        fs.fail_remove("bar", io::ErrorKind::PermissionDenied);
        let err = write_into(&fs, Path::new("bar"), &mut FailingReader { ok: 0 }, 0o660).unwrap_err();

        assert!(matches!(err, FioError::Rollback { .. }), "{err:?}");
        assert_eq!(err.kind(), FioErrorKind::IoFailure);
        let msg = err.to_string();
        assert!(msg.contains("source went away"), "{msg}");
        assert!(msg.contains("Then: remove 'bar'"), "{msg}");
    }

    #[test]
    fn locked_destination_is_left_untouched_by_rollback() {
        let fs = MockFileSystem::new().with_file("bar", b"theirs", 0o660);
        let _held = open_locked(&fs, Path::new("bar"), &OpenRequest::new(AccessIntent::WriteOnly)).unwrap();

        let err = write_into(&fs, Path::new("bar"), &mut &b"mine"[..], 0o660).unwrap_err();
        assert_eq!(err.kind(), FioErrorKind::LockUnavailable);
        assert_eq!(fs.contents("bar").unwrap(), b"theirs");
        let journal = fs.journal();
        assert!(!journal.contains(&Event::Truncate("bar".into())), "{journal:?}");
        assert!(!journal.contains(&Event::Remove("bar".into())), "{journal:?}");
    }

    #[test]
    fn shared_holder_keeps_its_bytes() {
        let fs = MockFileSystem::new().with_file("bar", b"precious data", 0o660);
        let mut reader = open_locked(&fs, Path::new("bar"), &OpenRequest::read_only()).unwrap();

        assert!(write_into(&fs, Path::new("bar"), &mut &b"intruder"[..], 0o660).is_err());
        let mut seen = Vec::new();
        reader.read_to_end(&mut seen).unwrap();
        assert_eq!(seen, b"precious data");
    }
}
