//! Whole-file read, copy and move built on the locked-open primitive and the
//! streaming writer.
//!
//! Copy/move hold the source's shared lock and the destination's exclusive lock at
//! the same time, so no cooperating writer can change the source mid-copy and no
//! cooperating reader can observe a half-written destination.
//!
//! A destination that is the source itself (same path, or a hard link to it) is refused
//! before anything is opened.

use std::io::{self, Read};
use std::path::Path;

use super::locked::open_locked;
use super::writer::write_into;
use crate::errors::{FioError, Phase};
use crate::fs_api::{FileStat, FileSystem, OpenRequest};

/// Read the whole file under a shared lock.
pub fn read_all<F: FileSystem>(fs: &F, path: &Path) -> Result<Vec<u8>, FioError> {
    let mut src = open_locked(fs, path, &OpenRequest::read_only())?;
    let mut data = Vec::new();
    src.read_to_end(&mut data)
        .map_err(|e| FioError::from_io(path, Phase::Read, e))?;
    src.close();
    Ok(data)
}

/// Copy `from` to `to`, giving the destination the source's permission bits.
/// The destination is created or truncated. Returns the number of bytes copied.
pub fn copy<F: FileSystem>(fs: &F, from: &Path, to: &Path) -> Result<u64, FioError> {
    copy_with(fs, "copy", from, to, |_| Ok(()))
}

/// Copy `from` to `to`, then remove `from`.
///
/// Works across mounts, unlike a rename. Not atomic: if the final removal fails the
/// destination already holds a full copy, both files remain, and an error is returned.
pub fn move_file<F: FileSystem>(fs: &F, from: &Path, to: &Path) -> Result<u64, FioError> {
    copy_with(fs, "move", from, to, |fs| {
        fs.remove(from)
            .map_err(|e| FioError::from_io(from, Phase::Remove, e))
            .map_err(FioError::transfer("move", from, to, "remove source"))
    })
}

/// Shared body of copy/move. `finish` runs after the destination is complete,
/// while the source's shared lock is still held.
fn copy_with<F, G>(fs: &F, op: &'static str, from: &Path, to: &Path, finish: G) -> Result<u64, FioError>
where
    F: FileSystem,
    G: FnOnce(&F) -> Result<(), FioError>,
{
    let stat = fs
        .stat(from)
        .map_err(|e| FioError::from_io(from, Phase::Stat, e))
        .map_err(FioError::transfer(op, from, to, "stat source"))?;
    if !stat.is_file {
        return Err(FioError::transfer(op, from, to, "stat source")(FioError::InvalidRequest {
            path: from.to_path_buf(),
            reason: "not a regular file".into(),
        }));
    }

    if same_file(fs, &stat, from, to) {
        return Err(FioError::transfer(op, from, to, "check destination")(FioError::InvalidRequest {
            path: to.to_path_buf(),
            reason: "destination is the same file as the source".into(),
        }));
    }

    let mut src = open_locked(fs, from, &OpenRequest::read_only())
        .map_err(FioError::transfer(op, from, to, "open source"))?;

    let n = write_into(fs, to, &mut src, stat.mode)
        .map_err(FioError::transfer(op, from, to, "write destination"))?;

    finish(fs)?;
    src.close();
    Ok(n)
}

/// A destination that cannot be stat'ed (usually missing) is treated as distinct;
/// opening it reports any real problem.
fn same_file<F: FileSystem>(fs: &F, src: &FileStat, from: &Path, to: &Path) -> bool {
    from == to || fs.stat(to).is_ok_and(|dst| src.same_file(&dst))
}

/// Remove `path`. `Ok(false)` if it did not exist.
pub fn remove<F: FileSystem>(fs: &F, path: &Path) -> Result<bool, FioError> {
    match fs.remove(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(FioError::from_io(path, Phase::Remove, e)),
    }
}

/// Plain rename; no locks are taken. Fails across filesystems, use `move_file` there.
pub fn rename<F: FileSystem>(fs: &F, from: &Path, to: &Path) -> Result<(), FioError> {
    fs.rename(from, to)
        .map_err(|e| FioError::from_io(from, Phase::Rename, e))
        .map_err(FioError::transfer("rename", from, to, "rename"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FioErrorKind;
    use crate::fs_api::mock::{Event, MockFileSystem};
    use crate::fs_ops::policy::{AccessIntent, LockType};

    const SRC: &str = "foo";
    const DST: &str = "bar";
    const DATA: &[u8] = b"Hello World";

    fn fixture() -> MockFileSystem {
        MockFileSystem::new().with_file(SRC, DATA, 0o640)
    }

    fn pos(journal: &[Event], ev: &Event) -> usize {
        journal
            .iter()
            .position(|e| e == ev)
            .unwrap_or_else(|| panic!("{ev:?} not in {journal:?}"))
    }

    #[test]
    fn read_all_opens_locks_reads_closes() {
        let fs = fixture();
        let data = read_all(&fs, Path::new(SRC)).unwrap();
        assert_eq!(data, DATA);
        assert_eq!(
            fs.journal(),
            vec![
                Event::Open(SRC.into(), AccessIntent::ReadOnly),
                Event::Lock(SRC.into(), LockType::Shared),
                Event::Read(SRC.into()),
                Event::Close(SRC.into()),
            ]
        );
    }

    #[test]
    fn copy_call_order_and_postconditions() {
        let fs = fixture();
        let n = copy(&fs, Path::new(SRC), Path::new(DST)).unwrap();
        assert_eq!(n, DATA.len() as u64);
        assert_eq!(fs.contents(DST).unwrap(), DATA);
        assert_eq!(fs.mode_of(DST), Some(0o640));
        assert_eq!(fs.contents(SRC).unwrap(), DATA);

        let j = fs.journal();
        let stat = pos(&j, &Event::Stat(SRC.into()));
        let src_lock = pos(&j, &Event::Lock(SRC.into(), LockType::Shared));
        let dst_open = pos(&j, &Event::Open(DST.into(), AccessIntent::WriteOnly));
        let dst_lock = pos(&j, &Event::Lock(DST.into(), LockType::Exclusive));
        let read = pos(&j, &Event::Read(SRC.into()));
        let write = pos(&j, &Event::Write(DST.into()));
        let dst_close = pos(&j, &Event::Close(DST.into()));
        let src_close = pos(&j, &Event::Close(SRC.into()));

        assert!(stat < src_lock && src_lock < dst_open && dst_open < dst_lock);
        assert!(dst_lock < read && dst_lock < write);
        assert!(read < dst_close && write < dst_close);
        assert!(dst_close < src_close, "both locks held for the whole copy: {j:?}");
    }

    #[test]
    fn move_removes_source_before_releasing_its_lock() {
        let fs = fixture();
        let n = move_file(&fs, Path::new(SRC), Path::new(DST)).unwrap();
        assert_eq!(n, DATA.len() as u64);
        assert!(!fs.exists(SRC));
        assert_eq!(fs.contents(DST).unwrap(), DATA);

        let j = fs.journal();
        let dst_close = pos(&j, &Event::Close(DST.into()));
        let remove = pos(&j, &Event::Remove(SRC.into()));
        let src_close = pos(&j, &Event::Close(SRC.into()));
        assert!(dst_close < remove && remove < src_close, "{j:?}");
    }

    #[test]
    fn move_reports_failed_source_removal_but_keeps_copy() {
        let fs = fixture();
        fs.fail_remove(SRC, io::ErrorKind::PermissionDenied);
        let err = move_file(&fs, Path::new(SRC), Path::new(DST)).unwrap_err();

        assert_eq!(err.kind(), FioErrorKind::PermissionDenied);
        assert!(err.to_string().contains("remove source"), "{err}");
        assert!(fs.exists(SRC));
        assert_eq!(fs.contents(DST).unwrap(), DATA);
    }

    #[test]
    fn copy_of_missing_source_mentions_stat_step() {
        let fs = MockFileSystem::new();
        let err = copy(&fs, Path::new(SRC), Path::new(DST)).unwrap_err();
        assert_eq!(err.kind(), FioErrorKind::NotFound);
        assert!(err.to_string().starts_with("copy 'foo' to 'bar': stat source"), "{err}");
        assert!(!fs.exists(DST));
    }

    #[test]
    fn copy_fails_when_destination_is_locked() {
        let fs = fixture().with_file(DST, b"busy", 0o660);
        let _held = open_locked(&fs, Path::new(DST), &OpenRequest::new(AccessIntent::ReadWrite)).unwrap();

        let err = copy(&fs, Path::new(SRC), Path::new(DST)).unwrap_err();
        assert!(err.is_lock_unavailable());
        // Source handle was released on the error path.
        assert!(fs.journal().contains(&Event::Close(SRC.into())));
    }

    #[test]
    fn copy_rolls_back_on_write_failure() {
        let fs = fixture();
        fs.fail_write_after(DST, 4);
        let err = copy(&fs, Path::new(SRC), Path::new(DST)).unwrap_err();
        assert_eq!(err.kind(), FioErrorKind::IoFailure);
        assert!(!fs.exists(DST));
        assert!(fs.exists(SRC));
    }

    #[test]
    fn copy_onto_itself_is_refused_untouched() {
        let fs = fixture();
        fs.clear_journal();
        let err = copy(&fs, Path::new(SRC), Path::new(SRC)).unwrap_err();
        assert_eq!(err.kind(), FioErrorKind::InvalidInput);
        assert!(err.to_string().contains("check destination"), "{err}");
        assert_eq!(fs.contents(SRC).unwrap(), DATA);
        assert!(!fs.journal().iter().any(|e| matches!(e, Event::Open(..))));
    }

    #[test]
    fn move_onto_itself_keeps_source() {
        let fs = fixture();
        let err = move_file(&fs, Path::new(SRC), Path::new(SRC)).unwrap_err();
        assert_eq!(err.kind(), FioErrorKind::InvalidInput);
        assert_eq!(fs.contents(SRC).unwrap(), DATA);
    }

    #[test]
    fn distinct_existing_destination_is_overwritten() {
        let fs = fixture().with_file(DST, b"stale", 0o600);
        copy(&fs, Path::new(SRC), Path::new(DST)).unwrap();
        assert_eq!(fs.contents(DST).unwrap(), DATA);
    }

    #[test]
    fn remove_missing_is_not_an_error() {
        let fs = fixture();
        assert!(!remove(&fs, Path::new("nope")).unwrap());
        assert!(remove(&fs, Path::new(SRC)).unwrap());
        assert!(!fs.exists(SRC));
    }

    #[test]
    fn remove_other_failures_propagate() {
        let fs = fixture();
        fs.fail_remove(SRC, io::ErrorKind::PermissionDenied);
        let err = remove(&fs, Path::new(SRC)).unwrap_err();
        assert_eq!(err.kind(), FioErrorKind::PermissionDenied);
    }

    #[test]
    fn rename_moves_entry() {
        let fs = fixture();
        rename(&fs, Path::new(SRC), Path::new(DST)).unwrap();
        assert!(!fs.exists(SRC));
        assert_eq!(fs.contents(DST).unwrap(), DATA);
        assert_eq!(fs.journal(), vec![Event::Rename(SRC.into(), DST.into())]);
    }
}
