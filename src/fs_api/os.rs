//! Production filesystem backed by real OS calls.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use tracing::{trace, warn};

use super::{FileStat, FileSystem, OpenRequest, Opened};
use crate::fs_ops::policy::LockDescriptor;
use crate::platform;

/// Stateless handle to the host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl OsFileSystem {
    fn options(req: &OpenRequest) -> OpenOptions {
        let mut opts = OpenOptions::new();
        // Truncation is a separate step taken under the lock.
        opts.read(req.intent.reads())
            .write(req.intent.writes())
            .truncate(false);
        platform::set_create_mode(&mut opts, req.mode);
        opts
    }
}

impl FileSystem for OsFileSystem {
    type Handle = File;

    /// When `create` is set and the file did not exist, the requested permission bits
    /// are applied exactly (the umask does not narrow them). Existing files keep their mode.
    fn open(&self, path: &Path, req: &OpenRequest) -> io::Result<Opened<File>> {
        let existing = |file: File| Opened {
            handle: file,
            created: false,
        };
        if !req.create {
            return Self::options(req).open(path).map(existing);
        }

        match Self::options(req).create_new(true).open(path) {
            Ok(file) => {
                if let Err(e) = platform::set_exact_mode(&file, req.mode) {
                    drop(file);
                    if let Err(rm) = fs::remove_file(path) {
                        warn!(path = %path.display(), error = %rm, "could not remove newly created file");
                    }
                    return Err(e);
                }
                trace!(path = %path.display(), mode = format_args!("{:#o}", req.mode), "created file");
                Ok(Opened {
                    handle: file,
                    created: true,
                })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                // Lost a race with a concurrent remover: fall back to plain create.
                Self::options(req).create(true).open(path).map(existing)
            }
            Err(e) => Err(e),
        }
    }

    fn lock(&self, handle: &File, lock: &LockDescriptor) -> io::Result<()> {
        platform::try_lock(handle, lock)
    }

    fn truncate(&self, handle: &File) -> io::Result<()> {
        handle.set_len(0)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let meta = fs::metadata(path)?;
        Ok(FileStat {
            size: meta.len(),
            mode: platform::mode_bits(&meta),
            is_file: meta.is_file(),
            id: platform::file_id(&meta),
        })
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_ops::policy::AccessIntent;
    use std::io::{Read, Write};
    use tempfile::tempdir;

    #[test]
    fn create_truncate_then_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let fs = OsFileSystem;

        let opened = fs.open(&path, &OpenRequest::create_truncate(0o640)).unwrap();
        assert!(opened.created);
        let mut f = opened.handle;
        f.write_all(b"abc").unwrap();
        drop(f);

        let mut f = fs.open(&path, &OpenRequest::read_only()).unwrap().handle;
        let mut s = String::new();
        f.read_to_string(&mut s).unwrap();
        assert_eq!(s, "abc");

        let st = fs.stat(&path).unwrap();
        assert_eq!(st.size, 3);
        assert!(st.is_file);
    }

    #[test]
    fn open_leaves_content_until_truncate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.txt");
        fs::write(&path, b"0123456789").unwrap();

        let fs = OsFileSystem;
        let opened = fs.open(&path, &OpenRequest::create_truncate(0o600)).unwrap();
        assert!(!opened.created);
        assert_eq!(fs::read(&path).unwrap(), b"0123456789");

        let mut f = opened.handle;
        fs.truncate(&f).unwrap();
        f.write_all(b"xy").unwrap();
        drop(f);
        assert_eq!(fs::read(&path).unwrap(), b"xy");
    }

    #[cfg(unix)]
    #[test]
    fn hard_link_shares_identity() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        let c = dir.path().join("c");
        fs::write(&a, b"x").unwrap();
        fs::hard_link(&a, &b).unwrap();
        fs::write(&c, b"x").unwrap();

        let fs = OsFileSystem;
        let sa = fs.stat(&a).unwrap();
        assert!(sa.same_file(&fs.stat(&b).unwrap()));
        assert!(!sa.same_file(&fs.stat(&c).unwrap()));
    }

    #[test]
    fn missing_without_create_is_not_found() {
        let dir = tempdir().unwrap();
        let fs = OsFileSystem;
        let err = fs.open(&dir.path().join("nope"), &OpenRequest::new(AccessIntent::ReadWrite)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        let err = fs.stat(&dir.path().join("nope")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        let err = fs.remove(&dir.path().join("nope")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn created_file_gets_exact_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.txt");
        let fs = OsFileSystem;
        drop(fs.open(&path, &OpenRequest::create_truncate(0o666)).unwrap());
        assert_eq!(fs.stat(&path).unwrap().mode, 0o666);
    }

    #[cfg(unix)]
    #[test]
    fn existing_file_keeps_mode_on_truncate() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let path = dir.path().join("keep.txt");
        fs::write(&path, b"old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

        let fs = OsFileSystem;
        drop(fs.open(&path, &OpenRequest::create_truncate(0o644)).unwrap());
        assert_eq!(fs.stat(&path).unwrap().mode, 0o600);
    }
}
