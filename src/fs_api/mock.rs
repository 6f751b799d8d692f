//! In-memory `FileSystem` double.
//!
//! - Files live in a shared map; clones of a `MockFileSystem` see the same state.
//! - Locks follow the shared/exclusive rules per path and are released when the holding
//!   handle is dropped, like an OS descriptor close.
//! - Every call is appended to a journal so tests can assert call order.
//! - Faults can be injected per path (open, lock, write-after-N-bytes, remove).
//! - Each file gets its own inode number, kept across renames; hard links are not modelled.

use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{FileStat, FileSystem, OpenRequest, Opened};
use crate::fs_ops::policy::{AccessIntent, LockDescriptor, LockType};

/// One recorded filesystem interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Stat(PathBuf),
    Open(PathBuf, AccessIntent),
    Lock(PathBuf, LockType),
    Truncate(PathBuf),
    Read(PathBuf),
    Write(PathBuf),
    Close(PathBuf),
    Remove(PathBuf),
    Rename(PathBuf, PathBuf),
}

#[derive(Debug)]
struct Entry {
    data: Vec<u8>,
    mode: u32,
    ino: u64,
}

#[derive(Debug, Default)]
struct State {
    files: HashMap<PathBuf, Entry>,
    locks: HashMap<PathBuf, Vec<(u64, LockType)>>,
    journal: Vec<Event>,
    next_handle: u64,
    next_ino: u64,
    fail_open: HashMap<PathBuf, io::ErrorKind>,
    fail_lock: HashMap<PathBuf, io::ErrorKind>,
    fail_write_after: HashMap<PathBuf, usize>,
    fail_remove: HashMap<PathBuf, io::ErrorKind>,
}

impl State {
    /// Consecutive duplicates (e.g. a read loop) collapse into one entry.
    fn record(&mut self, event: Event) {
        if self.journal.last() != Some(&event) {
            self.journal.push(event);
        }
    }

    fn new_entry(&mut self, data: Vec<u8>, mode: u32) -> Entry {
        self.next_ino += 1;
        Entry {
            data,
            mode,
            ino: self.next_ino,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<State>>,
}

fn lock_state(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        lock_state(&self.state)
    }

    pub fn with_file(self, path: impl Into<PathBuf>, data: &[u8], mode: u32) -> Self {
        self.insert_file(path, data, mode);
        self
    }

    pub fn insert_file(&self, path: impl Into<PathBuf>, data: &[u8], mode: u32) {
        let mut st = self.state();
        let entry = st.new_entry(data.to_vec(), mode);
        st.files.insert(path.into(), entry);
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.state().files.contains_key(path.as_ref())
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.state().files.get(path.as_ref()).map(|e| e.data.clone())
    }

    pub fn mode_of(&self, path: impl AsRef<Path>) -> Option<u32> {
        self.state().files.get(path.as_ref()).map(|e| e.mode)
    }

    pub fn journal(&self) -> Vec<Event> {
        self.state().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.state().journal.clear();
    }

    /// Make `open` on `path` fail with `kind`.
    pub fn fail_open(&self, path: impl Into<PathBuf>, kind: io::ErrorKind) {
        self.state().fail_open.insert(path.into(), kind);
    }

    /// Make `lock` on `path` fail with `kind` (`WouldBlock` reads as contention).
    pub fn fail_lock(&self, path: impl Into<PathBuf>, kind: io::ErrorKind) {
        self.state().fail_lock.insert(path.into(), kind);
    }

    /// Accept `limit` bytes written to `path`, then fail every further write.
    pub fn fail_write_after(&self, path: impl Into<PathBuf>, limit: usize) {
        self.state().fail_write_after.insert(path.into(), limit);
    }

    /// Make `remove` on `path` fail with `kind`.
    pub fn fail_remove(&self, path: impl Into<PathBuf>, kind: io::ErrorKind) {
        self.state().fail_remove.insert(path.into(), kind);
    }
}

/// Open mock file. Dropping it records a `Close` and releases its locks.
#[derive(Debug)]
pub struct MockHandle {
    state: Arc<Mutex<State>>,
    id: u64,
    path: PathBuf,
    intent: AccessIntent,
    pos: usize,
    written: usize,
}

impl Read for MockHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.intent.reads() {
            return Err(io::Error::other("handle not open for reading"));
        }
        let mut st = lock_state(&self.state);
        st.record(Event::Read(self.path.clone()));
        let data = st.files.get(&self.path).map(|e| e.data.as_slice()).unwrap_or(&[]);
        let remaining = data.get(self.pos..).unwrap_or(&[]);
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for MockHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.intent.writes() {
            return Err(io::Error::other("handle not open for writing"));
        }
        let mut st = lock_state(&self.state);
        st.record(Event::Write(self.path.clone()));

        let mut n = buf.len();
        if let Some(&limit) = st.fail_write_after.get(&self.path) {
            if self.written >= limit {
                return Err(io::Error::other("injected write failure"));
            }
            n = n.min(limit - self.written);
        }

        // Writes to an unlinked path vanish, like writes to an unlinked inode.
        if let Some(entry) = st.files.get_mut(&self.path) {
            let end = self.pos + n;
            if entry.data.len() < end {
                entry.data.resize(end, 0);
            }
            entry.data[self.pos..end].copy_from_slice(&buf[..n]);
        }
        self.pos += n;
        self.written += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        let mut st = lock_state(&self.state);
        if let Some(held) = st.locks.get_mut(&self.path) {
            held.retain(|(id, _)| *id != self.id);
        }
        st.record(Event::Close(self.path.clone()));
    }
}

impl FileSystem for MockFileSystem {
    type Handle = MockHandle;

    fn open(&self, path: &Path, req: &OpenRequest) -> io::Result<Opened<MockHandle>> {
        let mut st = self.state();
        st.record(Event::Open(path.to_path_buf(), req.intent));
        if let Some(&kind) = st.fail_open.get(path) {
            return Err(io::Error::from(kind));
        }

        let created = if st.files.contains_key(path) {
            false
        } else if req.create {
            let entry = st.new_entry(Vec::new(), req.mode);
            st.files.insert(path.to_path_buf(), entry);
            true
        } else {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        };

        st.next_handle += 1;
        let handle = MockHandle {
            state: Arc::clone(&self.state),
            id: st.next_handle,
            path: path.to_path_buf(),
            intent: req.intent,
            pos: 0,
            written: 0,
        };
        Ok(Opened { handle, created })
    }

    fn lock(&self, handle: &MockHandle, lock: &LockDescriptor) -> io::Result<()> {
        let mut st = self.state();
        st.record(Event::Lock(handle.path.clone(), lock.lock_type));
        if let Some(&kind) = st.fail_lock.get(&handle.path) {
            return Err(io::Error::from(kind));
        }
        let held = st.locks.entry(handle.path.clone()).or_default();
        let conflict = held.iter().any(|(id, held_type)| {
            *id != handle.id
                && (lock.lock_type == LockType::Exclusive || *held_type == LockType::Exclusive)
        });
        if conflict {
            return Err(io::Error::from(io::ErrorKind::WouldBlock));
        }
        held.retain(|(id, _)| *id != handle.id);
        held.push((handle.id, lock.lock_type));
        Ok(())
    }

    fn truncate(&self, handle: &MockHandle) -> io::Result<()> {
        let mut st = self.state();
        st.record(Event::Truncate(handle.path.clone()));
        if let Some(entry) = st.files.get_mut(&handle.path) {
            entry.data.clear();
        }
        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        let mut st = self.state();
        st.record(Event::Remove(path.to_path_buf()));
        if let Some(&kind) = st.fail_remove.get(path) {
            return Err(io::Error::from(kind));
        }
        st.files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let mut st = self.state();
        st.record(Event::Stat(path.to_path_buf()));
        st.files
            .get(path)
            .map(|e| FileStat {
                size: e.data.len() as u64,
                mode: e.mode,
                is_file: true,
                id: Some((0, e.ino)),
            })
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut st = self.state();
        st.record(Event::Rename(from.to_path_buf(), to.to_path_buf()));
        let entry = st
            .files
            .remove(from)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
        st.files.insert(to.to_path_buf(), entry);
        Ok(())
    }
}
