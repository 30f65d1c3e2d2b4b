//! Session stores holding per-source burst state
//!
//! The burst detector reads and writes through the [`SessionStore`] trait
//! and never assumes a storage technology. Two stores ship with the crate:
//!
//! - [`MemorySessionStore`]: lives as long as the process, backed by the
//!   keyed `state_store::StateStore`
//! - [`FileSessionStore`]: a JSON file, so state survives across separate
//!   invocations (e.g. one CLI run per scheduler tick)

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use state_store::StateStore;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{AutoTtlError, Result};
use crate::model::{BurstState, SourceId};

/// Key-value persistence of burst state, keyed by source
pub trait SessionStore: Send + Sync {
    fn load_burst_state(&self, source_id: &SourceId) -> Result<Option<BurstState>>;

    fn save_burst_state(&self, source_id: &SourceId, state: BurstState) -> Result<()>;

    /// Load, transform and save one source's state as a single step
    ///
    /// `f` receives the stored state (if any) and returns the state to save.
    /// The default runs load then save with nothing held in between; stores
    /// shared between writers override it so that no other update for the
    /// source can land in the gap.
    fn update_burst_state(
        &self,
        source_id: &SourceId,
        f: &mut dyn FnMut(Option<BurstState>) -> BurstState,
    ) -> Result<BurstState> {
        let next = f(self.load_burst_state(source_id)?);
        self.save_burst_state(source_id, next)?;
        Ok(next)
    }
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn load_burst_state(&self, source_id: &SourceId) -> Result<Option<BurstState>> {
        (**self).load_burst_state(source_id)
    }

    fn save_burst_state(&self, source_id: &SourceId, state: BurstState) -> Result<()> {
        (**self).save_burst_state(source_id, state)
    }

    fn update_burst_state(
        &self,
        source_id: &SourceId,
        f: &mut dyn FnMut(Option<BurstState>) -> BurstState,
    ) -> Result<BurstState> {
        (**self).update_burst_state(source_id, f)
    }
}

// ============================================================================
// MemorySessionStore
// ============================================================================

/// Process-lifetime session store
///
/// Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    store: StateStore<SourceId>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget sources whose state has not been written for `max_idle`
    pub fn prune_idle(&self, max_idle: Duration) -> usize {
        let removed = self.store.prune_idle(max_idle);
        if removed > 0 {
            debug!(removed, "pruned idle burst sessions");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.store.entity_count()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn load_burst_state(&self, source_id: &SourceId) -> Result<Option<BurstState>> {
        Ok(self.store.get::<BurstState>(source_id))
    }

    fn save_burst_state(&self, source_id: &SourceId, state: BurstState) -> Result<()> {
        self.store.set(source_id, state);
        Ok(())
    }

    fn update_burst_state(
        &self,
        source_id: &SourceId,
        f: &mut dyn FnMut(Option<BurstState>) -> BurstState,
    ) -> Result<BurstState> {
        Ok(self.store.update(source_id, |state: Option<BurstState>| f(state)))
    }
}

// ============================================================================
// FileSessionStore
// ============================================================================

/// JSON-file session store
///
/// The file holds one object mapping source ids to `{"burst", "miss"}`.
/// A missing file reads as empty. Every write holds an exclusive lock on
/// `<file>.lock`, so separate processes sharing the file take turns, and
/// lands through a uniquely named temp file renamed over the original.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<cache dir>/autottl/burst-sessions.json`, when a cache dir exists
    pub fn default_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("autottl").join("burst-sessions.json"))
    }

    /// Store at [`default_path`](Self::default_path)
    pub fn open_default() -> Result<Self> {
        Self::default_path().map(Self::new).ok_or_else(|| {
            AutoTtlError::SessionStore("no cache directory available".to_string())
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling advisory lock file, `<file>.lock`
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn lock(&self) -> Result<SessionLock> {
        std::fs::create_dir_all(self.dir())?;
        SessionLock::acquire(&self.lock_path())
    }

    fn read_all(&self) -> Result<BTreeMap<SourceId, BurstState>> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) if json.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Callers hold the session lock
    fn write_all(&self, sessions: &BTreeMap<SourceId, BurstState>) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(self.dir())?;
        serde_json::to_writer_pretty(tmp.as_file_mut(), sessions)?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Remove every stored session
    pub fn clear(&self) -> Result<()> {
        let _lock = self.lock()?;
        self.write_all(&BTreeMap::new())
    }
}

impl SessionStore for FileSessionStore {
    fn load_burst_state(&self, source_id: &SourceId) -> Result<Option<BurstState>> {
        Ok(self.read_all()?.get(source_id).copied())
    }

    fn save_burst_state(&self, source_id: &SourceId, state: BurstState) -> Result<()> {
        self.update_burst_state(source_id, &mut |_| state).map(|_| ())
    }

    fn update_burst_state(
        &self,
        source_id: &SourceId,
        f: &mut dyn FnMut(Option<BurstState>) -> BurstState,
    ) -> Result<BurstState> {
        let _lock = self.lock()?;
        let mut sessions = self.read_all()?;
        let next = f(sessions.get(source_id).copied());
        sessions.insert(source_id.clone(), next);
        self.write_all(&sessions)?;
        Ok(next)
    }
}

/// Exclusive `flock` on a lock file, released on drop
///
/// Each acquire opens its own descriptor, so two stores on the same path
/// exclude each other even inside one process. The lock file is left in
/// place: removing it would let a waiter lock an unlinked inode while a
/// newcomer locks a fresh file.
#[cfg_attr(not(unix), allow(dead_code))]
struct SessionLock {
    file: File,
}

impl SessionLock {
    fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            let fd = file.as_raw_fd();
            loop {
                if unsafe { libc::flock(fd, libc::LOCK_EX) } == 0 {
                    break;
                }
                let err = std::io::Error::last_os_error();
                if err.kind() != std::io::ErrorKind::Interrupted {
                    return Err(err.into());
                }
            }
        }

        Ok(Self { file })
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            unsafe {
                libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
            }
        }
    }
}
