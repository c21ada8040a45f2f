//! File locking primitives for collection files.
//!
//! Every read of a collection file happens under a shared advisory lock and
//! every write under an exclusive one, taken on the collection file itself.
//! Locks are cross-process (fs2/flock), blocking, and released automatically
//! when the guard drops — including on error paths.
//!
//! Advisory locking only coordinates cooperating processes; a process that
//! opens the file without locking is not excluded. Accepted limitation.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// A file handle holding an advisory lock until dropped.
///
/// Obtain one via [`LockedFile::shared`] (concurrent readers allowed) or
/// [`LockedFile::exclusive`] (single writer, excludes readers). Acquisition
/// blocks without timeout.
///
/// # Example
///
/// ```ignore
/// let mut locked = LockedFile::shared(&path)?;
/// let text = locked.read_to_string()?;
/// // lock released when `locked` goes out of scope
/// ```
#[derive(Debug)]
pub struct LockedFile {
    file: File,
}

impl LockedFile {
    /// Open `path` read-only and block until a shared lock is held.
    ///
    /// Fails with `NotFound` if the file does not exist.
    pub fn shared(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).open(path)?;
        FileExt::lock_shared(&file)?;
        Ok(Self { file })
    }

    /// Open `path` read-write and block until an exclusive lock is held.
    ///
    /// With `create` set, the file is created empty if absent; otherwise a
    /// missing file fails with `NotFound`. The existing content is NOT
    /// truncated on open — callers overwrite via [`overwrite()`] only after
    /// the lock is held, so readers never observe a half-written file.
    ///
    /// [`overwrite()`]: LockedFile::overwrite
    pub fn exclusive(path: &Path, create: bool) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(create)
            .truncate(false)
            .open(path)?;
        FileExt::lock_exclusive(&file)?;
        Ok(Self { file })
    }

    /// Read the entire file content from the start.
    pub fn read_to_string(&mut self) -> io::Result<String> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut content = String::new();
        self.file.read_to_string(&mut content)?;
        Ok(content)
    }

    /// Replace the file's content with `bytes`.
    ///
    /// Truncates and rewrites in place while the lock is held. Only valid on
    /// handles opened with [`LockedFile::exclusive`].
    pub fn overwrite(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(bytes)?;
        self.file.flush()?;
        Ok(())
    }
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        // Release via the fs2 trait; ignore errors during drop
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn shared_requires_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.json");

        let err = LockedFile::shared(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn exclusive_without_create_requires_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.json");

        let err = LockedFile::exclusive(&path, false).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn exclusive_with_create_creates_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("new.json");

        let _locked = LockedFile::exclusive(&path, true).unwrap();
        assert!(path.exists());
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn exclusive_open_does_not_truncate() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let mut locked = LockedFile::exclusive(&path, false).unwrap();
        assert_eq!(locked.read_to_string().unwrap(), "[1, 2, 3]");
    }

    #[test]
    fn overwrite_replaces_longer_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        fs::write(&path, "some much longer original content").unwrap();

        {
            let mut locked = LockedFile::exclusive(&path, false).unwrap();
            locked.overwrite(b"[]").unwrap();
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn read_after_overwrite_sees_new_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        fs::write(&path, "old").unwrap();

        let mut locked = LockedFile::exclusive(&path, false).unwrap();
        locked.overwrite(b"new").unwrap();
        assert_eq!(locked.read_to_string().unwrap(), "new");
    }

    #[test]
    fn two_shared_locks_coexist() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        fs::write(&path, "[]").unwrap();

        let _first = LockedFile::shared(&path).unwrap();
        // A second shared holder must not block
        let _second = LockedFile::shared(&path).unwrap();
    }

    #[test]
    fn exclusive_blocks_until_released() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::time::Duration;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        fs::write(&path, "[]").unwrap();

        let acquired = Arc::new(AtomicBool::new(false));
        let released = Arc::new(AtomicBool::new(false));
        let acquired_clone = Arc::clone(&acquired);
        let released_clone = Arc::clone(&released);
        let path_clone = path.clone();

        let holder = thread::spawn(move || {
            let _locked = LockedFile::exclusive(&path_clone, false).unwrap();
            acquired_clone.store(true, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(100));
            released_clone.store(true, Ordering::SeqCst);
        });

        // Wait for the holder to acquire first
        while !acquired.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(5));
        }

        let _second = LockedFile::exclusive(&path, false).unwrap();
        assert!(
            released.load(Ordering::SeqCst),
            "second exclusive lock acquired while the first was still held"
        );

        holder.join().unwrap();
    }
}
