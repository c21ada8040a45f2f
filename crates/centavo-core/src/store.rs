//! # Serialized Collection Storage
//!
//! Each collection (expenses, pending payments, settings) is one UTF-8 file
//! holding a single pretty-printed JSON document: an array of records, or an
//! object for the settings overlay. Every operation re-reads its file, so
//! there is no in-process cache to invalidate; concurrent callers are
//! coordinated purely through the file locks in [`crate::safe_io`].
//!
//! ## File layout
//!
//! ```text
//! <data_dir>/
//! ├── gastos.json                    # expense collection (growth-monitored)
//! ├── gastos_20250101_120000.json    # rotated archive
//! ├── pagos.json                     # pending payments
//! ├── config.json                    # settings overlay (object, not array)
//! └── gastos.json.corrupted          # backup from corruption recovery
//! ```
//!
//! ## Rotation
//!
//! Saving the expense collection first checks its size; past the threshold
//! the live file is renamed to `<stem>_<YYYYMMDD_HHMMSS><ext>` and recreated
//! empty. Rotation failures are logged and swallowed — the triggering save
//! proceeds against whatever state exists. Two rotations within the same
//! second compute the same archive name and the second rename overwrites the
//! first; known gap, kept as-is.
//!
//! ## Corruption recovery
//!
//! A file that no longer parses as the expected JSON shape is copied to a
//! `.corrupted` sibling and the original is reset to the caller-supplied
//! default. Read paths never propagate errors; they degrade to the default.

use crate::safe_io::LockedFile;
use chrono::Local;
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

// ============================================================================
// Constants
// ============================================================================

/// Rotation threshold for the growth-monitored collection (10 MiB).
pub const DEFAULT_ROTATE_THRESHOLD_BYTES: u64 = 10 * 1024 * 1024;

/// Default file name of the expense collection.
pub const DEFAULT_EXPENSES_FILE: &str = "gastos.json";

/// Default file name of the pending-payment collection.
pub const DEFAULT_PAYMENTS_FILE: &str = "pagos.json";

/// Default file name of the settings overlay.
pub const DEFAULT_SETTINGS_FILE: &str = "config.json";

// ============================================================================
// Configuration
// ============================================================================

/// Storage configuration: data directory, per-collection file names, and the
/// rotation threshold.
///
/// Only `data_dir` is required; optional fields fall back to the defaults
/// above. Passed explicitly into [`Store::new`] — there is no process-wide
/// file-path state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding all collection files, archives, and backups.
    pub data_dir: PathBuf,

    /// File name of the expense collection (the growth-monitored one).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expenses_file: Option<String>,

    /// File name of the pending-payment collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payments_file: Option<String>,

    /// File name of the settings overlay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_file: Option<String>,

    /// Rotation threshold in bytes for the expense collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate_threshold_bytes: Option<u64>,
}

impl StoreConfig {
    /// Configuration with default file names rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            expenses_file: None,
            payments_file: None,
            settings_file: None,
            rotate_threshold_bytes: None,
        }
    }

    /// Effective rotation threshold.
    /// Enforces a minimum of 1 so a zero value cannot rotate on every save.
    #[inline]
    pub fn rotate_threshold(&self) -> u64 {
        self.rotate_threshold_bytes
            .unwrap_or(DEFAULT_ROTATE_THRESHOLD_BYTES)
            .max(1)
    }
}

// ============================================================================
// Collections
// ============================================================================

/// The record collections the store manages.
///
/// The settings overlay is deliberately not a `Collection`: it is a single
/// object with merge-update semantics, exposed via [`Store::settings`] and
/// [`Store::update_setting`] instead of the sequence operations here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// Financial transactions; the growth-monitored collection.
    Expenses,
    /// Scheduled payments.
    Payments,
}

// ============================================================================
// Store
// ============================================================================

/// File-backed record store.
///
/// All operations are synchronous and self-contained: acquire the file lock,
/// do the work, release. Read paths never return errors — they degrade to
/// the caller-supplied default. Write paths report success as `bool` and the
/// caller must treat `false` as "not persisted".
pub struct Store {
    config: StoreConfig,
}

impl Store {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    // ========================================================================
    // Paths (pure computation, no I/O)
    // ========================================================================

    /// The data directory all files live in.
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Path to a collection's file.
    pub fn collection_path(&self, collection: Collection) -> PathBuf {
        let name = match collection {
            Collection::Expenses => self
                .config
                .expenses_file
                .as_deref()
                .unwrap_or(DEFAULT_EXPENSES_FILE),
            Collection::Payments => self
                .config
                .payments_file
                .as_deref()
                .unwrap_or(DEFAULT_PAYMENTS_FILE),
        };
        self.config.data_dir.join(name)
    }

    /// Path to the settings overlay file.
    pub fn settings_path(&self) -> PathBuf {
        self.config.data_dir.join(
            self.config
                .settings_file
                .as_deref()
                .unwrap_or(DEFAULT_SETTINGS_FILE),
        )
    }

    // ========================================================================
    // Public surface
    // ========================================================================

    /// All records of a collection, in insertion order.
    ///
    /// Creates the collection file (as an empty array) on first access.
    /// Never fails: unreadable state degrades to an empty collection after
    /// corruption recovery.
    pub fn records(&self, collection: Collection) -> Vec<Value> {
        self.load(&self.collection_path(collection), Vec::new())
    }

    /// Append one record to a collection.
    ///
    /// The whole read-modify-write cycle runs under a single exclusive lock,
    /// so no concurrent append can interleave with it and no reader can
    /// observe the intermediate state. Returns `false` (logged) if the
    /// record was not persisted.
    pub fn append(&self, collection: Collection, record: Value) -> bool {
        let path = self.collection_path(collection);

        let mut locked = match LockedFile::exclusive(&path, false) {
            Ok(locked) => locked,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // First record: create the collection around it.
                return self.save(&path, &vec![record]);
            }
            Err(e) => {
                error!("could not open {}: {}", path.display(), e);
                return false;
            }
        };

        match append_locked(&mut locked, record) {
            Ok(()) => true,
            Err(e) => {
                error!("could not append to {}: {}", path.display(), e);
                false
            }
        }
    }

    // ========================================================================
    // Generic load/save
    // ========================================================================

    /// Load a whole document, creating the file with `default` if absent.
    ///
    /// Reads under a shared lock. Content that fails to deserialize as `T`
    /// triggers corruption recovery (after the read lock is released) and
    /// yields `default`; any other I/O failure is logged and also yields
    /// `default`. This path never errors out to the caller.
    pub fn load<T>(&self, path: &Path, default: T) -> T
    where
        T: Serialize + DeserializeOwned,
    {
        if let Err(e) = self.ensure_file_exists(path, &default) {
            error!("could not initialize {}: {}", path.display(), e);
            return default;
        }

        // The shared lock is held only while snapshotting the content; it
        // must be released before recovery takes the exclusive lock below.
        let content = {
            let mut locked = match LockedFile::shared(path) {
                Ok(locked) => locked,
                Err(e) => {
                    error!("could not open {}: {}", path.display(), e);
                    return default;
                }
            };
            match locked.read_to_string() {
                Ok(content) => content,
                Err(e) => {
                    error!("could not read {}: {}", path.display(), e);
                    return default;
                }
            }
        };

        match serde_json::from_str(&content) {
            Ok(data) => data,
            Err(e) => {
                error!(
                    "invalid content in {}: {}; resetting to default",
                    path.display(),
                    e
                );
                self.recover_corrupted(path, &default);
                default
            }
        }
    }

    /// Overwrite a whole document.
    ///
    /// Runs the rotation check first when `path` is the growth-monitored
    /// expense collection, then truncates and rewrites under an exclusive
    /// lock. Returns `false` (logged) on I/O failure.
    pub fn save<T: Serialize>(&self, path: &Path, data: &T) -> bool {
        if *path == self.collection_path(Collection::Expenses) {
            self.rotate_if_needed(path);
        }

        match write_document(path, data) {
            Ok(()) => true,
            Err(e) => {
                error!("could not write {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Create `path` with `default` if it does not exist yet.
    fn ensure_file_exists<T: Serialize>(&self, path: &Path, default: &T) -> io::Result<()> {
        if path.exists() {
            return Ok(());
        }
        fs::create_dir_all(&self.config.data_dir)?;
        write_document(path, default)
    }

    // ========================================================================
    // Rotation
    // ========================================================================

    /// Archive `path` if it has outgrown the threshold.
    ///
    /// Failures are logged and swallowed; the save that triggered the check
    /// proceeds regardless.
    fn rotate_if_needed(&self, path: &Path) {
        if let Err(e) = self.try_rotate(path) {
            error!("could not rotate {}: {}", path.display(), e);
        }
    }

    fn try_rotate(&self, path: &Path) -> io::Result<()> {
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        if meta.len() <= self.config.rotate_threshold() {
            return Ok(());
        }

        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let archive = archive_path(path, &stamp);
        fs::rename(path, &archive)?;
        info!(
            "rotated {} to {} (size limit)",
            path.display(),
            archive.display()
        );

        write_document(path, &Vec::<Value>::new())
    }

    // ========================================================================
    // Corruption recovery
    // ========================================================================

    /// Preserve an unparseable file and reset it to `default`.
    ///
    /// The backup is a copy, not a rename: the original path must stay
    /// readable for whatever operation comes next. A previous `.corrupted`
    /// backup of the same file is overwritten.
    fn recover_corrupted<T: Serialize>(&self, path: &Path, default: &T) {
        let backup = corrupted_path(path);
        match fs::copy(path, &backup) {
            Ok(_) => warn!(
                "backed up corrupted file {} to {}",
                path.display(),
                backup.display()
            ),
            Err(e) => error!("could not back up {}: {}", path.display(), e),
        }

        if let Err(e) = write_document(path, default) {
            error!("could not reset {}: {}", path.display(), e);
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Append `record` to the array held by `locked`, in place.
///
/// Existing content that fails to parse is treated as an empty collection —
/// best-effort inline recovery, without the `.corrupted` backup the load
/// path makes.
fn append_locked(locked: &mut LockedFile, record: Value) -> io::Result<()> {
    let content = locked.read_to_string()?;
    let mut records: Vec<Value> = serde_json::from_str(&content).unwrap_or_default();
    records.push(record);
    locked.overwrite(&to_pretty_bytes(&records)?)
}

/// Serialize, take the exclusive lock, truncate, write.
fn write_document<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    let bytes = to_pretty_bytes(data)?;
    let mut locked = LockedFile::exclusive(path, true)?;
    locked.overwrite(&bytes)
}

/// Pretty-printed serialization, stable across rewrites for diffability.
fn to_pretty_bytes<T: Serialize>(data: &T) -> io::Result<Vec<u8>> {
    serde_json::to_vec_pretty(data).map_err(|e| io::Error::new(ErrorKind::InvalidData, e))
}

/// `gastos.json` + `20250101_120000` → `gastos_20250101_120000.json`
fn archive_path(path: &Path, stamp: &str) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("archive");
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    path.with_file_name(format!("{stem}_{stamp}{ext}"))
}

/// `gastos.json` → `gastos.json.corrupted`
fn corrupted_path(path: &Path) -> PathBuf {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("data");
    path.with_file_name(format!("{name}.corrupted"))
}

// ============================================================================
// Tests
// ============================================================================
