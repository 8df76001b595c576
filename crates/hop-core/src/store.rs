//! Durable store of visit records.
//!
//! The store file is never held open between calls. Readers parse a snapshot
//! of whatever file is in place; writers replace it atomically. Mutations run
//! under an exclusive advisory lock on a sibling `.lock` file so that
//! concurrent shells never drop each other's entries.

use crate::atomic::atomic_replace;
use crate::error::{HopError, HopResult};
use crate::index::{FrecencyIndex, WeightSettings};
use crate::record::{parse_records, render_records, Records};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

/// Minimum age of the backup before it is refreshed.
const BACKUP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct PersistentStore {
    path: PathBuf,
}

impl PersistentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        self.sibling(".bak")
    }

    fn lock_path(&self) -> PathBuf {
        self.sibling(".lock")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.path.file_name().unwrap_or_default());
        name.push(suffix);
        self.path.with_file_name(name)
    }

    /// Read and parse the store file. A missing file is an empty store.
    pub fn load(&self) -> HopResult<Records> {
        read_records(&self.path)
    }

    /// Like [`load`](Self::load), but a corrupt file falls back to the
    /// backup and then to an empty store. Only IO failures are returned.
    pub fn load_or_recover(&self) -> HopResult<Records> {
        self.load_tracked().map(|(records, _)| records)
    }

    // The flag is true when the primary file parsed cleanly.
    fn load_tracked(&self) -> HopResult<(Records, bool)> {
        match self.load() {
            Ok(records) => Ok((records, true)),
            Err(err) if err.is_corrupt() => {
                warn!(error = %err, "store is corrupt, trying backup");
                match read_records(&self.backup_path()) {
                    Ok(records) if !records.is_empty() => {
                        warn!(
                            backup = %self.backup_path().display(),
                            entries = records.len(),
                            "recovered store from backup"
                        );
                        Ok((records, false))
                    }
                    Ok(_) => {
                        warn!("no usable backup, starting with an empty store");
                        Ok((Records::new(), false))
                    }
                    Err(backup_err) => {
                        warn!(error = %backup_err, "backup unusable, starting with an empty store");
                        Ok((Records::new(), false))
                    }
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Write the full table with an atomic replace.
    pub fn save(&self, records: &Records) -> HopResult<()> {
        atomic_replace(&self.path, render_records(records).as_bytes())?;
        debug!(path = %self.path.display(), entries = records.len(), "store saved");
        Ok(())
    }

    /// Run a locked load, mutate, save cycle and return the closure's result.
    pub fn update<T>(
        &self,
        settings: WeightSettings,
        mutate: impl FnOnce(&mut FrecencyIndex) -> T,
    ) -> HopResult<T> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())?;
        FileExt::lock_exclusive(&lock)?;

        let (records, clean) = self.load_tracked()?;
        if clean {
            if let Err(err) = self.refresh_backup() {
                warn!(error = %err, "failed to refresh store backup");
            }
        }

        let mut index = FrecencyIndex::from_records(records, settings);
        let out = mutate(&mut index);
        self.save(index.records())?;

        FileExt::unlock(&lock)?;
        Ok(out)
    }

    /// Record a visit to an already-normalized path; returns its new weight.
    pub fn record_visit(
        &self,
        path: &str,
        settings: WeightSettings,
        now: DateTime<Utc>,
    ) -> HopResult<f64> {
        self.update(settings, |index| index.add_or_update(path, now))
    }

    /// Drop records whose directory no longer exists; returns how many were dropped.
    pub fn purge_missing(&self, settings: WeightSettings) -> HopResult<usize> {
        self.update(settings, |index| {
            index.retain(|record| Path::new(&record.path).is_dir())
        })
    }

    fn refresh_backup(&self) -> io::Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let backup = self.backup_path();
        let stale = match fs::metadata(&backup).and_then(|m| m.modified()) {
            Ok(modified) => SystemTime::now()
                .duration_since(modified)
                .map(|age| age >= BACKUP_INTERVAL)
                .unwrap_or(false),
            Err(_) => true,
        };

        if stale {
            let content = fs::read(&self.path)?;
            atomic_replace(&backup, &content)?;
            debug!(backup = %backup.display(), "store backup refreshed");
        }
        Ok(())
    }
}

fn read_records(path: &Path) -> HopResult<Records> {
    let content = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Records::new()),
        Err(e) => return Err(e.into()),
    };

    let text = String::from_utf8(content).map_err(|e| HopError::CorruptStore {
        path: path.to_path_buf(),
        line: 0,
        reason: format!("not valid UTF-8: {}", e),
    })?;

    parse_records(&text).map_err(|e| HopError::CorruptStore {
        path: path.to_path_buf(),
        line: e.line,
        reason: e.reason,
    })
}
