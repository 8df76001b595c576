//! Visit recording for the shell's directory-change hook.
//!
//! Recording never reports back to the caller: failures are logged to the
//! side log and the command still exits 0, so a broken store can never
//! disturb the interactive shell.

use chrono::Utc;
use hop_core::{normalize_path, HopResult, PathFilter, PersistentStore, WeightSettings};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct VisitRecorder {
    store: PersistentStore,
    settings: WeightSettings,
    filter: PathFilter,
}

impl VisitRecorder {
    pub fn new(store: PersistentStore, settings: WeightSettings, filter: PathFilter) -> Self {
        Self {
            store,
            settings,
            filter,
        }
    }

    /// Record `raw` (relative to `cwd`); returns the new weight, or `None`
    /// when the directory is excluded from recording.
    pub fn record(&self, raw: &Path, cwd: &Path) -> HopResult<Option<f64>> {
        let path = normalize_path(raw, cwd)?;
        if !self.filter.allows(&path) {
            debug!(path = %path, "directory excluded from recording");
            return Ok(None);
        }

        let weight = self.store.record_visit(&path, self.settings, Utc::now())?;
        debug!(path = %path, weight, "visit recorded");
        Ok(Some(weight))
    }

    /// Run [`record`](Self::record) as a detached task with no result channel.
    ///
    /// The handle only lets a short-lived process wait for the write before
    /// exiting; errors go to the log.
    pub fn dispatch(self, raw: PathBuf, cwd: PathBuf) -> JoinHandle<()> {
        tokio::task::spawn_blocking(move || {
            if let Err(err) = self.record(&raw, &cwd) {
                warn!(path = %raw.display(), error = %err, "failed to record visit");
            }
        })
    }
}

/// Re-run `exe` with `args` in a detached child whose stdio is discarded.
///
/// The child is not waited on; on Unix it gets its own process group so
/// the shell's job control signals do not reach it.
pub fn spawn_detached(exe: &Path, args: &[OsString]) -> io::Result<()> {
    let mut command = Command::new(exe);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let child = command.spawn()?;
    debug!(pid = child.id(), "detached recorder spawned");
    Ok(())
}

/// Arguments that make a child process record `path` with the same
/// configuration as this one.
pub fn detached_args(
    path: &str,
    config: Option<&Path>,
    data_file: Option<&Path>,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["--add".into(), path.into()];
    if let Some(config) = config {
        args.push("--config".into());
        args.push(config.into());
    }
    if let Some(data_file) = data_file {
        args.push("--data-file".into());
        args.push(data_file.into());
    }
    args
}
