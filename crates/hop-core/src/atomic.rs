//! Crash-safe replacement of the store file.
//!
//! Content is written to a sibling temp file, fsynced, then renamed over the
//! target. Readers observe either the old or the new file, never a torn one.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replace `path` with `content` atomically, creating parent directories.
pub fn atomic_replace(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "store path has no parent directory")
    })?;
    fs::create_dir_all(parent)?;

    let temp_path = temp_sibling(path);
    if let Err(e) = write_synced(&temp_path, content) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    #[cfg(unix)]
    {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

// Unique per process and per call so concurrent writers never share a temp file.
fn temp_sibling(path: &Path) -> PathBuf {
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(
        ".{}.{}.{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy(),
        std::process::id(),
        seq
    ))
}

fn write_synced(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut opts = OpenOptions::new();
    opts.write(true).create_new(true);

    #[cfg(unix)]
    opts.mode(0o644);

    let mut file = opts.open(path)?;
    file.write_all(content)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_replace_creates_file_and_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/hop/hop.txt");

        atomic_replace(&path, b"/a\t10\t0\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "/a\t10\t0\n");
    }

    #[test]
    fn test_replace_overwrites_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hop.txt");

        atomic_replace(&path, b"old").unwrap();
        atomic_replace(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hop.txt");

        atomic_replace(&path, b"content").unwrap();
        atomic_replace(&path, b"content again").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("hop.txt")]);
    }

    #[test]
    fn test_temp_names_are_unique() {
        let path = Path::new("/tmp/hop.txt");
        assert_ne!(temp_sibling(path), temp_sibling(path));
    }
}
