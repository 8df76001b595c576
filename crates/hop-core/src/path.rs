//! Path normalization and exclusion rules for recorded directories

use crate::error::{HopError, HopResult};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Component, Path, PathBuf};

/// Normalize `input` into the absolute key used by the store.
///
/// Relative paths are joined onto `cwd`. `.` and `..` are folded lexically,
/// symlinks are left alone so keys agree with the shell's `$PWD`.
pub fn normalize_path(input: &Path, cwd: &Path) -> HopResult<String> {
    let joined = if input.is_absolute() {
        input.to_path_buf()
    } else {
        cwd.join(input)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }

    let text = normalized.to_str().ok_or_else(|| HopError::InvalidPath {
        path: joined.to_string_lossy().into_owned(),
        reason: "not valid UTF-8".to_string(),
    })?;

    if !normalized.is_absolute() {
        return Err(HopError::InvalidPath {
            path: text.to_string(),
            reason: "not an absolute path".to_string(),
        });
    }

    if text.contains(['\t', '\n', '\r']) {
        return Err(HopError::InvalidPath {
            path: text.escape_debug().to_string(),
            reason: "contains a tab or newline".to_string(),
        });
    }

    Ok(text.to_string())
}

/// Last component of a stored path, or the path itself for the root.
pub fn basename(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

/// Decides which directories are never recorded.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    excludes: Option<GlobSet>,
    home: Option<String>,
}

impl PathFilter {
    pub fn new(patterns: &[String], home: Option<&Path>) -> HopResult<Self> {
        let excludes = if patterns.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in patterns {
                builder.add(Glob::new(pattern)?);
            }
            Some(builder.build()?)
        };

        Ok(Self {
            excludes,
            home: home.and_then(|h| h.to_str()).map(|h| h.trim_end_matches('/').to_string()),
        })
    }

    pub fn allows(&self, path: &str) -> bool {
        if self.home.as_deref() == Some(path) {
            return false;
        }
        match &self.excludes {
            Some(set) => !set.is_match(path),
            None => true,
        }
    }
}
