// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::OpError;

/// What a remove job did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    /// Path was protected; nothing touched
    Skipped,
    /// Nothing existed at the path
    Absent,
}

/// True if `path` must never be removed: its normalized form starts with
/// one of the `prefixes` (plain string prefix, so `/root` also covers
/// `/rootfs`) or is a filesystem root.
pub fn is_protected(path: &Path, prefixes: &[String]) -> bool {
    let normal = normalize(path);
    let text = normal.to_string_lossy();
    normal.parent().is_none() || prefixes.iter().any(|p| text.starts_with(p.as_str()))
}

/// Resolve `.` and `..` lexically. `..` never climbs above the root.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// `path` with its parent directory canonicalized (symlinks resolved).
/// The last component is kept as is so a symlink is removed, not its target.
async fn resolve_parent(path: &Path) -> Option<PathBuf> {
    let Some(name) = path.file_name() else {
        // Leading `..` of a relative path
        return tokio::fs::canonicalize(path).await.ok();
    };
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let parent = tokio::fs::canonicalize(parent).await.ok()?;
    Some(parent.join(name))
}

/// Recursively delete a file, symlink or directory tree.
///
/// Protection is checked against both the lexically normalized path and
/// the path through its resolved parent; the latter is what gets removed.
pub async fn remove_path(path: &Path, protected: &[String]) -> Result<Removal, OpError> {
    let normal = normalize(path);
    let resolved = resolve_parent(&normal).await;
    let guarded = is_protected(&normal, protected)
        || resolved.as_deref().is_some_and(|p| is_protected(p, protected));
    if guarded {
        tracing::info!(path = %path.display(), "skipped removing protected path");
        return Ok(Removal::Skipped);
    }
    let path = resolved.as_deref().unwrap_or(&normal);

    let meta = match tokio::fs::symlink_metadata(path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Removal::Absent),
        Err(e) => return Err(OpError::Io { action: "stat", path: path.to_path_buf(), source: e }),
    };

    let result = if meta.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };
    match result {
        Ok(()) => Ok(Removal::Removed),
        // Raced with another remover
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Removal::Absent),
        Err(e) => Err(OpError::Io { action: "remove", path: path.to_path_buf(), source: e }),
    }
}

#[cfg(test)]
#[path = "remove_tests.rs"]
mod tests;
