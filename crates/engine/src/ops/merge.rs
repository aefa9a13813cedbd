// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concatenate the files of a directory into one and delete the parts.
//!
//! Sequence: list → read every part → write `.<name>.partial`, fsync,
//! rename into place → delete parts. Any failure before the rename leaves
//! the parts untouched. Deletion has no rollback: a failure there leaves
//! the merged file plus whatever parts were not yet removed.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::OpError;

/// Suffix of the in-progress output file; such files are never treated as parts
pub const PARTIAL_SUFFIX: &str = ".partial";

/// Result of a successful merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub output: PathBuf,
    pub parts: usize,
    pub bytes: usize,
}

/// Merge the immediate files of `dir`, in file-name order, into `dir/output`.
///
/// With no `output`, the name is the first part's file name without its
/// last extension (`movie.mp4.001` → `movie.mp4`).
pub async fn merge_parts(dir: &Path, output: Option<&str>) -> Result<MergeOutcome, OpError> {
    let parts = list_parts(dir).await?;
    let first = parts.first().ok_or_else(|| OpError::NothingToMerge(dir.to_path_buf()))?;
    let output_name = match output {
        Some(name) => name.to_string(),
        None => derive_output_name(first)?,
    };
    let output_path = dir.join(&output_name);

    let mut joined = Vec::new();
    for part in &parts {
        let bytes = tokio::fs::read(part).await.map_err(OpError::io("read", part))?;
        joined.extend_from_slice(&bytes);
    }

    write_into_place(dir, &output_name, &joined).await?;

    for part in &parts {
        // The output may reuse a part's name; it now holds the merged bytes
        if *part == output_path {
            continue;
        }
        tokio::fs::remove_file(part).await.map_err(OpError::io("remove part", part))?;
    }

    Ok(MergeOutcome { output: output_path, parts: parts.len(), bytes: joined.len() })
}

/// Non-directory entries of `dir`, sorted by file name.
async fn list_parts(dir: &Path) -> Result<Vec<PathBuf>, OpError> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(OpError::io("list", dir))?;
    let mut parts = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(OpError::io("list", dir))? {
        let file_type = entry.file_type().await.map_err(OpError::io("stat", &entry.path()))?;
        if file_type.is_dir() || is_partial(&entry.file_name()) {
            continue;
        }
        parts.push(entry.path());
    }
    parts.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(parts)
}

fn is_partial(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    name.starts_with('.') && name.ends_with(PARTIAL_SUFFIX)
}

fn derive_output_name(first_part: &Path) -> Result<String, OpError> {
    first_part
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| OpError::NoOutputName(first_part.to_path_buf()))
}

async fn write_into_place(dir: &Path, name: &str, data: &[u8]) -> Result<(), OpError> {
    let partial = dir.join(format!(".{}{}", name, PARTIAL_SUFFIX));
    let target = dir.join(name);

    let written = async {
        let mut file =
            tokio::fs::File::create(&partial).await.map_err(OpError::io("create", &partial))?;
        file.write_all(data).await.map_err(OpError::io("write", &partial))?;
        file.sync_all().await.map_err(OpError::io("sync", &partial))?;
        drop(file);
        tokio::fs::rename(&partial, &target).await.map_err(OpError::io("rename", &partial))
    }
    .await;

    if written.is_err() {
        let _ = tokio::fs::remove_file(&partial).await;
    }
    written
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
