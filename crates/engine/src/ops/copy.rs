// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::os::unix::fs::MetadataExt;
use std::path::Path;

use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::OpError;

/// Stream a regular file into a newly created (or truncated) destination.
///
/// The destination is left alone when the source is not a regular file or
/// is the destination itself (same device and inode under any spelling or
/// link). Returns the number of bytes copied.
pub async fn copy_file(source: &Path, destination: &Path) -> Result<u64, OpError> {
    let mut src = File::open(source).await.map_err(OpError::io("open", source))?;
    let meta = src.metadata().await.map_err(OpError::io("stat", source))?;
    if !meta.is_file() {
        return Err(OpError::NotRegularFile(source.to_path_buf()));
    }
    if let Ok(existing) = tokio::fs::metadata(destination).await {
        if (existing.dev(), existing.ino()) == (meta.dev(), meta.ino()) {
            return Err(OpError::SameFile {
                original: source.to_path_buf(),
                destination: destination.to_path_buf(),
            });
        }
    }

    let mut dst = File::create(destination).await.map_err(OpError::io("create", destination))?;
    let copied = tokio::io::copy(&mut src, &mut dst)
        .await
        .map_err(OpError::io("copy into", destination))?;
    dst.flush().await.map_err(OpError::io("flush", destination))?;
    Ok(copied)
}

#[cfg(test)]
#[path = "copy_tests.rs"]
mod tests;
