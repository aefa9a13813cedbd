// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fs::DirBuilder;
use std::os::unix::fs::DirBuilderExt;
use std::path::Path;

use super::umask::UmaskGuard;
use crate::error::OpError;

/// Create `path` and any missing parents with exactly `mode`.
///
/// The umask is cleared only around the creation call. Directories that
/// already exist keep their current mode.
pub async fn make_dir(path: &Path, mode: u32) -> Result<(), OpError> {
    let target = path.to_path_buf();
    let created = tokio::task::spawn_blocking(move || {
        let _umask = UmaskGuard::clear();
        DirBuilder::new().recursive(true).mode(mode).create(&target)
    })
    .await
    .map_err(|e| OpError::Task(e.to_string()))?;
    created.map_err(OpError::io("create directory", path))
}

#[cfg(test)]
#[path = "mkdir_tests.rs"]
mod tests;
