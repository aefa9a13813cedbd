// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use crate::error::OpError;

/// Atomically rename `source` to `destination` (same filesystem only).
pub async fn move_path(source: &Path, destination: &Path) -> Result<(), OpError> {
    tokio::fs::rename(source, destination).await.map_err(OpError::io("move", source))
}
