// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem procedures behind each job operation.

mod copy;
mod merge;
mod mkdir;
mod remove;
mod rename;
mod umask;

pub use copy::copy_file;
pub use merge::{merge_parts, MergeOutcome, PARTIAL_SUFFIX};
pub use mkdir::make_dir;
pub use remove::{is_protected, remove_path, Removal};
pub use rename::move_path;
