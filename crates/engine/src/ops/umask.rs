// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scoped process umask.
//!
//! The file-creation mask is process-wide state. Holders of a guard are
//! serialized through one lock so two scopes never interleave their
//! save/restore.

use nix::sys::stat::{umask, Mode};
use parking_lot::{const_mutex, Mutex, MutexGuard};

static UMASK_LOCK: Mutex<()> = const_mutex(());

/// Clears the umask for as long as it lives, restoring the
/// previous mask on drop.
#[must_use = "the previous umask is restored as soon as the guard is dropped"]
pub struct UmaskGuard {
    previous: Mode,
    _lock: MutexGuard<'static, ()>,
}

impl UmaskGuard {
    /// Clear the umask so requested modes apply verbatim.
    pub fn clear() -> Self {
        let lock = UMASK_LOCK.lock();
        let previous = umask(Mode::empty());
        Self { previous, _lock: lock }
    }

    /// Mask in effect before this guard
    #[cfg(test)]
    pub(crate) fn previous(&self) -> Mode {
        self.previous
    }
}

impl Drop for UmaskGuard {
    fn drop(&mut self) {
        umask(self.previous);
    }
}
