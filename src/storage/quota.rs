//! Quota tracking
//!
//! Usage is recomputed from disk on every call; nothing is cached.

use crate::error::FsError;
use crate::storage::filesystem::dir_size;
use log::warn;
use std::io;
use std::path::Path;

/// Outcome of a free-space query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeSpace {
    Limited { available: u64, limit: u64 },
    /// No quota is configured for the session.
    Unlimited,
}

/// Recursive byte usage of the session root.
pub fn usage(root: &Path) -> io::Result<u64> {
    dir_size(root)
}

fn exceeds(used: u64, extra: u64, limit: u64) -> bool {
    used.saturating_add(extra) > limit
}

/// True iff `quota` is set and writing `extra` bytes would push usage above it.
pub fn would_exceed(root: &Path, quota: Option<u64>, extra: u64) -> io::Result<bool> {
    match quota {
        Some(limit) => Ok(exceeds(usage(root)?, extra, limit)),
        None => Ok(false),
    }
}

/// Bytes left under `quota`, zero once the quota is used up.
pub fn remaining(root: &Path, quota: u64) -> io::Result<u64> {
    Ok(quota.saturating_sub(usage(root)?))
}

/// Rejects a prospective write of `extra` bytes before anything is written.
pub fn ensure_space(root: &Path, quota: Option<u64>, extra: u64) -> Result<(), FsError> {
    let Some(limit) = quota else {
        return Ok(());
    };

    let used = usage(root)?;
    if exceeds(used, extra, limit) {
        let available = limit.saturating_sub(used);
        warn!(
            "Quota exceeded under {}: {} requested, {} of {} available",
            root.display(),
            extra,
            available,
            limit
        );
        return Err(FsError::QuotaExceeded {
            requested: extra,
            available,
            limit,
        });
    }
    Ok(())
}

/// Free-space report for the session root.
pub fn free_space(root: &Path, quota: Option<u64>) -> io::Result<FreeSpace> {
    match quota {
        Some(limit) => Ok(FreeSpace::Limited {
            available: remaining(root, limit)?,
            limit,
        }),
        None => Ok(FreeSpace::Unlimited),
    }
}
