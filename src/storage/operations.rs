//! Storage operations
//!
//! The sandboxed mutation and read primitives behind the shell commands.
//! Every function takes paths that were already confined by the resolver
//! and checks its own existence precondition at call time. Writes consult
//! the quota before touching the disk.

use log::{error, info};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::error::FsError;
use crate::navigate::ResolvedPath;
use crate::storage::filesystem::{copy_tree, entry_exists, path_size};
use crate::storage::quota::ensure_space;

/// Creates a directory, including missing parents
pub fn make_dir(path: &ResolvedPath) -> Result<(), FsError> {
    if entry_exists(path.as_path()) {
        return Err(FsError::AlreadyExists(path.virtual_path()));
    }

    fs::create_dir_all(path)?;
    info!("Created directory {} (real: {})", path, path.as_path().display());
    Ok(())
}

/// Creates an empty regular file
pub fn make_file(path: &ResolvedPath) -> Result<(), FsError> {
    if entry_exists(path.as_path()) {
        return Err(FsError::AlreadyExists(path.virtual_path()));
    }
    require_parent_dir(path)?;

    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => {
            info!("Created file {} (real: {})", path, path.as_path().display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            Err(FsError::AlreadyExists(path.virtual_path()))
        }
        Err(e) => Err(FsError::from(e)),
    }
}

/// Returns the full contents of a regular file
pub fn read_file(path: &ResolvedPath) -> Result<String, FsError> {
    require_file(path)?;
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Checks that `path` is an existing regular file that can take appended text
pub fn require_file(path: &ResolvedPath) -> Result<(), FsError> {
    if path.as_path().is_file() {
        Ok(())
    } else {
        Err(FsError::FileNotExist(path.virtual_path()))
    }
}

/// Appends `text` to an existing file, or rejects it whole if the quota would be exceeded.
///
/// Returns the number of bytes written.
pub fn append_file(
    root: &Path,
    quota: Option<u64>,
    path: &ResolvedPath,
    text: &str,
) -> Result<u64, FsError> {
    require_file(path)?;

    let bytes = text.len() as u64;
    ensure_space(root, quota, bytes)?;

    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(text.as_bytes())?;
    file.flush()?;

    info!("Appended {} bytes to {}", bytes, path);
    Ok(bytes)
}

/// Deletes a file, or a directory recursively
pub fn delete(path: &ResolvedPath) -> Result<(), FsError> {
    if path.is_root() {
        return Err(FsError::InvalidTarget(path.virtual_path()));
    }

    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(FsError::NotExist(path.virtual_path()));
        }
        Err(e) => return Err(FsError::from(e)),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => {
            info!("Deleted {} (real: {})", path, path.as_path().display());
            Ok(())
        }
        Err(e) => {
            error!(
                "Failed to delete {} (real: {}): {}",
                path,
                path.as_path().display(),
                e
            );
            Err(FsError::from(e))
        }
    }
}

/// Copies a file or directory tree, subject to the quota.
///
/// A file copied onto an existing directory lands inside it; a directory
/// copy needs a destination that does not exist yet. Returns where the
/// copy ended up.
pub fn copy(
    root: &Path,
    quota: Option<u64>,
    src: &ResolvedPath,
    dst: &ResolvedPath,
) -> Result<ResolvedPath, FsError> {
    let source = src.as_path();

    if source.is_file() {
        let target = into_directory(src, dst)?;
        if target == *src {
            return Err(FsError::InvalidTarget(target.virtual_path()));
        }
        require_parent_dir(&target)?;

        ensure_space(root, quota, path_size(source)?)?;
        let copied = fs::copy(source, &target)?;
        info!("Copied {} to {} ({} bytes)", src, target, copied);
        Ok(target)
    } else if source.is_dir() {
        if entry_exists(dst.as_path()) {
            return Err(FsError::AlreadyExists(dst.virtual_path()));
        }
        if dst.is_within(src) {
            return Err(FsError::InvalidTarget(dst.virtual_path()));
        }
        require_parent_dir(dst)?;

        ensure_space(root, quota, path_size(source)?)?;
        match copy_tree(source, dst.as_path()) {
            Ok(copied) => {
                info!("Copied directory {} to {} ({} bytes)", src, dst, copied);
                Ok(dst.clone())
            }
            Err(e) => {
                error!("Directory copy {} -> {} failed: {}", src, dst, e);
                discard_partial_copy(dst);
                Err(FsError::from(e))
            }
        }
    } else {
        Err(FsError::NotExist(src.virtual_path()))
    }
}

/// Moves a file or directory. Moving onto an existing directory moves into it.
///
/// Returns where the source ended up.
pub fn move_path(src: &ResolvedPath, dst: &ResolvedPath) -> Result<ResolvedPath, FsError> {
    if !entry_exists(src.as_path()) {
        return Err(FsError::NotExist(src.virtual_path()));
    }
    if src.is_root() {
        return Err(FsError::InvalidTarget(src.virtual_path()));
    }

    let target = into_directory(src, dst)?;
    if target.is_within(src) {
        return Err(FsError::InvalidTarget(target.virtual_path()));
    }
    if entry_exists(target.as_path()) && (target.as_path().is_dir() || src.as_path().is_dir()) {
        return Err(FsError::AlreadyExists(target.virtual_path()));
    }
    require_parent_dir(&target)?;

    fs::rename(src, &target)?;
    info!("Moved {} to {}", src, target);
    Ok(target)
}

/// `dst/<name of src>` when `dst` is an existing directory, `dst` otherwise
fn into_directory(src: &ResolvedPath, dst: &ResolvedPath) -> Result<ResolvedPath, FsError> {
    if dst.as_path().is_dir() {
        dst.child_named_like(src)
            .ok_or_else(|| FsError::InvalidTarget(src.virtual_path()))
    } else {
        Ok(dst.clone())
    }
}

/// Removes whatever a failed directory copy left at `dst`; false if that failed too.
fn discard_partial_copy(dst: &ResolvedPath) -> bool {
    match fs::remove_dir_all(dst) {
        Ok(()) => true,
        Err(e) => {
            error!(
                "Failed to remove partial copy {} (real: {}): {}",
                dst,
                dst.as_path().display(),
                e
            );
            false
        }
    }
}

fn require_parent_dir(path: &ResolvedPath) -> Result<(), FsError> {
    match path.parent() {
        Some(parent) if !parent.as_path().is_dir() => {
            Err(FsError::DirNotExist(parent.virtual_path()))
        }
        _ => Ok(()),
    }
}
