//! Navigation operations implementation

use crate::error::FsError;
use crate::navigate::ResolvedPath;
use log::debug;

/// Validates a change-directory target and returns the new working directory.
///
/// The target must be an existing directory; the caller stores the result
/// as its session `cwd`.
pub fn change_directory(target: &ResolvedPath) -> Result<ResolvedPath, FsError> {
    if !target.as_path().is_dir() {
        return Err(FsError::DirNotExist(target.virtual_path()));
    }

    debug!("Changed directory to {}", target);
    Ok(target.clone())
}
