//! File system helpers
//!
//! Recursive sizing and copying. Symbolic links are never followed: they
//! count as zero bytes and are skipped when copying, so a link cannot pull
//! data from outside the sandbox into usage or into a copy.

use log::warn;
use std::fs;
use std::io;
use std::path::Path;

/// Recursive byte size of every regular file under `path`.
pub fn dir_size(path: &Path) -> io::Result<u64> {
    let mut total = 0;
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            total += dir_size(&entry.path())?;
        } else if file_type.is_file() {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}

/// Size of a single file, or the recursive size of a directory.
pub fn path_size(path: &Path) -> io::Result<u64> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        dir_size(path)
    } else if metadata.is_file() {
        Ok(metadata.len())
    } else {
        Ok(0)
    }
}

/// Whether anything, including a dangling symlink, sits at `path`.
pub fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Copies the directory tree at `src` to `dst`, which must not exist yet.
///
/// Returns the number of file bytes copied.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<u64> {
    fs::create_dir(dst)?;

    let mut copied = 0;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let target = dst.join(entry.file_name());

        if file_type.is_dir() {
            copied += copy_tree(&entry.path(), &target)?;
        } else if file_type.is_file() {
            copied += fs::copy(entry.path(), &target)?;
        } else {
            warn!("Skipping non-regular entry {}", entry.path().display());
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dir_size_sums_nested_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("top.txt"), "12345").unwrap();
        fs::write(dir.path().join("a/mid.txt"), "123").unwrap();
        fs::write(dir.path().join("a/b/deep.txt"), "12").unwrap();

        assert_eq!(dir_size(dir.path()).unwrap(), 10);
        assert_eq!(path_size(&dir.path().join("a")).unwrap(), 5);
        assert_eq!(path_size(&dir.path().join("top.txt")).unwrap(), 5);
    }

    #[test]
    fn test_empty_directories_are_free() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("x/y/z")).unwrap();
        assert_eq!(dir_size(dir.path()).unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_followed() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("big"), vec![0u8; 4096]).unwrap();

        let dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        assert_eq!(dir_size(dir.path()).unwrap(), 0);
        assert!(entry_exists(&dir.path().join("link")));
    }

    #[test]
    fn test_copy_tree_copies_everything() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("inner")).unwrap();
        fs::write(src.join("a.txt"), "hello").unwrap();
        fs::write(src.join("inner/b.txt"), "world!").unwrap();

        let dst = dir.path().join("dst");
        assert_eq!(copy_tree(&src, &dst).unwrap(), 11);
        assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "hello");
        assert_eq!(fs::read_to_string(dst.join("inner/b.txt")).unwrap(), "world!");
    }

    #[test]
    fn test_copy_tree_refuses_existing_destination() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::create_dir(dir.path().join("dst")).unwrap();
        assert!(copy_tree(&dir.path().join("src"), &dir.path().join("dst")).is_err());
    }
}
