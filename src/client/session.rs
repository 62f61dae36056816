//! Client session
//!
//! A `Session` is one user's view of their sandbox: the root, the quota,
//! and the current directory. The current directory lives here, not in the
//! process, so sessions never disturb each other.

use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::FsError;
use crate::navigate::{self, ResolvedPath};
use crate::storage::{FreeSpace, operations, quota};

/// Runtime state of an authenticated user
#[derive(Debug)]
pub struct Session {
    username: String,
    root: PathBuf,
    quota: Option<u64>,
    cwd: ResolvedPath,
}

impl Session {
    /// Opens a session rooted at `root`, creating the directory if needed.
    pub fn open(username: &str, root: &Path, quota: Option<u64>) -> Result<Self, FsError> {
        if !root.is_dir() {
            fs::create_dir_all(root)?;
            info!("Created home directory {} for {}", root.display(), username);
        }
        let root = root.canonicalize()?;

        Ok(Self {
            username: username.to_string(),
            cwd: ResolvedPath::root(&root),
            root,
            quota,
        })
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn quota(&self) -> Option<u64> {
        self.quota
    }

    pub fn cwd(&self) -> &ResolvedPath {
        &self.cwd
    }

    /// Prompt shown before each command, e.g. `alice:/docs$ `
    pub fn prompt(&self) -> String {
        format!("{}:{}$ ", self.username, self.cwd)
    }

    /// Resolves user path text against this session's root and cwd.
    pub fn resolve(&self, input: &str) -> ResolvedPath {
        navigate::resolve(&self.root, &self.cwd, input)
    }

    // --------------------
    // Operations
    // --------------------

    pub fn make_dir(&self, input: &str) -> Result<ResolvedPath, FsError> {
        let path = self.resolve(input);
        operations::make_dir(&path)?;
        Ok(path)
    }

    pub fn make_file(&self, input: &str) -> Result<ResolvedPath, FsError> {
        let path = self.resolve(input);
        operations::make_file(&path)?;
        Ok(path)
    }

    pub fn change_dir(&mut self, input: &str) -> Result<&ResolvedPath, FsError> {
        let target = self.resolve(input);
        self.cwd = navigate::change_directory(&target)?;
        Ok(&self.cwd)
    }

    pub fn read_file(&self, input: &str) -> Result<String, FsError> {
        operations::read_file(&self.resolve(input))
    }

    /// First half of a write: checks the target before the content line is read.
    pub fn begin_write(&self, input: &str) -> Result<ResolvedPath, FsError> {
        let path = self.resolve(input);
        operations::require_file(&path)?;
        Ok(path)
    }

    /// Second half of a write: appends `text` to a target from [`Session::begin_write`].
    pub fn append(&self, path: &ResolvedPath, text: &str) -> Result<u64, FsError> {
        operations::append_file(&self.root, self.quota, path, text)
    }

    pub fn delete(&mut self, input: &str) -> Result<ResolvedPath, FsError> {
        let path = self.resolve(input);
        operations::delete(&path)?;

        if self.cwd.is_within(&path) {
            self.cwd = path.parent().unwrap_or_else(|| ResolvedPath::root(&self.root));
        }
        Ok(path)
    }

    pub fn copy(&self, src: &str, dst: &str) -> Result<ResolvedPath, FsError> {
        operations::copy(&self.root, self.quota, &self.resolve(src), &self.resolve(dst))
    }

    pub fn move_path(&mut self, src: &str, dst: &str) -> Result<ResolvedPath, FsError> {
        let src = self.resolve(src);
        let target = operations::move_path(&src, &self.resolve(dst))?;

        if let Some(cwd) = self.cwd.rebased(&src, &target) {
            self.cwd = cwd;
        }
        Ok(target)
    }

    pub fn free(&self) -> Result<FreeSpace, FsError> {
        Ok(quota::free_space(&self.root, self.quota)?)
    }

    pub fn usage(&self) -> Result<u64, FsError> {
        Ok(quota::usage(&self.root)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open(dir: &TempDir, quota: Option<u64>) -> Session {
        Session::open("alice", &dir.path().join("alice"), quota).unwrap()
    }

    #[test]
    fn test_open_creates_root() {
        let dir = TempDir::new().unwrap();
        let session = open(&dir, None);
        assert!(session.root().is_dir());
        assert!(session.cwd().is_root());
        assert_eq!(session.prompt(), "alice:/$ ");
    }

    #[test]
    fn test_change_dir_updates_prompt() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir, None);
        session.make_dir("/docs/notes").unwrap();
        session.change_dir("docs/notes").unwrap();
        assert_eq!(session.prompt(), "alice:/docs/notes$ ");

        session.change_dir("../../../..").unwrap();
        assert!(session.cwd().is_root());
    }

    #[test]
    fn test_change_dir_failure_keeps_cwd() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir, None);
        session.make_dir("docs").unwrap();
        session.change_dir("docs").unwrap();
        assert!(session.change_dir("missing").is_err());
        assert_eq!(session.cwd().virtual_path(), "/docs");
    }

    #[test]
    fn test_relative_paths_follow_cwd() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir, None);
        session.make_dir("docs").unwrap();
        session.change_dir("docs").unwrap();
        session.make_file("a.txt").unwrap();
        assert!(session.root().join("docs/a.txt").is_file());
    }

    #[test]
    fn test_delete_cwd_moves_to_parent() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir, None);
        session.make_dir("/a/b").unwrap();
        session.change_dir("/a/b").unwrap();
        session.delete("/a").unwrap();
        assert!(session.cwd().is_root());
    }

    #[test]
    fn test_move_cwd_follows() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&dir, None);
        session.make_dir("/a/b").unwrap();
        session.change_dir("/a/b").unwrap();
        session.move_path("/a", "/z").unwrap();
        assert_eq!(session.cwd().virtual_path(), "/z/b");
        assert!(session.cwd().as_path().is_dir());
    }

    #[test]
    fn test_write_in_two_steps() {
        let dir = TempDir::new().unwrap();
        let session = open(&dir, Some(10));
        session.make_file("a.txt").unwrap();

        let target = session.begin_write("a.txt").unwrap();
        assert_eq!(session.append(&target, "hello").unwrap(), 5);
        assert_eq!(session.usage().unwrap(), 5);
        assert!(session.append(&target, "world!").is_err());
        assert_eq!(session.read_file("a.txt").unwrap(), "hello");
        assert!(matches!(
            session.begin_write("missing.txt"),
            Err(FsError::FileNotExist(_))
        ));
    }

    #[test]
    fn test_free() {
        let dir = TempDir::new().unwrap();
        assert_eq!(open(&dir, None).free().unwrap(), FreeSpace::Unlimited);

        let session = open(&dir, Some(100));
        assert_eq!(
            session.free().unwrap(),
            FreeSpace::Limited {
                available: 100,
                limit: 100
            }
        );
    }
}
