//! Sandbox path resolution
//!
//! Turns user-typed path text into a [`ResolvedPath`] confined to the
//! session root. Resolution is purely syntactic: nothing here touches the
//! filesystem, and existence is left to the operation that consumes the path.

use std::fmt;
use std::path::{Path, PathBuf};

const PARENT: &str = "..";
const CURRENT: &str = ".";

/// An absolute path that is the session root or lies beneath it.
///
/// Only [`resolve`] and [`ResolvedPath::root`] build one. The path is kept
/// as root plus normalized components, none of which is empty, `.` or `..`,
/// so the joined path can never climb above the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    real: PathBuf,
    components: Vec<String>,
}

impl ResolvedPath {
    /// The session root itself.
    pub fn root(root: &Path) -> Self {
        Self {
            real: root.to_path_buf(),
            components: Vec::new(),
        }
    }

    fn from_components(root: &Path, components: Vec<String>) -> Self {
        let mut real = root.to_path_buf();
        real.extend(&components);
        Self { real, components }
    }

    /// The real filesystem path.
    pub fn as_path(&self) -> &Path {
        &self.real
    }

    /// The path as the user sees it, e.g. `/docs/a.txt`.
    pub fn virtual_path(&self) -> String {
        format!("/{}", self.components.join("/"))
    }

    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// Last component, `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    /// Parent directory, `None` for the root.
    pub fn parent(&self) -> Option<ResolvedPath> {
        let (_, rest) = self.components.split_last()?;
        let mut real = self.real.clone();
        real.pop();
        Some(Self {
            real,
            components: rest.to_vec(),
        })
    }

    /// Child of this path named after the last component of `other`.
    pub fn child_named_like(&self, other: &ResolvedPath) -> Option<ResolvedPath> {
        let name = other.file_name()?;
        let mut components = self.components.clone();
        components.push(name.to_string());
        Some(Self {
            real: self.real.join(name),
            components,
        })
    }

    /// True when `self` equals `ancestor` or lies beneath it.
    pub fn is_within(&self, ancestor: &ResolvedPath) -> bool {
        self.components.starts_with(&ancestor.components)
    }

    /// Where `self` ends up after the subtree at `from` moves to `to`.
    ///
    /// `None` when `self` is not inside `from`.
    pub fn rebased(&self, from: &ResolvedPath, to: &ResolvedPath) -> Option<ResolvedPath> {
        let tail = self.components.strip_prefix(from.components.as_slice())?;
        let mut real = to.real.clone();
        real.extend(tail);
        let mut components = to.components.clone();
        components.extend_from_slice(tail);
        Some(Self { real, components })
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.real
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.virtual_path())
    }
}

/// Resolves `input` against the session `root` and current directory `cwd`.
///
/// Three cases, checked in order:
///
/// 1. `input` starts with `/`: the rest is walked from `root`.
/// 2. `input` contains a `..` segment: components are walked from `cwd`;
///    `..` pops one level while below `root` and clamps at `root` otherwise.
/// 3. anything else is joined onto `cwd`.
///
/// The `..` clamp applies to the root-relative case too, so `/a/../../b`
/// and `../../b` from the root both land on `root/b`. Empty input resolves
/// to `cwd`. This function never fails.
pub fn resolve(root: &Path, cwd: &ResolvedPath, input: &str) -> ResolvedPath {
    let input = input.trim();

    let (mut stack, rest) = match input.strip_prefix('/') {
        Some(rest) => (Vec::new(), rest),
        None => (cwd.components.clone(), input),
    };

    for part in rest.split('/') {
        match part {
            "" | CURRENT => {}
            PARENT => {
                // Popping an empty stack would leave the root: stay put
                stack.pop();
            }
            name => stack.push(name.to_string()),
        }
    }

    ResolvedPath::from_components(root, stack)
}

/// Resolves `input` relative to the root, as if `cwd` were the root.
pub fn resolve_from_root(root: &Path, input: &str) -> ResolvedPath {
    resolve(root, &ResolvedPath::root(root), input)
}
