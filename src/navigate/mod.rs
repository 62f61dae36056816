//! Navigate module
//!
//! Path resolution inside a user's sandbox, and changing the session's
//! current directory.

mod operations;
pub mod resolver;

// Re-export public types and functions
pub use operations::change_directory;
pub use resolver::{ResolvedPath, resolve, resolve_from_root};
