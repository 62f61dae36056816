//! File system storage management
//!
//! Sandboxed file operations, recursive sizing, and quota enforcement.

pub mod filesystem;
pub mod operations;
pub mod quota;

// Re-export commonly used types
pub use quota::FreeSpace;
