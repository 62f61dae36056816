//! Server core functionality
//!
//! Session routing and the console/TCP front ends that feed it.

pub mod core;
pub mod router;

pub use core::Server;
pub use router::SessionRouter;
