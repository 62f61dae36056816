//! Client management system
//!
//! Per-user sessions, their lifecycle state, the active-session registry,
//! and the line loop that drives a session.

pub mod handler;
pub mod registry;
pub mod session;
pub mod state;

pub use handler::handle_client;
pub use session::Session;
pub use state::SessionState;
