//! Shell command protocol
//!
//! Handles command parsing, dispatch, and reply rendering.

pub mod commands;
pub mod handlers;

pub use commands::{Command, CommandResult, CommandStatus, parse_command};
pub use handlers::{handle_command, handle_content};
