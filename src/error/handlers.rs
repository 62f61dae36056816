//! Error handlers
//!
//! Routes errors to the log at the right level and renders the line a
//! peer sees. No error here is fatal to the process.

use crate::error::types::{AuthError, FsError, ShellError};
use log::{error, warn};

/// Log a shell error
pub fn handle_error(err: &ShellError) {
    match err {
        ShellError::Fs(e) => handle_fs_error(e),
        ShellError::Auth(AuthError::Store(e)) => error!("Credential store failure: {}", e),
        ShellError::Auth(e) => warn!("Authentication failure: {}", e),
        _ => error!("Shell error: {}", err),
    }
}

/// Log a filesystem error: user mistakes at `warn`, host failures at `error`
pub fn handle_fs_error(err: &FsError) {
    if err.is_expected() {
        warn!("Rejected operation: {}", err);
    } else {
        error!("File system failure: {}", err);
    }
}

/// Render a filesystem error as the line shown to the user
pub fn error_reply(err: &FsError) -> String {
    match err {
        // Host I/O details stay in the log
        FsError::Io(e) => format!("Error: operation failed ({})\r\n", e.kind()),
        _ => format!("Error: {}\r\n", err),
    }
}

/// Render an authentication error as the line shown to the user
pub fn auth_reply(err: &AuthError) -> String {
    match err {
        AuthError::Store(_) => "Error: login temporarily unavailable\r\n".to_string(),
        _ => format!("Error: {}\r\n", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_reply_hides_details() {
        let err = FsError::Io(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "/srv/users/alice/secret",
        ));
        let reply = error_reply(&err);
        assert!(!reply.contains("/srv/users"));
        assert!(reply.starts_with("Error:"));
    }

    #[test]
    fn test_quota_reply_mentions_numbers() {
        let err = FsError::QuotaExceeded {
            requested: 50,
            available: 10,
            limit: 100,
        };
        let reply = error_reply(&err);
        assert!(reply.contains("50B"));
        assert!(reply.contains("10B of 100B"));
    }

    #[test]
    fn test_wrong_credential_reply() {
        let reply = auth_reply(&AuthError::WrongCredential("alice".into()));
        assert_eq!(reply, "Error: Wrong password for user: alice\r\n");
    }
}
