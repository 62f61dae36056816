//! Module `state`
//!
//! The session lifecycle:
//! `Unauthenticated → Authenticated → Active → Terminated`.
//! Transitions are driven by the router; this type only records where a
//! connection currently is.

use crate::client::Session;

/// Where a connection is in its lifecycle.
#[derive(Debug, Default)]
pub enum SessionState {
    /// Waiting for credentials.
    #[default]
    Unauthenticated,
    /// Credentials accepted; the home directory is not open yet.
    Authenticated(String),
    /// Accepting commands.
    Active(Session),
    /// Finished, either by exit or by a rejected login.
    Terminated,
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active(_))
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, SessionState::Terminated)
    }

    /// Username once known, in any state past authentication.
    pub fn username(&self) -> Option<&str> {
        match self {
            SessionState::Authenticated(name) => Some(name),
            SessionState::Active(session) => Some(session.username()),
            _ => None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Active(session) => Some(session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        match self {
            SessionState::Active(session) => Some(session),
            _ => None,
        }
    }

    /// Short state name for logs
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticated(_) => "authenticated",
            SessionState::Active(_) => "active",
            SessionState::Terminated => "terminated",
        }
    }
}
