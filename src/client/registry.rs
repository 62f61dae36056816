//! Client registry
//!
//! Tracks which users currently hold an active session. A root may only be
//! driven by one session at a time, and the total is capped.

use crate::error::AuthError;
use std::collections::HashSet;

/// Registry of users with an active session
#[derive(Debug)]
pub struct ActiveSessions {
    users: HashSet<String>,
    max_sessions: usize,
}

impl ActiveSessions {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            users: HashSet::new(),
            max_sessions,
        }
    }

    /// Claims the user's root for a new session.
    pub fn claim(&mut self, username: &str) -> Result<(), AuthError> {
        if self.users.contains(username) {
            return Err(AuthError::SessionActive(username.to_string()));
        }
        if self.users.len() >= self.max_sessions {
            return Err(AuthError::TooManySessions(self.max_sessions));
        }
        self.users.insert(username.to_string());
        Ok(())
    }

    pub fn release(&mut self, username: &str) -> bool {
        self.users.remove(username)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }
}
