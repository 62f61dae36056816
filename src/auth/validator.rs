//! Authentication validator
//!
//! Input sanitation for usernames and passwords, and the login decision:
//! unknown users are registered on first login, known users must present
//! the stored password.

use log::{info, warn};

use super::credentials::CredentialStore;
use crate::error::AuthError;

/// How a successful login came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// First login: the user was added to the store.
    Registered,
    /// Existing user, password matched.
    Authenticated,
}

/// Performs basic input sanitation to check for malicious or malformed input.
fn is_valid_input(input: &str, max_length: usize) -> bool {
    !input.trim().is_empty() && input.len() <= max_length && !input.contains(['\r', '\n', '\0'])
}

/// Validates that a username is safe to use as a directory name.
pub fn validate_username(username: &str, max_length: usize) -> Result<(), AuthError> {
    if !is_valid_input(username, max_length) {
        return Err(AuthError::MalformedInput("Invalid username format".into()));
    }

    if username.contains(['/', '\\'])
        || username.starts_with('.')
        || username.trim() != username
        || username.chars().any(char::is_control)
    {
        return Err(AuthError::InvalidUsername(username.to_string()));
    }

    Ok(())
}

/// Validates the shape of a password.
pub fn validate_password(password: &str, max_length: usize) -> Result<(), AuthError> {
    if !is_valid_input(password, max_length) {
        return Err(AuthError::MalformedInput("Invalid password format".into()));
    }
    Ok(())
}

/// Registers an unknown user, or checks a known user's password.
///
/// A mismatch is a `WrongCredential` error and leaves the store untouched.
pub fn check_credentials(
    store: &mut dyn CredentialStore,
    username: &str,
    password: &str,
) -> Result<AuthOutcome, AuthError> {
    if !store.exists(username) {
        store.add(username, password)?;
        info!("Registered new user {}", username);
        return Ok(AuthOutcome::Registered);
    }

    match store.get(username) {
        Some(stored) if stored == password => Ok(AuthOutcome::Authenticated),
        Some(_) => {
            warn!("Wrong password for user {}", username);
            Err(AuthError::WrongCredential(username.to_string()))
        }
        None => Err(AuthError::InvalidState(format!(
            "credential store lost user {username}"
        ))),
    }
}
