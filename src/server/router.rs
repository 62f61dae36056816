//! Session routing
//!
//! Maps an identity to a session rooted at `<users_root>/<username>` and
//! drives the lifecycle `Unauthenticated → Authenticated → Active →
//! Terminated`. The credential store and the active-session registry are
//! the only state shared between sessions; both sit behind a mutex.

use log::{info, warn};
use std::path::PathBuf;
use tokio::sync::Mutex;

use crate::auth::{self, AuthOutcome, CredentialStore};
use crate::client::registry::ActiveSessions;
use crate::client::{Session, SessionState};
use crate::config::ShellConfig;
use crate::error::{AuthError, ShellError};

pub struct SessionRouter {
    users_root: PathBuf,
    quota: Option<u64>,
    max_username_length: usize,
    credentials: Mutex<Box<dyn CredentialStore>>,
    active: Mutex<ActiveSessions>,
}

impl SessionRouter {
    /// Builds a router, creating the users root if it does not exist.
    pub fn new(config: &ShellConfig, credentials: Box<dyn CredentialStore>) -> Result<Self, ShellError> {
        let users_root = config.users_root_path();
        std::fs::create_dir_all(&users_root)?;
        let users_root = users_root.canonicalize()?;
        info!("Users root directory: {}", users_root.display());

        Ok(Self {
            users_root,
            quota: config.quota_bytes,
            max_username_length: config.max_username_length,
            credentials: Mutex::new(credentials),
            active: Mutex::new(ActiveSessions::new(config.max_sessions)),
        })
    }

    /// Home directory for `username`.
    pub fn user_root(&self, username: &str) -> PathBuf {
        self.users_root.join(username)
    }

    /// `Unauthenticated → Authenticated`.
    ///
    /// Unknown users are registered with the supplied password. A wrong
    /// password for a known user moves the state to `Terminated`. Malformed
    /// input leaves the state unchanged so the caller may ask again.
    pub async fn login(
        &self,
        state: &mut SessionState,
        username: &str,
        password: &str,
    ) -> Result<AuthOutcome, AuthError> {
        if !matches!(state, SessionState::Unauthenticated) {
            return Err(AuthError::InvalidState(format!(
                "login attempted while {}",
                state.name()
            )));
        }

        auth::validate_username(username, self.max_username_length)?;
        auth::validate_password(password, self.max_username_length)?;

        let outcome = {
            let mut credentials = self.credentials.lock().await;
            auth::check_credentials(credentials.as_mut(), username, password)
        };

        match outcome {
            Ok(outcome) => {
                *state = SessionState::Authenticated(username.to_string());
                Ok(outcome)
            }
            Err(e) => {
                if matches!(e, AuthError::WrongCredential(_)) {
                    *state = SessionState::Terminated;
                }
                Err(e)
            }
        }
    }

    /// `Authenticated → Active`: opens the user's home and claims it.
    ///
    /// On failure the state becomes `Terminated`.
    pub async fn activate(&self, state: &mut SessionState) -> Result<(), ShellError> {
        let username = match std::mem::replace(state, SessionState::Terminated) {
            SessionState::Authenticated(username) => username,
            other => {
                let name = other.name();
                *state = other;
                return Err(AuthError::InvalidState(format!("activation attempted while {name}")).into());
            }
        };

        self.active.lock().await.claim(&username)?;

        match Session::open(&username, &self.user_root(&username), self.quota) {
            Ok(session) => {
                info!(
                    "Session opened for {} (quota: {})",
                    username,
                    self.quota
                        .map_or_else(|| "unlimited".to_string(), |q| format!("{q}B"))
                );
                *state = SessionState::Active(session);
                Ok(())
            }
            Err(e) => {
                self.active.lock().await.release(&username);
                Err(e.into())
            }
        }
    }

    /// `* → Terminated`, releasing the user's root if the session was active.
    pub async fn terminate(&self, state: &mut SessionState) {
        if let SessionState::Active(session) = std::mem::replace(state, SessionState::Terminated) {
            if self.active.lock().await.release(session.username()) {
                info!("Session closed for {}", session.username());
            } else {
                warn!("Session for {} was not registered", session.username());
            }
        }
    }

    /// Number of sessions currently active.
    pub async fn active_count(&self) -> usize {
        self.active.lock().await.len()
    }
}
