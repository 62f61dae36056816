//! Authentication system
//!
//! Handles credential storage, input validation, and the login decision.

pub mod credentials;
pub mod validator;

pub use credentials::{CredentialStore, JsonCredentialStore, MemoryCredentialStore};
pub use validator::{AuthOutcome, check_credentials, validate_password, validate_username};
