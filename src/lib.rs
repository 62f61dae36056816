//! RAX FS Shell
//!
//! A per-user, quota-limited virtual filesystem shell. Every user is
//! confined to a private root under a shared users directory and works in
//! it through a small command set.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod navigate;
pub mod protocol;
pub mod server;
pub mod storage;

pub use server::{Server, SessionRouter};
