//! Shared helpers for provider implementations

pub mod secrets;

pub use secrets::{PasswordDigest, generate_activation_code, generate_token};
