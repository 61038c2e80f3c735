//! # Domain Layer
//!
//! Core authentication types and the contracts the rest of the workspace is
//! built against. This crate has no dependency on any other `aegis-*` crate.
//!
//! ## Module Categories
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Infrastructure `Error` plus the user-visible `AuthError` taxonomy |
//! | [`value_objects`] | Credentials, users, tokens, sessions, health and validation results |
//! | [`events`] | Authentication events emitted through the logger port |
//! | [`ports`] | Provider capability contract and collaborator interfaces |
//! | [`constants`] | Domain-level limits and defaults |

pub mod constants;
pub mod error;
pub mod events;
pub mod ports;
pub mod value_objects;

// Re-export commonly used types
pub use error::{AuthError, AuthErrorCode, AuthResult, Error, Result};
pub use events::{AuthEvent, AuthEventKind, LogLevel};
pub use value_objects::*;
