//! Identity Provider Ports
//!
//! | Port | Description |
//! |------|-------------|
//! | [`AuthProvider`] | Capability contract every identity provider satisfies |

/// Identity provider capability contract
pub mod auth_provider;

pub use auth_provider::AuthProvider;
