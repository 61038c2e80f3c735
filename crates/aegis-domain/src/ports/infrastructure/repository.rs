//! Repository Port
//!
//! Persistence of the current session, its refresh token and users awaiting
//! activation. The storage format is entirely up to the implementation.

use crate::error::Result;
use crate::value_objects::{AuthSession, AuthUser};
use async_trait::async_trait;

/// Authentication state persistence
#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Persist the current session, replacing any previous one
    async fn store_session(&self, session: &AuthSession) -> Result<()>;

    /// Current session, if any
    async fn get_session(&self) -> Result<Option<AuthSession>>;

    /// Drop the current session
    async fn remove_session(&self) -> Result<()>;

    /// Persist the refresh token of the current session
    async fn store_refresh_token(&self, token: &str) -> Result<()>;

    /// Refresh token of the current session
    async fn get_refresh_token(&self) -> Result<Option<String>>;

    /// Drop session and refresh token
    async fn clear(&self) -> Result<()>;

    /// Store a newly registered user with its pending activation code
    async fn create_user(&self, user: &AuthUser, activation_code: Option<&str>) -> Result<()>;

    /// Look up a user by username or email
    async fn get_user(&self, identifier: &str) -> Result<Option<AuthUser>>;

    /// Mark a user active and drop its pending code
    ///
    /// Fails with [`Error::NotFound`](crate::error::Error::NotFound) for unknown users.
    async fn activate_user(&self, identifier: &str) -> Result<AuthUser>;

    /// Replace the pending activation code and return the resend count
    async fn resend_activation_code(&self, identifier: &str, code: &str) -> Result<u32>;
}
