//! In-memory authentication repository
//!
//! Holds the current session, its refresh token and registered users for
//! the lifetime of the process. Nothing is persisted.

use aegis_domain::error::{Error, Result};
use aegis_domain::ports::AuthRepository;
use aegis_domain::value_objects::{AuthSession, AuthUser};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone)]
struct StoredUser {
    user: AuthUser,
    activation_code: Option<String>,
    resend_count: u32,
}

/// Process-local [`AuthRepository`]
#[derive(Debug, Default)]
pub struct InMemoryAuthRepository {
    session: RwLock<Option<AuthSession>>,
    refresh_token: RwLock<Option<String>>,
    /// Keyed by lowercased username
    users: DashMap<String, StoredUser>,
}

impl InMemoryAuthRepository {
    /// Empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending activation code of `identifier`
    pub fn activation_code(&self, identifier: &str) -> Option<String> {
        let key = self.resolve(identifier)?;
        self.users.get(&key).and_then(|u| u.activation_code.clone())
    }

    /// Number of stored users
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    fn resolve(&self, identifier: &str) -> Option<String> {
        let key = identifier.to_lowercase();
        if self.users.contains_key(&key) {
            return Some(key);
        }
        self.users
            .iter()
            .find(|entry| {
                entry
                    .user
                    .email
                    .as_deref()
                    .is_some_and(|email| email.eq_ignore_ascii_case(identifier))
            })
            .map(|entry| entry.key().clone())
    }
}

#[async_trait]
impl AuthRepository for InMemoryAuthRepository {
    async fn store_session(&self, session: &AuthSession) -> Result<()> {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<AuthSession>> {
        Ok(self
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn remove_session(&self) -> Result<()> {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    async fn store_refresh_token(&self, token: &str) -> Result<()> {
        *self
            .refresh_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    async fn get_refresh_token(&self) -> Result<Option<String>> {
        Ok(self
            .refresh_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn clear(&self) -> Result<()> {
        self.remove_session().await?;
        *self
            .refresh_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    async fn create_user(&self, user: &AuthUser, activation_code: Option<&str>) -> Result<()> {
        let key = user.username.to_lowercase();
        if self.users.contains_key(&key) {
            return Err(Error::invalid_argument(format!(
                "User {} already exists",
                user.username
            )));
        }
        self.users.insert(
            key,
            StoredUser {
                user: user.clone(),
                activation_code: activation_code.map(str::to_string),
                resend_count: 0,
            },
        );
        Ok(())
    }

    async fn get_user(&self, identifier: &str) -> Result<Option<AuthUser>> {
        Ok(self
            .resolve(identifier)
            .and_then(|key| self.users.get(&key).map(|u| u.user.clone())))
    }

    async fn activate_user(&self, identifier: &str) -> Result<AuthUser> {
        let key = self
            .resolve(identifier)
            .ok_or_else(|| Error::not_found(format!("user {identifier}")))?;
        let mut stored = self
            .users
            .get_mut(&key)
            .ok_or_else(|| Error::not_found(format!("user {identifier}")))?;
        stored.user.is_active = true;
        stored.activation_code = None;
        Ok(stored.user.clone())
    }

    async fn resend_activation_code(&self, identifier: &str, code: &str) -> Result<u32> {
        let key = self
            .resolve(identifier)
            .ok_or_else(|| Error::not_found(format!("user {identifier}")))?;
        let mut stored = self
            .users
            .get_mut(&key)
            .ok_or_else(|| Error::not_found(format!("user {identifier}")))?;
        stored.activation_code = Some(code.to_string());
        stored.resend_count += 1;
        Ok(stored.resend_count)
    }
}
