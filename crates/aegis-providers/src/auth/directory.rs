//! Directory identity provider
//!
//! LDAP-like provider backed by an in-memory directory of salted password
//! digests. Accounts are provisioned by administrators, so self-service
//! registration and activation are rejected with the matching
//! `*_NOT_SUPPORTED` codes.

use crate::auth::issue_session;
use crate::constants::{
    DEFAULT_DIRECTORY_BASE_DN, ISSUED_TOKEN_TTL_SECS, SETTING_BASE_DN, SETTING_TOKEN_TTL_SECS,
};
use crate::utils::PasswordDigest;
use aegis_domain::error::{AuthError, AuthErrorCode, AuthResult};
use aegis_domain::ports::AuthProvider;
use aegis_domain::value_objects::{
    AuthCredentials, AuthSession, AuthUser, ProviderCapability, ProviderPerformanceMetrics,
    ProviderType,
};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
struct DirectoryEntry {
    user: AuthUser,
    digest: PasswordDigest,
}

/// In-memory directory provider
pub struct DirectoryAuthProvider {
    name: String,
    base_dn: RwLock<String>,
    token_ttl_secs: AtomicI64,
    entries: DashMap<String, DirectoryEntry>,
    reachable: AtomicBool,
    active_binds: AtomicU32,
    started_at: Mutex<Option<Instant>>,
    performance: Mutex<ProviderPerformanceMetrics>,
}

impl DirectoryAuthProvider {
    /// Empty, reachable directory
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            base_dn: RwLock::new(DEFAULT_DIRECTORY_BASE_DN.to_string()),
            token_ttl_secs: AtomicI64::new(ISSUED_TOKEN_TTL_SECS),
            entries: DashMap::new(),
            reachable: AtomicBool::new(true),
            active_binds: AtomicU32::new(0),
            started_at: Mutex::new(None),
            performance: Mutex::new(ProviderPerformanceMetrics::default()),
        }
    }

    /// Provision an account
    pub fn add_user(&self, username: &str, password: &str, email: Option<&str>) -> AuthUser {
        let dn = format!("uid={username},{}", self.base_dn());
        let mut user = AuthUser::new(dn.clone(), username).with_role("directory-user");
        user.email = email.map(str::to_string);
        user.attributes.insert("dn".to_string(), dn);

        self.entries.insert(
            username.to_lowercase(),
            DirectoryEntry {
                user: user.clone(),
                digest: PasswordDigest::new(password),
            },
        );
        user
    }

    /// Remove an account; returns whether it existed
    pub fn remove_user(&self, username: &str) -> bool {
        self.entries.remove(&username.to_lowercase()).is_some()
    }

    /// Simulate the directory server going away or coming back
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Base DN under which users live
    pub fn base_dn(&self) -> String {
        self.base_dn
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sessions bound since the last sign out
    pub fn active_binds(&self) -> u32 {
        self.active_binds.load(Ordering::SeqCst)
    }

    fn ensure_reachable(&self) -> AuthResult<()> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AuthError::new(
                AuthErrorCode::ProviderError,
                format!("Directory {} is unreachable", self.name),
            ))
        }
    }

    fn bind(&self, credentials: &AuthCredentials) -> AuthResult<AuthUser> {
        self.ensure_reachable()?;

        let (Some(username), Some(password)) = (
            credentials.username.as_deref().filter(|u| !u.is_empty()),
            credentials.password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(AuthError::new(
                AuthErrorCode::MissingCredentials,
                "Directory authentication requires a username and password",
            ));
        };

        let entry = self
            .entries
            .get(&username.to_lowercase())
            .map(|e| e.value().clone());
        match entry {
            Some(entry) if entry.digest.verify(password) => Ok(entry.user),
            _ => {
                debug!(provider = %self.name, "Directory bind rejected");
                Err(AuthError::credentials_invalid())
            }
        }
    }
}

impl std::fmt::Debug for DirectoryAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryAuthProvider")
            .field("name", &self.name)
            .field("base_dn", &self.base_dn())
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthProvider for DirectoryAuthProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::Ldap
    }

    async fn authenticate(&self, credentials: &AuthCredentials) -> AuthResult<AuthSession> {
        let started = Instant::now();
        let outcome = self.bind(credentials);
        self.performance
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(outcome.is_ok(), started.elapsed());

        let user = outcome?;
        self.active_binds.fetch_add(1, Ordering::SeqCst);
        Ok(issue_session(
            user,
            ProviderType::Ldap,
            &self.name,
            self.token_ttl_secs.load(Ordering::SeqCst),
        ))
    }

    async fn validate_session(&self) -> AuthResult<bool> {
        Ok(self.reachable.load(Ordering::SeqCst))
    }

    async fn configure(&self, settings: &HashMap<String, Value>) -> AuthResult<()> {
        if let Some(value) = settings.get(SETTING_BASE_DN) {
            let base_dn = value
                .as_str()
                .filter(|dn| !dn.trim().is_empty())
                .ok_or_else(|| AuthError::validation("base_dn must be a non-empty string"))?;
            *self.base_dn.write().unwrap_or_else(PoisonError::into_inner) = base_dn.to_string();
        }
        if let Some(value) = settings.get(SETTING_TOKEN_TTL_SECS) {
            let ttl = value
                .as_i64()
                .filter(|ttl| *ttl > 0)
                .ok_or_else(|| AuthError::validation("token_ttl_secs must be a positive integer"))?;
            self.token_ttl_secs.store(ttl, Ordering::SeqCst);
        }
        info!(provider = %self.name, base_dn = %self.base_dn(), "Directory provider configured");
        Ok(())
    }

    fn capabilities(&self) -> Vec<ProviderCapability> {
        vec![
            ProviderCapability::Authenticate,
            ProviderCapability::SessionValidation,
            ProviderCapability::Signout,
        ]
    }

    async fn initialize(&self) -> AuthResult<()> {
        self.ensure_reachable()?;
        *self.started_at.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
        Ok(())
    }

    fn performance_metrics(&self) -> ProviderPerformanceMetrics {
        self.performance
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn reset_performance_metrics(&self) {
        *self.performance.lock().unwrap_or_else(PoisonError::into_inner) =
            ProviderPerformanceMetrics::default();
    }

    fn is_initialized(&self) -> bool {
        self.started_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn uptime(&self) -> Duration {
        self.started_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map_or(Duration::ZERO, |at| at.elapsed())
    }

    async fn shutdown(&self, _timeout: Duration) -> AuthResult<()> {
        let binds = self.active_binds.swap(0, Ordering::SeqCst);
        if binds > 0 {
            warn!(provider = %self.name, binds, "Directory shut down with active binds");
        }
        *self.started_at.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    async fn signout(&self) -> AuthResult<()> {
        self.active_binds.store(0, Ordering::SeqCst);
        Ok(())
    }
}
