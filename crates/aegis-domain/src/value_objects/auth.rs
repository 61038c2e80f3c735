//! Authentication value objects

use crate::constants::DEFAULT_TOKEN_TYPE;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Identity provider kind
///
/// Providers are polymorphic over one capability contract; this tag is what
/// selection by type and statistics histograms key on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ProviderType {
    /// OAuth 2.0 / OpenID Connect
    OAuth,
    /// SAML 2.0
    Saml,
    /// LDAP / directory service
    Ldap,
    /// Bearer or API token
    Token,
    /// Local username/password accounts
    Local,
    /// Any other provider kind, by name
    Custom(String),
}

impl ProviderType {
    /// Lowercase identifier used in configuration and logs
    pub fn as_str(&self) -> &str {
        match self {
            Self::OAuth => "oauth",
            Self::Saml => "saml",
            Self::Ldap => "ldap",
            Self::Token => "token",
            Self::Local => "local",
            Self::Custom(name) => name.as_str(),
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "oauth" | "oidc" => Self::OAuth,
            "saml" => Self::Saml,
            "ldap" | "directory" => Self::Ldap,
            "token" => Self::Token,
            "local" => Self::Local,
            _ => Self::Custom(s.to_string()),
        })
    }
}

impl From<String> for ProviderType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<ProviderType> for String {
    fn from(kind: ProviderType) -> Self {
        kind.as_str().to_string()
    }
}

/// Provider selection priority, ordered `Backup < Normal < High < Critical`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderPriority {
    /// Only used when nothing better is available
    Backup,
    /// Default priority
    Normal,
    /// Preferred over normal providers
    High,
    /// Always preferred while enabled
    Critical,
}

impl FromStr for ProviderPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "backup" => Ok(Self::Backup),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(format!("unknown provider priority: {other}")),
        }
    }
}

impl Default for ProviderPriority {
    fn default() -> Self {
        Self::Normal
    }
}

/// Optional operations a provider may advertise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCapability {
    /// Credential authentication
    Authenticate,
    /// Session validity probing
    SessionValidation,
    /// Token refresh
    RefreshToken,
    /// Self-registration of new users
    Register,
    /// Account activation
    Activate,
    /// Provider-side sign out
    Signout,
    /// Activation code resend
    ResendActivation,
}

impl ProviderCapability {
    /// Stable identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authenticate => "authenticate",
            Self::SessionValidation => "session_validation",
            Self::RefreshToken => "refresh_token",
            Self::Register => "register",
            Self::Activate => "activate",
            Self::Signout => "signout",
            Self::ResendActivation => "resend_activation",
        }
    }
}

/// Credentials submitted for authentication
///
/// Secrets are redacted from the `Debug` output.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthCredentials {
    /// Username or login name
    pub username: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Password
    pub password: Option<String>,
    /// Pre-issued token (token-based providers)
    pub token: Option<String>,
    /// Preferred provider kind; `None` lets the manager pick
    pub provider_type: Option<ProviderType>,
    /// Provider-specific extras
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

impl AuthCredentials {
    /// Username/password credentials
    pub fn password<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            ..Default::default()
        }
    }

    /// Token credentials
    pub fn token<T: Into<String>>(token: T) -> Self {
        Self {
            token: Some(token.into()),
            ..Default::default()
        }
    }

    /// Set the email address
    #[must_use]
    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Restrict to a provider kind
    #[must_use]
    pub fn with_provider_type(mut self, provider_type: ProviderType) -> Self {
        self.provider_type = Some(provider_type);
        self
    }

    /// Add a provider-specific extra
    #[must_use]
    pub fn with_extra<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Username if present, else email
    pub fn identifier(&self) -> Option<&str> {
        self.username
            .as_deref()
            .filter(|u| !u.is_empty())
            .or(self.email.as_deref())
    }
}

impl fmt::Debug for AuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthCredentials")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("provider_type", &self.provider_type)
            .finish_non_exhaustive()
    }
}

/// Authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    /// Stable identifier assigned by the provider
    pub id: String,
    /// Login name
    pub username: String,
    /// Email address
    pub email: Option<String>,
    /// Display name
    pub display_name: Option<String>,
    /// Granted roles
    #[serde(default)]
    pub roles: Vec<String>,
    /// Whether the account is active
    pub is_active: bool,
    /// Account creation time
    pub created_at: DateTime<Utc>,
    /// Provider-specific attributes
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl AuthUser {
    /// Active user with the given id and username
    pub fn new<I: Into<String>, U: Into<String>>(id: I, username: U) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: None,
            display_name: None,
            roles: Vec::new(),
            is_active: true,
            created_at: Utc::now(),
            attributes: HashMap::new(),
        }
    }

    /// Set the email address
    #[must_use]
    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Add a role
    #[must_use]
    pub fn with_role<S: Into<String>>(mut self, role: S) -> Self {
        self.roles.push(role.into());
        self
    }
}

/// Issued access token
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthToken {
    /// Access token value
    pub access_token: String,
    /// Refresh token, when the provider issues one
    pub refresh_token: Option<String>,
    /// Token type (usually `Bearer`)
    pub token_type: String,
    /// Issue time
    pub issued_at: DateTime<Utc>,
    /// Expiry time
    pub expires_at: DateTime<Utc>,
    /// Granted scopes
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl AuthToken {
    /// Bearer token valid for `ttl` from now
    pub fn bearer<S: Into<String>>(access_token: S, ttl: ChronoDuration) -> Self {
        let issued_at = Utc::now();
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            token_type: DEFAULT_TOKEN_TYPE.to_string(),
            issued_at,
            expires_at: issued_at + ttl,
            scopes: Vec::new(),
        }
    }

    /// Attach a refresh token
    #[must_use]
    pub fn with_refresh_token<S: Into<String>>(mut self, refresh_token: S) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Whether the token is expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Whether the token is expired now
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether the token expires within `window` from now
    pub fn expires_within(&self, window: ChronoDuration) -> bool {
        self.expires_at <= Utc::now() + window
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("access_token", &"<redacted>")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("token_type", &self.token_type)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Authenticated session
///
/// Created by a provider on successful authentication and persisted through
/// the repository port. `provider_name` records which registered provider
/// actually produced the session (relevant after failover).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    /// Session identifier
    pub id: String,
    /// Authenticated user
    pub user: AuthUser,
    /// Issued token
    pub token: AuthToken,
    /// Kind of the issuing provider
    pub provider_type: ProviderType,
    /// Name of the issuing provider
    pub provider_name: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Expiry time
    pub expires_at: DateTime<Utc>,
    /// Whether the session is still active
    pub is_active: bool,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl AuthSession {
    /// Active session that expires together with its token
    pub fn new<S: Into<String>>(
        user: AuthUser,
        token: AuthToken,
        provider_type: ProviderType,
        provider_name: S,
    ) -> Self {
        let created_at = Utc::now();
        let expires_at = token.expires_at;
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user,
            token,
            provider_type,
            provider_name: provider_name.into(),
            created_at,
            expires_at,
            is_active: true,
            metadata: HashMap::new(),
        }
    }

    /// Add a metadata entry
    #[must_use]
    pub fn with_metadata<K: Into<String>>(mut self, key: K, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Whether the session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Active and not expired
    pub fn is_valid(&self) -> bool {
        self.is_active && !self.is_expired()
    }
}

/// Self-registration request
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct RegistrationRequest {
    /// Requested username
    pub username: String,
    /// Email address
    pub email: Option<String>,
    /// Initial password
    pub password: String,
    /// Display name
    pub display_name: Option<String>,
    /// Extra attributes
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

/// Result of a successful registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationOutcome {
    /// The created (possibly inactive) user
    pub user: AuthUser,
    /// Whether the account must be activated before login
    pub activation_required: bool,
    /// Activation code to deliver out of band
    pub activation_code: Option<String>,
}

/// Provider-reported request counters
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProviderPerformanceMetrics {
    /// Requests handled
    pub total_requests: u64,
    /// Requests that succeeded
    pub successful_requests: u64,
    /// Requests that failed
    pub failed_requests: u64,
    /// Mean request latency in milliseconds
    pub average_response_time_ms: f64,
    /// Time of the last request
    pub last_request_at: Option<DateTime<Utc>>,
}

impl ProviderPerformanceMetrics {
    /// Fold one request into the counters
    pub fn record(&mut self, success: bool, elapsed: std::time::Duration) {
        let n = self.total_requests as f64;
        self.average_response_time_ms =
            (self.average_response_time_ms * n + elapsed.as_secs_f64() * 1000.0) / (n + 1.0);
        self.total_requests += 1;
        if success {
            self.successful_requests += 1;
        } else {
            self.failed_requests += 1;
        }
        self.last_request_at = Some(Utc::now());
    }
}
