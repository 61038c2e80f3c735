//! Identity provider implementations
//!
//! | Provider | Kind | Description |
//! |----------|------|-------------|
//! | [`NullAuthProvider`] | any | Scriptable outcomes, for tests and demos |
//! | [`DirectoryAuthProvider`] | `Ldap` | In-memory directory with salted digests |
//! | [`LocalAccountProvider`] | `Local` | Self-service accounts with activation |

pub mod directory;
pub mod local_account;
pub mod null;

pub use directory::DirectoryAuthProvider;
pub use local_account::LocalAccountProvider;
pub use null::NullAuthProvider;

use crate::constants::ISSUED_TOKEN_TTL_SECS;
use crate::utils::generate_token;
use aegis_domain::value_objects::{AuthSession, AuthToken, AuthUser, ProviderType};

/// Session for `user` issued by provider `name`, with a refresh token
pub(crate) fn issue_session(
    user: AuthUser,
    provider_type: ProviderType,
    name: &str,
    ttl_secs: i64,
) -> AuthSession {
    let ttl = if ttl_secs > 0 { ttl_secs } else { ISSUED_TOKEN_TTL_SECS };
    let token = AuthToken::bearer(generate_token("at"), chrono::Duration::seconds(ttl))
        .with_refresh_token(generate_token("rt"));
    AuthSession::new(user, token, provider_type, name)
}
