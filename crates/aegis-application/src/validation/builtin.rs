//! Built-in rule set
//!
//! | Target | Rules |
//! |--------|-------|
//! | Credentials | `required_fields`, `username_format`, `email_format`, `password_strength`, `breached_password` |
//! | Token | `token_format`, `token_expiry` |
//! | User | `user_identity`, `user_email`, `user_active` |
//! | Event | `event_type`, `event_timestamp` |
//! | Context | `context_ip`, `context_user_agent`, `context_request_id` |

use crate::validation::rule::{RuleCheck, RuleGroup, ValidationRule};
use aegis_domain::error::{Error, Result};
use aegis_domain::ports::BreachedPasswordSource;
use aegis_domain::value_objects::{
    ExecutionMode, ValidationIssue, ValidationIssueKind, ValidationItem, ValidationResult,
    ValidationTarget,
};
use aegis_infrastructure::config::ValidationConfig;
use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use serde_json::json;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::warn;
use validator::ValidateEmail;

/// Passwords shorter than this pass the policy with a warning
pub const RECOMMENDED_PASSWORD_LENGTH: usize = 12;

/// Longest accepted user agent
pub const MAX_USER_AGENT_LENGTH: usize = 512;

/// Tolerated clock skew for event timestamps, in seconds
pub const EVENT_CLOCK_SKEW_SECS: i64 = 60;

/// Events older than this are reported as stale, in hours
pub const EVENT_STALE_AFTER_HOURS: i64 = 24;

/// Group checking a password against the full policy, stopping at the first error
pub const PASSWORD_POLICY_GROUP: &str = "password_policy";

/// Group checking a request context and the token it carries
pub const SESSION_SECURITY_GROUP: &str = "session_security";

/// Built-in rules configured from `config`
///
/// `breach_source` enables `breached_password` when
/// `check_breached_passwords` is set. Fails if `username_pattern` is not a
/// valid regular expression.
pub fn builtin_rules(
    config: &ValidationConfig,
    breach_source: Option<Arc<dyn BreachedPasswordSource>>,
) -> Result<Vec<ValidationRule>> {
    let username_pattern = Regex::new(&config.username_pattern).map_err(|e| {
        Error::configuration_with_source(
            format!("Invalid username pattern {:?}", config.username_pattern),
            e,
        )
    })?;

    let mut rules = vec![
        required_fields(),
        username_format(config, username_pattern),
        email_format(),
        password_strength(config),
        token_format(),
        token_expiry(config),
        user_identity(),
        user_email(),
        user_active(),
        event_type(),
        event_timestamp(),
        context_ip(),
        context_user_agent(),
        context_request_id(),
    ];
    if config.check_breached_passwords
        && let Some(source) = breach_source
    {
        rules.push(
            ValidationRule::new(
                "breached_password",
                ValidationTarget::Credentials,
                Arc::new(BreachedPasswordCheck { source }),
            )
            .describe("Password does not appear in a known breach")
            .with_priority(50),
        );
    }
    Ok(rules)
}

/// Built-in rule groups
pub fn builtin_groups() -> Vec<RuleGroup> {
    vec![
        RuleGroup::new(
            PASSWORD_POLICY_GROUP,
            ExecutionMode::FailFast,
            ["required_fields", "password_strength", "breached_password"],
        ),
        RuleGroup::new(
            SESSION_SECURITY_GROUP,
            ExecutionMode::Parallel,
            [
                "token_format",
                "token_expiry",
                "context_ip",
                "context_user_agent",
                "context_request_id",
            ],
        ),
    ]
}

fn required_fields() -> ValidationRule {
    ValidationRule::credentials("required_fields", |credentials| {
        let mut result = ValidationResult::valid();
        if credentials.token.as_deref().is_some_and(|t| !t.is_empty()) {
            return result;
        }
        if credentials.identifier().is_none_or(str::is_empty) {
            result.add_error(
                ValidationIssue::error(
                    ValidationIssueKind::Required,
                    "IDENTIFIER_REQUIRED",
                    "Username or email is required",
                )
                .on_field("username"),
            );
        }
        if credentials.password.as_deref().is_none_or(str::is_empty) {
            result.add_error(
                ValidationIssue::error(
                    ValidationIssueKind::Required,
                    "PASSWORD_REQUIRED",
                    "Password is required",
                )
                .on_field("password"),
            );
        }
        result
    })
    .describe("Credentials carry an identifier and a password, or a token")
    .with_priority(100)
}

fn username_format(config: &ValidationConfig, pattern: Regex) -> ValidationRule {
    let min = config.min_username_length;
    let max = config.max_username_length;
    ValidationRule::credentials("username_format", move |credentials| {
        let mut result = ValidationResult::valid();
        let Some(username) = credentials.username.as_deref().filter(|u| !u.is_empty()) else {
            return result;
        };
        let length = username.chars().count();
        if length < min {
            result.add_error(
                ValidationIssue::error(
                    ValidationIssueKind::Policy,
                    "USERNAME_TOO_SHORT",
                    format!("Username must be at least {min} characters"),
                )
                .on_field("username")
                .with_context("min_length", json!(min)),
            );
        } else if length > max {
            result.add_error(
                ValidationIssue::error(
                    ValidationIssueKind::Policy,
                    "USERNAME_TOO_LONG",
                    format!("Username must be at most {max} characters"),
                )
                .on_field("username")
                .with_context("max_length", json!(max)),
            );
        }
        if !pattern.is_match(username) {
            result.add_error(
                ValidationIssue::error(
                    ValidationIssueKind::Format,
                    "INVALID_USERNAME_FORMAT",
                    "Username contains characters that are not allowed",
                )
                .on_field("username"),
            );
        }
        result
    })
    .describe("Username length and character set")
    .with_priority(90)
}

fn email_format() -> ValidationRule {
    ValidationRule::credentials("email_format", |credentials| {
        match credentials.email.as_deref() {
            Some(email) if !email.validate_email() => ValidationResult::invalid(
                ValidationIssue::error(
                    ValidationIssueKind::Format,
                    "INVALID_EMAIL_FORMAT",
                    "Email address is not valid",
                )
                .on_field("email"),
            ),
            _ => ValidationResult::valid(),
        }
    })
    .describe("Email address syntax")
    .with_priority(90)
}

fn password_strength(config: &ValidationConfig) -> ValidationRule {
    let policy = config.clone();
    ValidationRule::credentials("password_strength", move |credentials| {
        let mut result = ValidationResult::valid();
        let Some(password) = credentials.password.as_deref().filter(|p| !p.is_empty()) else {
            return result;
        };

        let length = password.chars().count();
        if length < policy.min_password_length {
            result.add_error(
                ValidationIssue::error(
                    ValidationIssueKind::Policy,
                    "PASSWORD_TOO_SHORT",
                    format!(
                        "Password must be at least {} characters",
                        policy.min_password_length
                    ),
                )
                .on_field("password")
                .with_context("min_length", json!(policy.min_password_length)),
            );
        }

        let classes = [
            (
                policy.require_uppercase,
                password.chars().any(char::is_uppercase),
                "PASSWORD_MISSING_UPPERCASE",
                "an uppercase letter",
            ),
            (
                policy.require_lowercase,
                password.chars().any(char::is_lowercase),
                "PASSWORD_MISSING_LOWERCASE",
                "a lowercase letter",
            ),
            (
                policy.require_digit,
                password.chars().any(|c| c.is_ascii_digit()),
                "PASSWORD_MISSING_DIGIT",
                "a digit",
            ),
            (
                policy.require_special,
                password.chars().any(|c| !c.is_alphanumeric()),
                "PASSWORD_MISSING_SPECIAL",
                "a special character",
            ),
        ];
        for (required, present, code, what) in classes {
            if required && !present {
                result.add_error(
                    ValidationIssue::error(
                        ValidationIssueKind::Policy,
                        code,
                        format!("Password must contain {what}"),
                    )
                    .on_field("password"),
                );
                result.add_suggestion(format!("Add {what} to the password"));
            }
        }

        if result.is_valid && length < RECOMMENDED_PASSWORD_LENGTH {
            result.add_warning(
                ValidationIssue::warning(
                    ValidationIssueKind::Policy,
                    "PASSWORD_WEAK",
                    "Password meets the policy but is short",
                )
                .on_field("password"),
            );
            result.add_suggestion(format!(
                "Use at least {RECOMMENDED_PASSWORD_LENGTH} characters"
            ));
        }

        if let Some(username) = credentials.username.as_deref().filter(|u| u.len() >= 3)
            && password.to_lowercase().contains(&username.to_lowercase())
        {
            result.add_warning(
                ValidationIssue::warning(
                    ValidationIssueKind::Security,
                    "PASSWORD_CONTAINS_USERNAME",
                    "Password contains the username",
                )
                .on_field("password"),
            );
            result.add_suggestion("Avoid reusing the username in the password");
        }
        result
    })
    .describe("Password length and character classes")
    .with_priority(80)
}

struct BreachedPasswordCheck {
    source: Arc<dyn BreachedPasswordSource>,
}

#[async_trait]
impl RuleCheck for BreachedPasswordCheck {
    async fn check(&self, item: &ValidationItem) -> ValidationResult {
        let ValidationItem::Credentials(credentials) = item else {
            return ValidationResult::valid();
        };
        let Some(password) = credentials.password.as_deref().filter(|p| !p.is_empty()) else {
            return ValidationResult::valid();
        };

        match self.source.is_breached(password).await {
            Ok(false) => ValidationResult::valid(),
            Ok(true) => {
                let mut result = ValidationResult::invalid(
                    ValidationIssue::error(
                        ValidationIssueKind::Security,
                        "PASSWORD_BREACHED",
                        "Password appears in a known data breach",
                    )
                    .on_field("password"),
                );
                result.add_suggestion("Choose a password that has not been used elsewhere");
                result
            }
            Err(e) => {
                warn!(error = %e, "Breached password lookup failed");
                let mut result = ValidationResult::valid();
                result.add_warning(
                    ValidationIssue::warning(
                        ValidationIssueKind::Execution,
                        "BREACH_CHECK_UNAVAILABLE",
                        "Password breach lookup is unavailable",
                    )
                    .on_field("password"),
                );
                result
            }
        }
    }
}

fn token_format() -> ValidationRule {
    ValidationRule::token("token_format", |token| {
        let mut result = ValidationResult::valid();
        if token.access_token.is_empty() {
            result.add_error(
                ValidationIssue::error(
                    ValidationIssueKind::Required,
                    "TOKEN_REQUIRED",
                    "Access token is empty",
                )
                .on_field("access_token"),
            );
        } else if token.access_token.chars().any(char::is_whitespace) {
            result.add_error(
                ValidationIssue::error(
                    ValidationIssueKind::Format,
                    "INVALID_TOKEN_FORMAT",
                    "Access token contains whitespace",
                )
                .on_field("access_token"),
            );
        }
        if token.token_type.is_empty() {
            result.add_warning(
                ValidationIssue::warning(
                    ValidationIssueKind::Format,
                    "TOKEN_TYPE_MISSING",
                    "Token type is empty",
                )
                .on_field("token_type"),
            );
        }
        result
    })
    .describe("Access token shape")
    .with_priority(100)
}

fn token_expiry(config: &ValidationConfig) -> ValidationRule {
    let warning_window = chrono::Duration::seconds(config.token_expiry_warning_secs);
    ValidationRule::token("token_expiry", move |token| {
        let mut result = ValidationResult::valid();
        if token.expires_at <= token.issued_at {
            result.add_error(
                ValidationIssue::error(
                    ValidationIssueKind::Format,
                    "INVALID_TOKEN_LIFETIME",
                    "Token expires before it was issued",
                )
                .on_field("expires_at"),
            );
        }
        if token.is_expired() {
            result.add_error(
                ValidationIssue::error(
                    ValidationIssueKind::Expired,
                    "TOKEN_EXPIRED",
                    "Token has expired",
                )
                .on_field("expires_at")
                .with_context("expires_at", json!(token.expires_at)),
            );
            result.add_suggestion("Refresh the session or authenticate again");
        } else if token.expires_within(warning_window) {
            result.add_warning(
                ValidationIssue::warning(
                    ValidationIssueKind::Expired,
                    "TOKEN_EXPIRING_SOON",
                    "Token expires soon",
                )
                .on_field("expires_at"),
            );
            result.add_suggestion("Refresh the session");
        }
        result
    })
    .describe("Token lifetime")
    .with_priority(90)
}

fn user_identity() -> ValidationRule {
    ValidationRule::user("user_identity", |user| {
        let mut result = ValidationResult::valid();
        if user.id.is_empty() {
            result.add_error(
                ValidationIssue::error(
                    ValidationIssueKind::Required,
                    "USER_ID_REQUIRED",
                    "User id is empty",
                )
                .on_field("id"),
            );
        }
        if user.username.is_empty() {
            result.add_error(
                ValidationIssue::error(
                    ValidationIssueKind::Required,
                    "USERNAME_REQUIRED",
                    "Username is empty",
                )
                .on_field("username"),
            );
        }
        result
    })
    .describe("User id and username are present")
    .with_priority(100)
}

fn user_email() -> ValidationRule {
    ValidationRule::user("user_email", |user| match user.email.as_deref() {
        Some(email) if !email.validate_email() => ValidationResult::invalid(
            ValidationIssue::error(
                ValidationIssueKind::Format,
                "INVALID_EMAIL_FORMAT",
                "User email address is not valid",
            )
            .on_field("email"),
        ),
        _ => ValidationResult::valid(),
    })
    .describe("User email syntax")
    .with_priority(90)
}

fn user_active() -> ValidationRule {
    ValidationRule::user("user_active", |user| {
        if user.is_active {
            ValidationResult::valid()
        } else {
            ValidationResult::invalid(
                ValidationIssue::error(
                    ValidationIssueKind::Policy,
                    "USER_INACTIVE",
                    "User account is not active",
                )
                .on_field("is_active"),
            )
        }
    })
    .describe("User account is active")
    .with_priority(80)
}

fn event_type() -> ValidationRule {
    ValidationRule::event("event_type", |event| {
        let mut result = ValidationResult::valid();
        if event.message.trim().is_empty() {
            result.add_error(
                ValidationIssue::error(
                    ValidationIssueKind::Required,
                    "EVENT_MESSAGE_REQUIRED",
                    "Event message is empty",
                )
                .on_field("message"),
            );
        }
        if event.kind.requires_provider() && event.provider.as_deref().is_none_or(str::is_empty) {
            result.add_error(
                ValidationIssue::error(
                    ValidationIssueKind::Required,
                    "EVENT_PROVIDER_MISSING",
                    format!("{:?} events must name a provider", event.kind),
                )
                .on_field("provider"),
            );
        }
        result
    })
    .describe("Event carries the fields its kind requires")
    .with_priority(100)
}

fn event_timestamp() -> ValidationRule {
    ValidationRule::event("event_timestamp", |event| {
        let now = Utc::now();
        let mut result = ValidationResult::valid();
        if event.timestamp > now + chrono::Duration::seconds(EVENT_CLOCK_SKEW_SECS) {
            result.add_error(
                ValidationIssue::error(
                    ValidationIssueKind::Format,
                    "EVENT_TIMESTAMP_IN_FUTURE",
                    "Event timestamp is in the future",
                )
                .on_field("timestamp"),
            );
        } else if event.timestamp < now - chrono::Duration::hours(EVENT_STALE_AFTER_HOURS) {
            result.add_warning(
                ValidationIssue::warning(
                    ValidationIssueKind::Expired,
                    "EVENT_TIMESTAMP_STALE",
                    "Event is older than a day",
                )
                .on_field("timestamp"),
            );
        }
        result
    })
    .describe("Event timestamp is plausible")
    .with_priority(90)
}

fn context_ip() -> ValidationRule {
    ValidationRule::context("context_ip", |context| match context.ip_address.as_deref() {
        None | Some("") => {
            let mut result = ValidationResult::valid();
            result.add_warning(
                ValidationIssue::warning(
                    ValidationIssueKind::Required,
                    "IP_ADDRESS_MISSING",
                    "Request has no IP address",
                )
                .on_field("ip_address"),
            );
            result
        }
        Some(ip) if ip.parse::<IpAddr>().is_err() => ValidationResult::invalid(
            ValidationIssue::error(
                ValidationIssueKind::Format,
                "INVALID_IP_ADDRESS",
                "IP address is not valid",
            )
            .on_field("ip_address")
            .with_context("ip_address", json!(ip)),
        ),
        Some(_) => ValidationResult::valid(),
    })
    .describe("Caller IP address syntax")
    .with_priority(100)
}

fn context_user_agent() -> ValidationRule {
    ValidationRule::context("context_user_agent", |context| {
        let mut result = ValidationResult::valid();
        match context.user_agent.as_deref() {
            None | Some("") => result.add_warning(
                ValidationIssue::warning(
                    ValidationIssueKind::Required,
                    "USER_AGENT_MISSING",
                    "Request has no user agent",
                )
                .on_field("user_agent"),
            ),
            Some(agent) if agent.len() > MAX_USER_AGENT_LENGTH => result.add_error(
                ValidationIssue::error(
                    ValidationIssueKind::Limit,
                    "USER_AGENT_TOO_LONG",
                    format!("User agent exceeds {MAX_USER_AGENT_LENGTH} bytes"),
                )
                .on_field("user_agent"),
            ),
            Some(_) => {}
        }
        result
    })
    .describe("Caller user agent")
    .with_priority(90)
}

fn context_request_id() -> ValidationRule {
    ValidationRule::context("context_request_id", |context| {
        if context.request_id.trim().is_empty() {
            ValidationResult::invalid(
                ValidationIssue::error(
                    ValidationIssueKind::Required,
                    "REQUEST_ID_REQUIRED",
                    "Request id is empty",
                )
                .on_field("request_id"),
            )
        } else {
            ValidationResult::valid()
        }
    })
    .describe("Request correlation id is present")
    .with_priority(80)
}
