//! Validation policy configuration types

use crate::constants::*;
use aegis_domain::value_objects::ExecutionMode;
use serde::{Deserialize, Serialize};

/// Input validation policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Minimum password length
    pub min_password_length: usize,
    /// Require an uppercase letter
    pub require_uppercase: bool,
    /// Require a lowercase letter
    pub require_lowercase: bool,
    /// Require a digit
    pub require_digit: bool,
    /// Require a non-alphanumeric character
    pub require_special: bool,
    /// Minimum username length
    pub min_username_length: usize,
    /// Maximum username length
    pub max_username_length: usize,
    /// Allowed username characters (regular expression)
    pub username_pattern: String,
    /// Look passwords up in the breach source
    pub check_breached_passwords: bool,
    /// Warn when a token expires within this many seconds
    pub token_expiry_warning_secs: i64,
    /// Maximum items per batch
    pub max_batch_size: usize,
    /// Execution mode for the built-in rule set
    pub mode: ExecutionMode,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_password_length: PASSWORD_MIN_LENGTH,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: false,
            min_username_length: USERNAME_MIN_LENGTH,
            max_username_length: USERNAME_MAX_LENGTH,
            username_pattern: USERNAME_PATTERN.to_string(),
            check_breached_passwords: true,
            token_expiry_warning_secs: TOKEN_EXPIRY_WARNING_SECS,
            max_batch_size: VALIDATION_MAX_BATCH_SIZE,
            mode: ExecutionMode::Sequential,
        }
    }
}
