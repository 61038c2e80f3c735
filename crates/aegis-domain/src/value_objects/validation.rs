//! Validation value objects

use crate::events::AuthEvent;
use crate::value_objects::{AuthCredentials, AuthToken, AuthUser, SecurityContext};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// What a validation rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationTarget {
    /// Submitted credentials
    Credentials,
    /// Issued token
    Token,
    /// Authenticated user
    User,
    /// Authentication event
    Event,
    /// Request security context
    Context,
}

/// One heterogeneous item of a validation batch
#[derive(Debug, Clone)]
pub enum ValidationItem {
    /// Credentials
    Credentials(AuthCredentials),
    /// Token
    Token(AuthToken),
    /// User
    User(AuthUser),
    /// Event
    Event(AuthEvent),
    /// Security context
    Context(SecurityContext),
}

impl ValidationItem {
    /// Target kind of this item
    pub fn target(&self) -> ValidationTarget {
        match self {
            Self::Credentials(_) => ValidationTarget::Credentials,
            Self::Token(_) => ValidationTarget::Token,
            Self::User(_) => ValidationTarget::User,
            Self::Event(_) => ValidationTarget::Event,
            Self::Context(_) => ValidationTarget::Context,
        }
    }
}

/// How the rules of a group are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Every rule, one after another, in priority order
    #[default]
    Sequential,
    /// In priority order, stopping at the first rule that reports an error
    FailFast,
    /// Every rule concurrently; results merged in priority order
    Parallel,
}

/// Category of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssueKind {
    /// Required field missing
    Required,
    /// Malformed value
    Format,
    /// Policy not met (length, strength)
    Policy,
    /// Security concern (breach, suspicious input)
    Security,
    /// Value expired or out of range in time
    Expired,
    /// Rule failed to execute
    Execution,
    /// Limit exceeded
    Limit,
}

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    /// Informational
    Info,
    /// Does not invalidate the input
    Warning,
    /// Invalidates the input
    Error,
    /// Invalidates the input and indicates an attack or corruption
    Critical,
}

/// Validation error or warning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Category
    #[serde(rename = "type")]
    pub kind: ValidationIssueKind,
    /// Human readable message
    pub message: String,
    /// Offending field
    pub field: Option<String>,
    /// Stable code, e.g. `PASSWORD_TOO_SHORT`
    pub code: String,
    /// Severity
    pub severity: ValidationSeverity,
    /// Rule that produced the issue
    pub rule: Option<String>,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Extra context
    #[serde(default)]
    pub context: HashMap<String, serde_json::Value>,
}

impl ValidationIssue {
    /// Error-severity issue
    pub fn error<C: Into<String>, M: Into<String>>(
        kind: ValidationIssueKind,
        code: C,
        message: M,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            field: None,
            code: code.into(),
            severity: ValidationSeverity::Error,
            rule: None,
            timestamp: Utc::now(),
            context: HashMap::new(),
        }
    }

    /// Warning-severity issue
    pub fn warning<C: Into<String>, M: Into<String>>(
        kind: ValidationIssueKind,
        code: C,
        message: M,
    ) -> Self {
        Self {
            severity: ValidationSeverity::Warning,
            ..Self::error(kind, code, message)
        }
    }

    /// Set the offending field
    #[must_use]
    pub fn on_field<S: Into<String>>(mut self, field: S) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Override the severity
    #[must_use]
    pub fn with_severity(mut self, severity: ValidationSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Add context
    #[must_use]
    pub fn with_context<K: Into<String>>(mut self, key: K, value: serde_json::Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }
}

/// Execution metadata attached to every result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetadata {
    /// Wall time spent
    pub duration: Duration,
    /// Names of the rules that ran, in execution order
    pub rules_applied: Vec<String>,
    /// Completion time
    pub timestamp: DateTime<Utc>,
    /// Whether any applied rule was asynchronous
    pub is_async: bool,
    /// Whether rules ran concurrently
    pub parallel: bool,
    /// Retries performed
    pub retry_count: u32,
}

impl Default for ValidationMetadata {
    fn default() -> Self {
        Self {
            duration: Duration::ZERO,
            rules_applied: Vec::new(),
            timestamp: Utc::now(),
            is_async: false,
            parallel: false,
            retry_count: 0,
        }
    }
}

/// Validation outcome
///
/// `is_valid` is kept equal to `errors.is_empty()` by every mutator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// No errors were produced
    pub is_valid: bool,
    /// Errors
    pub errors: Vec<ValidationIssue>,
    /// Warnings
    pub warnings: Vec<ValidationIssue>,
    /// Suggestions for the user
    pub suggestions: Vec<String>,
    /// Execution metadata
    pub metadata: ValidationMetadata,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::valid()
    }
}

impl ValidationResult {
    /// Empty, valid result
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
            metadata: ValidationMetadata::default(),
        }
    }

    /// Result holding a single error
    pub fn invalid(issue: ValidationIssue) -> Self {
        let mut result = Self::valid();
        result.add_error(issue);
        result
    }

    /// Record an error
    pub fn add_error(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
        self.is_valid = false;
    }

    /// Record a warning
    pub fn add_warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }

    /// Record a suggestion
    pub fn add_suggestion<S: Into<String>>(&mut self, suggestion: S) {
        self.suggestions.push(suggestion.into());
    }

    /// Append another result's issues and suggestions; metadata is left alone
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.suggestions.extend(other.suggestions);
        self.is_valid = self.errors.is_empty();
    }

    /// Stamp every issue that has no rule name with `rule`
    pub fn attribute_to(&mut self, rule: &str) {
        for issue in self.errors.iter_mut().chain(self.warnings.iter_mut()) {
            if issue.rule.is_none() {
                issue.rule = Some(rule.to_string());
            }
        }
    }

    /// First error message, if any
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(|e| e.message.as_str())
    }
}
