//! Validation rules and rule groups

use aegis_domain::value_objects::{
    AuthCredentials, AuthToken, AuthUser, ExecutionMode, SecurityContext, ValidationItem,
    ValidationResult, ValidationTarget,
};
use aegis_domain::AuthEvent;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Check performed by a rule
///
/// Implementations only see items whose target matches the rule's target.
#[async_trait]
pub trait RuleCheck: Send + Sync {
    /// Validate `item`
    async fn check(&self, item: &ValidationItem) -> ValidationResult;
}

struct FnRule<F>(F);

#[async_trait]
impl<F> RuleCheck for FnRule<F>
where
    F: Fn(&ValidationItem) -> ValidationResult + Send + Sync,
{
    async fn check(&self, item: &ValidationItem) -> ValidationResult {
        (self.0)(item)
    }
}

/// Named, prioritized validation rule
#[derive(Clone)]
pub struct ValidationRule {
    /// Unique rule name
    pub name: String,
    /// Human readable description
    pub description: String,
    /// Higher runs first
    pub priority: i32,
    /// Disabled rules are skipped
    pub enabled: bool,
    /// Item kind the rule applies to
    pub target: ValidationTarget,
    /// Whether the check may suspend (remote lookups)
    pub is_async: bool,
    /// Free-form metadata
    pub metadata: HashMap<String, String>,
    check: Arc<dyn RuleCheck>,
}

impl ValidationRule {
    /// Rule backed by an asynchronous check
    pub fn new<S: Into<String>>(
        name: S,
        target: ValidationTarget,
        check: Arc<dyn RuleCheck>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            priority: 0,
            enabled: true,
            target,
            is_async: true,
            metadata: HashMap::new(),
            check,
        }
    }

    /// Rule backed by a synchronous closure over the raw item
    pub fn from_fn<S, F>(name: S, target: ValidationTarget, check: F) -> Self
    where
        S: Into<String>,
        F: Fn(&ValidationItem) -> ValidationResult + Send + Sync + 'static,
    {
        Self {
            is_async: false,
            ..Self::new(name, target, Arc::new(FnRule(check)))
        }
    }

    /// Synchronous rule over credentials
    pub fn credentials<S, F>(name: S, check: F) -> Self
    where
        S: Into<String>,
        F: Fn(&AuthCredentials) -> ValidationResult + Send + Sync + 'static,
    {
        Self::from_fn(name, ValidationTarget::Credentials, move |item| match item {
            ValidationItem::Credentials(credentials) => check(credentials),
            _ => ValidationResult::valid(),
        })
    }

    /// Synchronous rule over tokens
    pub fn token<S, F>(name: S, check: F) -> Self
    where
        S: Into<String>,
        F: Fn(&AuthToken) -> ValidationResult + Send + Sync + 'static,
    {
        Self::from_fn(name, ValidationTarget::Token, move |item| match item {
            ValidationItem::Token(token) => check(token),
            _ => ValidationResult::valid(),
        })
    }

    /// Synchronous rule over users
    pub fn user<S, F>(name: S, check: F) -> Self
    where
        S: Into<String>,
        F: Fn(&AuthUser) -> ValidationResult + Send + Sync + 'static,
    {
        Self::from_fn(name, ValidationTarget::User, move |item| match item {
            ValidationItem::User(user) => check(user),
            _ => ValidationResult::valid(),
        })
    }

    /// Synchronous rule over events
    pub fn event<S, F>(name: S, check: F) -> Self
    where
        S: Into<String>,
        F: Fn(&AuthEvent) -> ValidationResult + Send + Sync + 'static,
    {
        Self::from_fn(name, ValidationTarget::Event, move |item| match item {
            ValidationItem::Event(event) => check(event),
            _ => ValidationResult::valid(),
        })
    }

    /// Synchronous rule over security contexts
    pub fn context<S, F>(name: S, check: F) -> Self
    where
        S: Into<String>,
        F: Fn(&SecurityContext) -> ValidationResult + Send + Sync + 'static,
    {
        Self::from_fn(name, ValidationTarget::Context, move |item| match item {
            ValidationItem::Context(context) => check(context),
            _ => ValidationResult::valid(),
        })
    }

    /// Set the description
    #[must_use]
    pub fn describe<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    /// Set the priority
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Register disabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Add a metadata entry
    #[must_use]
    pub fn with_metadata<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Whether the rule applies to `item`
    pub fn applies_to(&self, item: &ValidationItem) -> bool {
        self.target == item.target()
    }

    pub(crate) fn checker(&self) -> &Arc<dyn RuleCheck> {
        &self.check
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("enabled", &self.enabled)
            .field("target", &self.target)
            .field("is_async", &self.is_async)
            .finish_non_exhaustive()
    }
}

/// Named set of rules evaluated under one execution mode
///
/// Rules are referenced by name; names that are not registered with the
/// validator are skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleGroup {
    /// Unique group name
    pub name: String,
    /// Member rule names
    pub rules: Vec<String>,
    /// How the members run
    pub mode: ExecutionMode,
    /// Disabled groups cannot be invoked
    pub enabled: bool,
}

impl RuleGroup {
    /// Enabled group running `rules` under `mode`
    pub fn new<S, I, R>(name: S, mode: ExecutionMode, rules: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            name: name.into(),
            rules: rules.into_iter().map(Into::into).collect(),
            mode,
            enabled: true,
        }
    }
}
