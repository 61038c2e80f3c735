//! Rule-based authentication input validator

use crate::validation::builtin::{builtin_groups, builtin_rules};
use crate::validation::rule::{RuleGroup, ValidationRule};
use aegis_domain::error::{AuthError, AuthResult, Result};
use aegis_domain::ports::BreachedPasswordSource;
use aegis_domain::value_objects::{
    AuthCredentials, AuthToken, AuthUser, ExecutionMode, SecurityContext, ValidationIssue,
    ValidationIssueKind, ValidationItem, ValidationMetadata, ValidationResult,
};
use aegis_domain::AuthEvent;
use aegis_infrastructure::config::ValidationConfig;
use aegis_infrastructure::utils::TimedOperation;
use chrono::Utc;
use futures::FutureExt;
use futures::future::join_all;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

/// Running validation totals
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationStatistics {
    /// Items validated
    pub total_validations: u64,
    /// Items found valid
    pub valid_count: u64,
    /// Items found invalid
    pub invalid_count: u64,
    /// `valid_count / total_validations * 100`, 0 before any validation
    pub success_rate: f64,
    /// Mean time per item in milliseconds
    pub average_duration_ms: f64,
    /// Errors reported, by rule name
    pub rule_failures: BTreeMap<String, u64>,
}

#[derive(Debug, Default)]
struct StatisticsInner {
    total: u64,
    valid: u64,
    invalid: u64,
    total_duration: Duration,
    rule_failures: BTreeMap<String, u64>,
}

#[derive(Default)]
struct RuleRegistry {
    rules: Vec<ValidationRule>,
    groups: Vec<RuleGroup>,
}

/// Authentication input validator
///
/// Owns a registry of named rules and rule groups. Every `validate_*`
/// operation runs the enabled rules targeting the item, highest priority
/// first, under the configured [`ExecutionMode`].
///
/// # Example
///
/// ```ignore
/// use aegis_application::validation::AuthValidator;
///
/// let validator = AuthValidator::new(&config.validation, Some(breach_source))?;
/// let result = validator.validate_credentials(&credentials).await;
/// if !result.is_valid {
///     return Err(AuthError::validation(result.first_error().unwrap_or_default()));
/// }
/// ```
pub struct AuthValidator {
    registry: RwLock<RuleRegistry>,
    mode: ExecutionMode,
    max_batch_size: usize,
    stats: Mutex<StatisticsInner>,
}

impl AuthValidator {
    /// Validator with the built-in rules and groups
    pub fn new(
        config: &ValidationConfig,
        breach_source: Option<Arc<dyn BreachedPasswordSource>>,
    ) -> Result<Self> {
        let validator = Self::empty(config);
        {
            let mut registry = validator.write_registry();
            registry.rules = builtin_rules(config, breach_source)?;
            registry.groups = builtin_groups();
        }
        Ok(validator)
    }

    /// Validator without any rule
    pub fn empty(config: &ValidationConfig) -> Self {
        Self {
            registry: RwLock::new(RuleRegistry::default()),
            mode: config.mode,
            max_batch_size: config.max_batch_size,
            stats: Mutex::new(StatisticsInner::default()),
        }
    }

    fn write_registry(&self) -> std::sync::RwLockWriteGuard<'_, RuleRegistry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_registry(&self) -> std::sync::RwLockReadGuard<'_, RuleRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Default execution mode
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Validate credentials
    pub async fn validate_credentials(&self, credentials: &AuthCredentials) -> ValidationResult {
        self.validate(&ValidationItem::Credentials(credentials.clone()))
            .await
    }

    /// Validate a token
    pub async fn validate_token(&self, token: &AuthToken) -> ValidationResult {
        self.validate(&ValidationItem::Token(token.clone())).await
    }

    /// Validate a user
    pub async fn validate_user(&self, user: &AuthUser) -> ValidationResult {
        self.validate(&ValidationItem::User(user.clone())).await
    }

    /// Validate an event
    pub async fn validate_event(&self, event: &AuthEvent) -> ValidationResult {
        self.validate(&ValidationItem::Event(event.clone())).await
    }

    /// Validate a security context
    pub async fn validate_context(&self, context: &SecurityContext) -> ValidationResult {
        self.validate(&ValidationItem::Context(context.clone()))
            .await
    }

    /// Validate any item with the enabled rules for its target
    pub async fn validate(&self, item: &ValidationItem) -> ValidationResult {
        let rules: Vec<ValidationRule> = self
            .read_registry()
            .rules
            .iter()
            .filter(|rule| rule.enabled && rule.applies_to(item))
            .cloned()
            .collect();
        self.run(rules, item, self.mode).await
    }

    /// Validate heterogeneous items independently and concurrently
    ///
    /// Results are returned in input order. Items beyond the batch limit are
    /// reported invalid without running any rule.
    pub async fn validate_batch(&self, items: Vec<ValidationItem>) -> Vec<ValidationResult> {
        let limit = self.max_batch_size;
        let runs = items.iter().enumerate().map(|(index, item)| async move {
            if index >= limit {
                let result = ValidationResult::invalid(
                    ValidationIssue::error(
                        ValidationIssueKind::Limit,
                        "BATCH_LIMIT_EXCEEDED",
                        format!("Batch limit of {limit} items exceeded"),
                    )
                    .with_context("index", json!(index)),
                );
                self.record(&result);
                result
            } else {
                self.validate(item).await
            }
        });
        let results = join_all(runs).await;
        debug!(items = results.len(), "Validation batch completed");
        results
    }

    /// Run the rules of group `name` against `item` under the group's mode
    pub async fn validate_with_rule_group(
        &self,
        name: &str,
        item: &ValidationItem,
    ) -> AuthResult<ValidationResult> {
        let (rules, mode) = {
            let registry = self.read_registry();
            let group = registry
                .groups
                .iter()
                .find(|g| g.name == name)
                .ok_or_else(|| AuthError::validation(format!("Rule group {name} not found")))?;
            if !group.enabled {
                return Err(AuthError::validation(format!("Rule group {name} is disabled")));
            }
            let rules: Vec<ValidationRule> = group
                .rules
                .iter()
                .filter_map(|member| registry.rules.iter().find(|r| &r.name == member))
                .filter(|rule| rule.enabled && rule.applies_to(item))
                .cloned()
                .collect();
            (rules, group.mode)
        };
        Ok(self.run(rules, item, mode).await)
    }

    /// Run the single rule `name` against `item`
    pub async fn validate_with_rule(
        &self,
        name: &str,
        item: &ValidationItem,
    ) -> AuthResult<ValidationResult> {
        let rule = self
            .rule(name)
            .ok_or_else(|| AuthError::validation(format!("Rule {name} not found")))?;
        if !rule.enabled {
            return Err(AuthError::validation(format!("Rule {name} is disabled")));
        }
        if !rule.applies_to(item) {
            return Err(AuthError::validation(format!(
                "Rule {name} does not apply to {:?} items",
                item.target()
            )));
        }
        Ok(self.run(vec![rule], item, ExecutionMode::Sequential).await)
    }

    async fn run(
        &self,
        mut rules: Vec<ValidationRule>,
        item: &ValidationItem,
        mode: ExecutionMode,
    ) -> ValidationResult {
        let timer = TimedOperation::start();
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));

        let mut result = ValidationResult::valid();
        let mut applied = Vec::with_capacity(rules.len());

        match mode {
            ExecutionMode::Parallel => {
                let outcomes = join_all(rules.iter().map(|rule| run_rule(rule, item))).await;
                for (rule, outcome) in rules.iter().zip(outcomes) {
                    applied.push(rule.name.clone());
                    result.merge(outcome);
                }
            }
            ExecutionMode::Sequential | ExecutionMode::FailFast => {
                for rule in &rules {
                    let outcome = run_rule(rule, item).await;
                    applied.push(rule.name.clone());
                    let failed = !outcome.is_valid;
                    result.merge(outcome);
                    if failed && mode == ExecutionMode::FailFast {
                        break;
                    }
                }
            }
        }

        let is_async = rules
            .iter()
            .filter(|rule| applied.contains(&rule.name))
            .any(|rule| rule.is_async);
        result.metadata = ValidationMetadata {
            duration: timer.elapsed(),
            rules_applied: applied,
            timestamp: Utc::now(),
            is_async,
            parallel: mode == ExecutionMode::Parallel,
            retry_count: 0,
        };
        self.record(&result);
        result
    }

    fn record(&self, result: &ValidationResult) {
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        stats.total += 1;
        if result.is_valid {
            stats.valid += 1;
        } else {
            stats.invalid += 1;
        }
        stats.total_duration += result.metadata.duration;
        for issue in &result.errors {
            if let Some(rule) = &issue.rule {
                *stats.rule_failures.entry(rule.clone()).or_default() += 1;
            }
        }
    }

    /// Running totals
    pub fn get_statistics(&self) -> ValidationStatistics {
        let stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        let (success_rate, average_duration_ms) = if stats.total == 0 {
            (0.0, 0.0)
        } else {
            (
                stats.valid as f64 / stats.total as f64 * 100.0,
                stats.total_duration.as_secs_f64() * 1000.0 / stats.total as f64,
            )
        };
        ValidationStatistics {
            total_validations: stats.total,
            valid_count: stats.valid,
            invalid_count: stats.invalid,
            success_rate,
            average_duration_ms,
            rule_failures: stats.rule_failures.clone(),
        }
    }

    /// Zero the running totals
    pub fn reset_statistics(&self) {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner) = StatisticsInner::default();
    }

    /// Register a rule; fails if the name is taken
    pub fn add_rule(&self, rule: ValidationRule) -> AuthResult<()> {
        let mut registry = self.write_registry();
        if registry.rules.iter().any(|r| r.name == rule.name) {
            return Err(AuthError::validation(format!(
                "Rule {} is already registered",
                rule.name
            )));
        }
        debug!(rule = %rule.name, target = ?rule.target, "Validation rule added");
        registry.rules.push(rule);
        Ok(())
    }

    /// Remove a rule; returns whether it was registered
    pub fn remove_rule(&self, name: &str) -> bool {
        let mut registry = self.write_registry();
        let before = registry.rules.len();
        registry.rules.retain(|r| r.name != name);
        registry.rules.len() != before
    }

    /// Enable or disable a rule; returns whether it was registered
    pub fn set_rule_enabled(&self, name: &str, enabled: bool) -> bool {
        match self.write_registry().rules.iter_mut().find(|r| r.name == name) {
            Some(rule) => {
                rule.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Registered rule `name`
    pub fn rule(&self, name: &str) -> Option<ValidationRule> {
        self.read_registry()
            .rules
            .iter()
            .find(|r| r.name == name)
            .cloned()
    }

    /// Names of all registered rules
    pub fn rule_names(&self) -> Vec<String> {
        self.read_registry()
            .rules
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }

    /// Register a rule group; fails if the name is taken
    pub fn add_rule_group(&self, group: RuleGroup) -> AuthResult<()> {
        let mut registry = self.write_registry();
        if registry.groups.iter().any(|g| g.name == group.name) {
            return Err(AuthError::validation(format!(
                "Rule group {} is already registered",
                group.name
            )));
        }
        let unknown: Vec<&String> = group
            .rules
            .iter()
            .filter(|member| !registry.rules.iter().any(|r| &r.name == *member))
            .collect();
        if !unknown.is_empty() {
            warn!(group = %group.name, ?unknown, "Rule group references unregistered rules");
        }
        registry.groups.push(group);
        Ok(())
    }

    /// Remove a rule group; returns whether it was registered
    pub fn remove_rule_group(&self, name: &str) -> bool {
        let mut registry = self.write_registry();
        let before = registry.groups.len();
        registry.groups.retain(|g| g.name != name);
        registry.groups.len() != before
    }

    /// Enable or disable a rule group; returns whether it was registered
    pub fn set_rule_group_enabled(&self, name: &str, enabled: bool) -> bool {
        match self
            .write_registry()
            .groups
            .iter_mut()
            .find(|g| g.name == name)
        {
            Some(group) => {
                group.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Registered rule group `name`
    pub fn rule_group(&self, name: &str) -> Option<RuleGroup> {
        self.read_registry()
            .groups
            .iter()
            .find(|g| g.name == name)
            .cloned()
    }
}

impl std::fmt::Debug for AuthValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthValidator")
            .field("rules", &self.rule_names())
            .field("mode", &self.mode)
            .field("max_batch_size", &self.max_batch_size)
            .finish_non_exhaustive()
    }
}

/// Run one rule, turning a panic into an execution error and stamping
/// every issue with the rule name
async fn run_rule(rule: &ValidationRule, item: &ValidationItem) -> ValidationResult {
    let mut outcome = match AssertUnwindSafe(rule.checker().check(item))
        .catch_unwind()
        .await
    {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(rule = %rule.name, "Validation rule panicked");
            ValidationResult::invalid(
                ValidationIssue::error(
                    ValidationIssueKind::Execution,
                    "RULE_EXECUTION_FAILED",
                    format!("Rule {} failed to execute", rule.name),
                )
                .with_context("rule", json!(rule.name)),
            )
        }
    };
    outcome.attribute_to(&rule.name);
    outcome
}
