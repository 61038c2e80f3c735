//! Security Service Ports

use crate::error::Result;
use crate::value_objects::{
    AuthCredentials, HeaderValidation, RateLimitDecision, SecurityContext,
    SuspiciousActivityReport,
};
use async_trait::async_trait;
use std::collections::HashMap;

/// Request screening applied before credentials reach a provider
#[async_trait]
pub trait SecurityService: Send + Sync {
    /// Score the attempt and decide whether to block it
    async fn detect_suspicious_activity(
        &self,
        credentials: &AuthCredentials,
        context: &SecurityContext,
    ) -> SuspiciousActivityReport;

    /// Check required security headers
    fn validate_security_headers(&self, headers: &HashMap<String, String>) -> HeaderValidation;

    /// Count an attempt against `key` and decide whether it may proceed
    async fn check_rate_limit(&self, key: &str) -> RateLimitDecision;

    /// Feed the authentication outcome for `key` back into the heuristics
    async fn record_outcome(&self, key: &str, success: bool);
}

/// Known-breached password lookup
#[async_trait]
pub trait BreachedPasswordSource: Send + Sync {
    /// Whether `password` appears in a breach corpus
    async fn is_breached(&self, password: &str) -> Result<bool>;
}
