//! Default security service
//!
//! Sliding-window rate limiting keyed by caller, heuristic scoring of
//! suspicious attempts, and required-header checks. All state is kept in
//! process memory.

use crate::constants::*;
use aegis_domain::ports::SecurityService;
use aegis_domain::value_objects::{
    AuthCredentials, HeaderValidation, RateLimitDecision, SecurityContext,
    SuspiciousActivityReport,
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Thresholds of the [`DefaultSecurityService`]
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityPolicy {
    /// Whether attempts are rate limited at all
    pub rate_limit_enabled: bool,
    /// Sliding window for attempts and failures
    pub window: Duration,
    /// Attempts allowed per key and window
    pub max_attempts: u32,
    /// Failures per key and window that mark an attempt suspicious
    pub suspicious_failure_threshold: u32,
    /// Risk score at which an attempt is blocked
    pub block_risk_score: u8,
    /// Headers every request must carry (lowercase)
    pub required_headers: Vec<String>,
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self {
            rate_limit_enabled: true,
            window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
            max_attempts: DEFAULT_RATE_LIMIT_MAX_ATTEMPTS,
            suspicious_failure_threshold: DEFAULT_SUSPICIOUS_FAILURE_THRESHOLD,
            block_risk_score: DEFAULT_BLOCK_RISK_SCORE,
            required_headers: vec!["user-agent".to_string()],
        }
    }
}

/// In-process [`SecurityService`]
#[derive(Debug, Default)]
pub struct DefaultSecurityService {
    policy: SecurityPolicy,
    attempts: DashMap<String, VecDeque<Instant>>,
    failures: DashMap<String, VecDeque<Instant>>,
}

impl DefaultSecurityService {
    /// Service enforcing `policy`
    pub fn new(policy: SecurityPolicy) -> Self {
        Self {
            policy,
            attempts: DashMap::new(),
            failures: DashMap::new(),
        }
    }

    /// Policy in effect
    pub fn policy(&self) -> &SecurityPolicy {
        &self.policy
    }

    /// Failures recorded for `key` within the window
    pub fn recent_failures(&self, key: &str) -> usize {
        let now = Instant::now();
        self.failures.get_mut(key).map_or(0, |mut window| {
            prune(&mut window, now, self.policy.window);
            window.len()
        })
    }

    /// Forget all attempts and failures
    pub fn reset(&self) {
        self.attempts.clear();
        self.failures.clear();
    }

    fn score_context(context: &SecurityContext, report: &mut Vec<(u8, String)>) {
        match context.user_agent.as_deref().map(str::trim) {
            None | Some("") => {
                report.push((RISK_MISSING_USER_AGENT, "Missing user agent".to_string()));
            }
            Some(agent) => {
                let agent = agent.to_lowercase();
                if AUTOMATED_USER_AGENT_MARKERS
                    .iter()
                    .any(|marker| agent.contains(marker))
                {
                    report.push((
                        RISK_AUTOMATED_USER_AGENT,
                        "User agent looks automated".to_string(),
                    ));
                }
            }
        }

        match context.ip_address.as_deref().map(str::parse::<IpAddr>) {
            None => report.push((RISK_UNKNOWN_ADDRESS, "Unknown source address".to_string())),
            Some(Err(_)) => {
                report.push((RISK_MALFORMED_ADDRESS, "Malformed source address".to_string()));
            }
            Some(Ok(ip)) if ip.is_unspecified() => {
                report.push((RISK_UNKNOWN_ADDRESS, "Unspecified source address".to_string()));
            }
            Some(Ok(_)) => {}
        }
    }
}

fn prune(window: &mut VecDeque<Instant>, now: Instant, span: Duration) {
    while window
        .front()
        .is_some_and(|at| now.duration_since(*at) >= span)
    {
        window.pop_front();
    }
}

#[async_trait]
impl SecurityService for DefaultSecurityService {
    async fn detect_suspicious_activity(
        &self,
        credentials: &AuthCredentials,
        context: &SecurityContext,
    ) -> SuspiciousActivityReport {
        let mut findings = Vec::new();
        Self::score_context(context, &mut findings);

        let identifier = credentials.identifier().unwrap_or("anonymous");
        let key = context.rate_limit_key(identifier);
        let failures = self
            .recent_failures(&key)
            .max(self.recent_failures(&format!("user:{identifier}")));
        if failures >= self.policy.suspicious_failure_threshold as usize {
            findings.push((
                RISK_REPEATED_FAILURES,
                format!("{failures} failed attempts within the window"),
            ));
        }

        let risk: u32 = findings.iter().map(|(score, _)| u32::from(*score)).sum();
        let risk_score = u8::try_from(risk.min(100)).unwrap_or(100);
        let blocked = risk_score >= self.policy.block_risk_score;
        if blocked {
            warn!(key = %key, risk_score, "Blocking suspicious authentication attempt");
        } else if risk_score > 0 {
            debug!(key = %key, risk_score, "Authentication attempt carries risk");
        }

        SuspiciousActivityReport {
            suspicious: !findings.is_empty(),
            risk_score,
            reasons: findings.into_iter().map(|(_, reason)| reason).collect(),
            blocked,
        }
    }

    fn validate_security_headers(&self, headers: &HashMap<String, String>) -> HeaderValidation {
        let present: HashMap<String, &str> = headers
            .iter()
            .map(|(name, value)| (name.to_lowercase(), value.as_str()))
            .collect();

        let missing: Vec<String> = self
            .policy
            .required_headers
            .iter()
            .filter(|name| !present.contains_key(&name.to_lowercase()))
            .cloned()
            .collect();

        let mut issues: Vec<String> = present
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| format!("Header {name} is empty"))
            .collect();
        if present
            .values()
            .any(|value| value.contains('\r') || value.contains('\n'))
        {
            issues.push("Header value contains a line break".to_string());
        }
        issues.sort();

        HeaderValidation {
            valid: missing.is_empty() && issues.is_empty(),
            missing,
            issues,
        }
    }

    async fn check_rate_limit(&self, key: &str) -> RateLimitDecision {
        if !self.policy.rate_limit_enabled {
            return RateLimitDecision::allow(self.policy.max_attempts);
        }

        let now = Instant::now();
        let mut window = self.attempts.entry(key.to_string()).or_default();
        prune(&mut window, now, self.policy.window);

        let used = u32::try_from(window.len()).unwrap_or(u32::MAX);
        if used >= self.policy.max_attempts {
            let retry_after = window
                .front()
                .map_or(self.policy.window, |oldest| {
                    self.policy.window.saturating_sub(now.duration_since(*oldest))
                });
            debug!(key = %key, ?retry_after, "Rate limit exceeded");
            return RateLimitDecision::deny(retry_after);
        }

        window.push_back(now);
        RateLimitDecision::allow(self.policy.max_attempts - used - 1)
    }

    async fn record_outcome(&self, key: &str, success: bool) {
        if success {
            self.failures.remove(key);
            return;
        }
        let now = Instant::now();
        let mut window = self.failures.entry(key.to_string()).or_default();
        prune(&mut window, now, self.policy.window);
        window.push_back(now);
    }
}
