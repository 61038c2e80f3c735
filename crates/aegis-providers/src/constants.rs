//! Provider-specific constants

/// Lifetime of access tokens issued by the reference providers, in seconds
pub const ISSUED_TOKEN_TTL_SECS: i64 = 3600;

/// Length of generated activation codes
pub const ACTIVATION_CODE_LENGTH: usize = 6;

/// Default base DN of the directory provider
pub const DEFAULT_DIRECTORY_BASE_DN: &str = "dc=example,dc=com";

/// Directory provider setting: base DN
pub const SETTING_BASE_DN: &str = "base_dn";

/// Provider setting: lifetime of issued tokens, in seconds
pub const SETTING_TOKEN_TTL_SECS: &str = "token_ttl_secs";

/// Default capacity of the in-memory event buffer
pub const DEFAULT_EVENT_CAPACITY: usize = 1000;

/// Default rate limit window, in seconds
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 900;

/// Default attempts allowed per window
pub const DEFAULT_RATE_LIMIT_MAX_ATTEMPTS: u32 = 5;

/// Default failures before an identity is considered under attack
pub const DEFAULT_SUSPICIOUS_FAILURE_THRESHOLD: u32 = 3;

/// Default risk score at which attempts are blocked
pub const DEFAULT_BLOCK_RISK_SCORE: u8 = 70;

/// Risk added when the user agent is missing
pub const RISK_MISSING_USER_AGENT: u8 = 20;

/// Risk added when the user agent looks automated
pub const RISK_AUTOMATED_USER_AGENT: u8 = 30;

/// Risk added when the source address is missing or unspecified
pub const RISK_UNKNOWN_ADDRESS: u8 = 10;

/// Risk added when the source address is not parseable
pub const RISK_MALFORMED_ADDRESS: u8 = 25;

/// Risk added when recent failures reach the threshold
pub const RISK_REPEATED_FAILURES: u8 = 50;

/// User agent fragments typical of scripted clients
pub const AUTOMATED_USER_AGENT_MARKERS: &[&str] = &["curl", "wget", "python-requests", "bot"];

/// Metric name: authentication attempts
pub const METRIC_ATTEMPTS: &str = "aegis_auth_attempts_total";

/// Metric name: authentication outcomes
pub const METRIC_OUTCOMES: &str = "aegis_auth_outcomes_total";

/// Metric name: authentication latency
pub const METRIC_LATENCY: &str = "aegis_auth_latency_seconds";
