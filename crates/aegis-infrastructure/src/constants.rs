//! Infrastructure layer constants
//!
//! Defaults for tunable behaviour. Domain-level limits are defined in
//! `aegis_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "aegis.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "aegis";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "AEGIS";

/// Separator for nested keys in environment variables (`AEGIS_HEALTH__RETRIES`)
pub const CONFIG_ENV_SEPARATOR: &str = "__";

/// Environment variable overriding the log filter
pub const LOG_FILTER_ENV: &str = "AEGIS_LOG";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Number of authentication events kept in memory
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 1000;

// ============================================================================
// CIRCUIT BREAKER CONSTANTS
// ============================================================================

/// Consecutive failures before the circuit opens
pub const CIRCUIT_BREAKER_FAILURE_THRESHOLD: u32 = 5;

/// Cooldown before a trial call is allowed (milliseconds)
pub const CIRCUIT_BREAKER_RECOVERY_TIMEOUT_MS: u64 = 60_000;

/// Window after which an isolated failure is forgotten (milliseconds)
pub const CIRCUIT_BREAKER_MONITORING_PERIOD_MS: u64 = 300_000;

/// Time a trial call may hold the half-open slot (milliseconds)
pub const CIRCUIT_BREAKER_EXPECTED_RECOVERY_MS: u64 = 30_000;

// ============================================================================
// HEALTH CHECK CONSTANTS
// ============================================================================

/// Per-provider probe interval (milliseconds)
pub const HEALTH_CHECK_INTERVAL_MS: u64 = 30_000;

/// Probe timeout (milliseconds)
pub const HEALTH_CHECK_TIMEOUT_MS: u64 = 5_000;

/// Probe retries after the first attempt
pub const HEALTH_CHECK_RETRIES: u32 = 2;

/// Lower bound for a reported probe duration (milliseconds)
pub const HEALTH_CHECK_MIN_RESPONSE_TIME_MS: u64 = 1;

/// Manager-level sweep interval (milliseconds)
pub const MANAGER_HEALTH_INTERVAL_MS: u64 = 60_000;

// ============================================================================
// VALIDATION CONSTANTS
// ============================================================================

/// Minimum password length
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Minimum username length
pub const USERNAME_MIN_LENGTH: usize = 3;

/// Maximum username length
pub const USERNAME_MAX_LENGTH: usize = 64;

/// Allowed username characters
pub const USERNAME_PATTERN: &str = r"^[A-Za-z0-9._@-]+$";

/// Warn when a token expires within this many seconds
pub const TOKEN_EXPIRY_WARNING_SECS: i64 = 300;

/// Maximum items in one validation batch
pub const VALIDATION_MAX_BATCH_SIZE: usize = 100;

// ============================================================================
// SESSION CONSTANTS
// ============================================================================

/// Session lifetime (seconds)
pub const SESSION_TTL_SECS: i64 = 3600;

/// Refresh a session when it expires within this many seconds
pub const SESSION_REFRESH_WINDOW_SECS: i64 = 300;

// ============================================================================
// SECURITY CONSTANTS
// ============================================================================

/// Rate limit window (seconds)
pub const RATE_LIMIT_WINDOW_SECS: u64 = 900;

/// Attempts allowed per window
pub const RATE_LIMIT_MAX_ATTEMPTS: u32 = 5;

/// Failed attempts after which a key is considered suspicious
pub const SUSPICIOUS_FAILURE_THRESHOLD: u32 = 3;

/// Risk score at which an attempt is blocked
pub const SUSPICIOUS_BLOCK_SCORE: u8 = 70;

// ============================================================================
// ORCHESTRATOR CONSTANTS
// ============================================================================

/// Provider initialization budget (milliseconds)
pub const PROVIDER_INIT_TIMEOUT_MS: u64 = 10_000;

/// Provider shutdown budget (milliseconds)
pub const PROVIDER_SHUTDOWN_TIMEOUT_MS: u64 = 5_000;
