//! Domain constants
//!
//! Limits that are part of the observable contract of the domain types.
//! Tunable operational defaults live in `aegis_infrastructure::constants`.

/// Maximum number of health check results kept per provider
pub const HEALTH_HISTORY_CAPACITY: usize = 100;

/// Uptime reported before any health check has run
pub const DEFAULT_UPTIME_PERCENT: f64 = 100.0;

/// Default token type issued by providers
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Session metadata key recording the provider that issued the session
pub const SESSION_METADATA_PROVIDER: &str = "provider";

/// Session metadata key recording the request that created the session
pub const SESSION_METADATA_REQUEST_ID: &str = "request_id";
