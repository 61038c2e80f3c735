//! Configuration loader
//!
//! Handles loading configuration from TOML files, environment variables and
//! default values, then validates the merged result.

use crate::config::{AppConfig, LoggingConfig, ProviderEntry};
use crate::constants::*;
use crate::error_ext::ErrorContext;
use crate::logging::{log_config_loaded, parse_log_level};
use aegis_domain::error::{Error, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader service
#[derive(Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources
    ///
    /// Configuration sources are merged in this order (later sources override earlier):
    /// 1. Default values from `AppConfig::default()`
    /// 2. TOML configuration file (explicit path, else the first default location found)
    /// 3. Environment variables with prefix, nested keys split on `__`
    ///    (e.g., `AEGIS_HEALTH__RETRIES=3`)
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if let Some(config_path) = &self.config_path {
            if config_path.exists() {
                figment = figment.merge(Toml::file(config_path));
                log_config_loaded(config_path, true);
            } else {
                log_config_loaded(config_path, false);
            }
        } else if let Some(default_path) = Self::find_default_config_path() {
            figment = figment.merge(Toml::file(&default_path));
            log_config_loaded(&default_path, true);
        }

        figment = figment.merge(
            Env::prefixed(&format!("{}_", self.env_prefix)).split(CONFIG_ENV_SEPARATOR),
        );

        let app_config: AppConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;

        validate_app_config(&app_config)?;

        Ok(app_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string).io_context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configured file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Find the first existing default configuration file
    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;

        let candidates = [
            Some(current_dir.join(DEFAULT_CONFIG_FILENAME)),
            Some(
                current_dir
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILENAME),
            ),
            dirs::config_dir().map(|d| d.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME)),
        ];

        candidates.into_iter().flatten().find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate application configuration
///
/// Performs validation of all configuration sections.
pub fn validate_app_config(config: &AppConfig) -> Result<()> {
    validate_logging_config(&config.logging)?;
    validate_resilience_config(config)?;
    validate_health_config(config)?;
    validate_validation_config(config)?;
    validate_session_config(config)?;
    validate_security_config(config)?;
    validate_providers(&config.providers)?;
    Ok(())
}

fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    parse_log_level(&config.level)?;
    if config.event_buffer_size == 0 {
        return Err(Error::configuration("Event buffer size cannot be 0"));
    }
    Ok(())
}

fn validate_resilience_config(config: &AppConfig) -> Result<()> {
    if config.resilience.failure_threshold == 0 {
        return Err(Error::configuration(
            "Circuit breaker failure threshold cannot be 0",
        ));
    }
    if config.resilience.recovery_timeout_ms == 0 {
        return Err(Error::configuration(
            "Circuit breaker recovery timeout cannot be 0",
        ));
    }
    Ok(())
}

fn validate_health_config(config: &AppConfig) -> Result<()> {
    let health = &config.health;
    if health.check_interval_ms == 0 {
        return Err(Error::configuration("Health check interval cannot be 0"));
    }
    if health.timeout_ms == 0 {
        return Err(Error::configuration("Health check timeout cannot be 0"));
    }
    if health.timeout_ms >= health.check_interval_ms {
        return Err(Error::configuration(format!(
            "Health check timeout ({}ms) must be smaller than the check interval ({}ms)",
            health.timeout_ms, health.check_interval_ms
        )));
    }
    if health.manager_interval_ms == 0 {
        return Err(Error::configuration("Manager health interval cannot be 0"));
    }
    Ok(())
}

fn validate_validation_config(config: &AppConfig) -> Result<()> {
    let validation = &config.validation;
    if validation.max_batch_size == 0 {
        return Err(Error::configuration("Validation batch size cannot be 0"));
    }
    if validation.min_username_length > validation.max_username_length {
        return Err(Error::configuration(
            "Minimum username length exceeds maximum username length",
        ));
    }
    regex::Regex::new(&validation.username_pattern)
        .config_context("Invalid username pattern")?;
    Ok(())
}

fn validate_session_config(config: &AppConfig) -> Result<()> {
    if config.session.ttl_secs <= 0 {
        return Err(Error::configuration("Session TTL must be positive"));
    }
    if config.session.refresh_window_secs < 0 {
        return Err(Error::configuration(
            "Session refresh window cannot be negative",
        ));
    }
    Ok(())
}

fn validate_security_config(config: &AppConfig) -> Result<()> {
    let security = &config.security;
    if security.rate_limit_enabled {
        if security.rate_limit_window_secs == 0 {
            return Err(Error::configuration(
                "Rate limit window cannot be 0 when rate limiting is enabled",
            ));
        }
        if security.rate_limit_max_attempts == 0 {
            return Err(Error::configuration(
                "Rate limit attempts cannot be 0 when rate limiting is enabled",
            ));
        }
    }
    if security.block_risk_score > 100 {
        return Err(Error::configuration("Block risk score must be within 0-100"));
    }
    Ok(())
}

fn validate_providers(providers: &[ProviderEntry]) -> Result<()> {
    let mut names = HashSet::new();
    for provider in providers {
        if provider.name.trim().is_empty() {
            return Err(Error::configuration("Provider name cannot be empty"));
        }
        if !names.insert(provider.name.as_str()) {
            return Err(Error::configuration(format!(
                "Duplicate provider name: {}",
                provider.name
            )));
        }
    }

    for provider in providers {
        for fallback in &provider.fallbacks {
            if fallback == &provider.name {
                return Err(Error::configuration(format!(
                    "Provider {} lists itself as a fallback",
                    provider.name
                )));
            }
            if !names.contains(fallback.as_str()) {
                return Err(Error::configuration(format!(
                    "Provider {} references undeclared fallback {}",
                    provider.name, fallback
                )));
            }
        }
    }
    Ok(())
}

/// Configuration builder for programmatic configuration
pub struct ConfigBuilder {
    config: AppConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with defaults
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Set logging configuration
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Set circuit breaker configuration
    pub fn with_resilience(mut self, resilience: crate::config::ResilienceConfig) -> Self {
        self.config.resilience = resilience;
        self
    }

    /// Set health probing configuration
    pub fn with_health(mut self, health: crate::config::HealthConfig) -> Self {
        self.config.health = health;
        self
    }

    /// Set security configuration
    pub fn with_security(mut self, security: crate::config::SecurityConfig) -> Self {
        self.config.security = security;
        self
    }

    /// Declare a provider
    pub fn with_provider(mut self, provider: ProviderEntry) -> Self {
        self.config.providers.push(provider);
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<AppConfig> {
        validate_app_config(&self.config)?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
