//! Service configuration

use domain_audit::AuditPolicy;
use serde::Deserialize;
use std::time::Duration;

/// Audit service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditServiceConfig {
    /// Database URL
    pub database_url: String,
    /// Minutes of lateness below which an assumed-timezone delivery is
    /// treated as ambiguous
    pub ambiguity_threshold_minutes: i64,
    /// Hard bound on live-tracking probe calls, in milliseconds
    pub probe_timeout_ms: u64,
    /// Log level
    pub log_level: String,
}

impl Default for AuditServiceConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/freight_audit".to_string(),
            ambiguity_threshold_minutes: 30,
            probe_timeout_ms: 5_000,
            log_level: "info".to_string(),
        }
    }
}

impl AuditServiceConfig {
    /// Loads configuration from `AUDIT_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("AUDIT"))
            .build()?
            .try_deserialize()
    }

    pub fn audit_policy(&self) -> AuditPolicy {
        AuditPolicy {
            ambiguity_threshold_minutes: self.ambiguity_threshold_minutes,
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_threshold() {
        let config = AuditServiceConfig::default();
        assert_eq!(config.audit_policy().ambiguity_threshold_minutes, 30);
        assert_eq!(config.probe_timeout(), Duration::from_secs(5));
    }
}
