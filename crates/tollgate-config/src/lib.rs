//! Configuration management for Tollgate
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (TOLLGATE_* prefix, highest precedence)
//! 2. tollgate.local.toml (gitignored, local overrides)
//! 3. tollgate.toml (git-tracked, project config)
//! 4. ~/.config/tollgate/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tollgate_store::Seed;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main Tollgate configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TollgateConfig {
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    /// Roles, resources and rules applied on start. `None` means the
    /// standard seed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<Seed>,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for signing credentials. Must be set.
    pub secret: String,
    pub issuer: String,
    pub audience: Vec<String>,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &if self.secret.is_empty() { "<unset>" } else { "<redacted>" })
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: "tollgate".to_string(),
            audience: vec!["tollgate".to_string()],
            access_ttl_secs: 15 * 60,
            refresh_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl AuthConfig {
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_secs)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON snapshot of the store. Relative paths resolve against the
    /// project directory.
    pub snapshot: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot: PathBuf::from(".tollgate/store.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive. `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl TollgateConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// The seed to apply: the configured one, or the standard seed.
    pub fn effective_seed(&self) -> Seed {
        self.seed.clone().unwrap_or_default()
    }

    /// Checks values the type system cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.secret.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.secret must be set".to_string(),
            ));
        }
        if self.auth.access_ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "auth.access_ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.auth.refresh_ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "auth.refresh_ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.auth.audience.is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.audience must name at least one audience".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve relative paths to absolute
    pub fn resolve_paths(&mut self, base_dir: impl AsRef<Path>) {
        let base = base_dir.as_ref();

        if self.storage.snapshot.is_relative() {
            self.storage.snapshot = base.join(&self.storage.snapshot);
        }
    }

    /// Renders the configuration as a `tollgate.toml` document.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration as TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> TollgateConfig {
        let mut config = TollgateConfig::default();
        config.auth.secret = "s3cret".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = TollgateConfig::default();
        assert_eq!(config.auth.access_ttl(), Duration::from_secs(900));
        assert_eq!(config.auth.refresh_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.storage.snapshot, PathBuf::from(".tollgate/store.json"));
        assert_eq!(config.effective_seed(), Seed::standard());
    }

    #[test]
    fn test_validation() {
        assert!(valid().validate().is_ok());

        // The default secret is empty on purpose.
        assert!(TollgateConfig::default().validate().is_err());

        let mut config = valid();
        config.auth.access_ttl_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        let mut config = valid();
        config.auth.refresh_ttl_secs = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.auth.audience.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        assert!(!format!("{:?}", valid()).contains("s3cret"));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = valid();
        config.seed = Some(Seed::standard());

        let rendered = config.to_toml().unwrap();
        let parsed: TollgateConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.auth.secret, "s3cret");
        assert_eq!(parsed.seed, Some(Seed::standard()));
    }

    #[test]
    fn test_path_resolution() {
        let mut config = TollgateConfig::default();
        config.resolve_paths("/srv/shop");

        assert_eq!(
            config.storage.snapshot,
            PathBuf::from("/srv/shop/.tollgate/store.json")
        );
    }
}
