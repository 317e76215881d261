//! Configuration loader with multi-source merging

use crate::{Paths, TollgateConfig};
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
    user_config: bool,
}

impl ConfigLoader {
    /// Create a new config loader with default project directory (current dir)
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "TOLLGATE".to_string(),
            user_config: true,
        }
    }

    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the environment variable prefix (default: "TOLLGATE")
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Skip ~/.config/tollgate/config.toml
    pub fn without_user_config(mut self) -> Self {
        self.user_config = false;
        self
    }

    fn add_toml(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        file: PathBuf,
    ) -> config::ConfigBuilder<config::builder::DefaultState> {
        if file.exists() {
            builder.add_source(
                config::File::from(file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
        } else {
            builder
        }
    }

    /// Load configuration from all sources with proper precedence
    ///
    /// Environment variables use `__` between sections and keys, so field
    /// names keep their underscores: `TOLLGATE_AUTH__ACCESS_TTL_SECS=60`.
    pub fn load(self) -> Result<TollgateConfig> {
        let mut builder = config::Config::builder();

        // 1. Built-in defaults
        let defaults = TollgateConfig::default();
        builder = builder.add_source(
            config::Config::try_from(&defaults).context("Failed to encode default configuration")?,
        );

        // 2. User config (~/.config/tollgate/config.toml)
        if self.user_config {
            if let Ok(user_config_file) = Paths::new().user_config_file() {
                builder = Self::add_toml(builder, user_config_file);
            }
        }

        // 3. Project config (tollgate.toml)
        builder = Self::add_toml(builder, Paths::project_config_file(&self.project_dir));

        // 4. Local config (tollgate.local.toml, gitignored)
        builder = Self::add_toml(builder, Paths::local_config_file(&self.project_dir));

        // 5. Environment variables (TOLLGATE_*)
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let mut tollgate_config: TollgateConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        tollgate_config.resolve_paths(&self.project_dir);

        Ok(tollgate_config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
