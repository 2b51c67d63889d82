//! Configuration loading.
//!
//! This module parses the discovery configuration file: which forges to scan,
//! how to filter their repositories and how much concurrency to use.
//!
//! ```toml
//! [discovery]
//! forge-concurrency = 4
//! probe-concurrency = 20
//!
//! [filtering]
//! required-paths = ["docs"]
//! exclude-patterns = ["*-archive"]
//!
//! [[forges]]
//! name = "github-main"
//! type = "github"
//! organizations = ["acme"]
//! ```

mod error;
mod filtering;
mod forge;

pub use error::ConfigError;
pub use filtering::FilteringConfig;
pub use forge::{ForgeConfig, DEFAULT_GITHUB_TOKEN_ENV};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Default number of forges discovered at the same time.
pub const DEFAULT_FORGE_CONCURRENCY: usize = 4;

/// Default number of documentation probes in flight per forge.
pub const DEFAULT_PROBE_CONCURRENCY: usize = 20;

/// Concurrency ceilings for a discovery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DiscoveryLimits {
    /// Maximum forges processed simultaneously.
    pub forge_concurrency: usize,

    /// Maximum documentation probes in flight per forge.
    pub probe_concurrency: usize,
}

impl Default for DiscoveryLimits {
    fn default() -> Self {
        Self {
            forge_concurrency: DEFAULT_FORGE_CONCURRENCY,
            probe_concurrency: DEFAULT_PROBE_CONCURRENCY,
        }
    }
}

/// Complete contents of a discovery configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DiscoveryConfig {
    /// Concurrency ceilings.
    #[serde(default)]
    pub discovery: DiscoveryLimits,

    /// Repository filtering policy.
    #[serde(default)]
    pub filtering: FilteringConfig,

    /// Forges to scan.
    #[serde(default)]
    pub forges: Vec<ForgeConfig>,
}

impl DiscoveryConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing, unreadable, not valid
    /// TOML or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!(path = %path.display(), "Loading configuration");

        if !path.exists() {
            return Err(ConfigError::MissingFile {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let config = Self::parse(&content, path)?;
        debug!(forges = config.forges.len(), "Loaded configuration");
        Ok(config)
    }

    /// Parses and validates configuration text. `path` is only used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not valid TOML or fails validation.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })?;
        config.validate(path)?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first problem found.
    pub fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::validation(path, message);

        if self.discovery.forge_concurrency == 0 {
            return Err(invalid(
                "discovery.forge-concurrency must be at least 1".to_string(),
            ));
        }
        if self.discovery.probe_concurrency == 0 {
            return Err(invalid(
                "discovery.probe-concurrency must be at least 1".to_string(),
            ));
        }

        self.filtering.validate(path)?;

        let mut names = HashSet::new();
        for forge in &self.forges {
            forge.validate(path)?;
            if !names.insert(forge.name.as_str()) {
                return Err(invalid(format!("duplicate forge name '{}'", forge.name)));
            }
        }

        Ok(())
    }
}
