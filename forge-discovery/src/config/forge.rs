//! Per-forge configuration.

use super::ConfigError;
use crate::forge::ForgeType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable read for GitHub tokens when `token-env` is unset.
pub const DEFAULT_GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Configuration for one forge instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ForgeConfig {
    /// Unique name of this forge instance (e.g. "github-main").
    pub name: String,

    /// Kind of forge.
    #[serde(rename = "type")]
    pub forge_type: ForgeType,

    /// API base URL, for self-hosted instances.
    #[serde(default)]
    pub api_url: Option<String>,

    /// Web base URL used when building edit links.
    #[serde(default)]
    pub web_url: Option<String>,

    /// Environment variable holding the access token.
    #[serde(default)]
    pub token_env: Option<String>,

    /// Organizations to scan.
    #[serde(default)]
    pub organizations: Vec<String>,

    /// Groups to scan (GitLab terminology, concatenated with `organizations`).
    #[serde(default)]
    pub groups: Vec<String>,

    /// Root directory for `local` forges.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

impl ForgeConfig {
    /// Creates a configuration with no scope, which triggers auto-discovery.
    pub fn new(name: impl Into<String>, forge_type: ForgeType) -> Self {
        Self {
            name: name.into(),
            forge_type,
            api_url: None,
            web_url: None,
            token_env: None,
            organizations: Vec::new(),
            groups: Vec::new(),
            root: None,
        }
    }

    /// Sets the organizations to scan.
    pub fn with_organizations<I, S>(mut self, organizations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.organizations = organizations.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the groups to scan.
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the root directory of a local forge.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Returns the explicit scan scope: organizations followed by groups.
    ///
    /// An empty scope means the forge is auto-discovered.
    pub fn targets(&self) -> Vec<String> {
        self.organizations
            .iter()
            .chain(self.groups.iter())
            .cloned()
            .collect()
    }

    /// Resolves the access token from the environment.
    pub fn token(&self) -> Option<String> {
        let var = match (&self.token_env, self.forge_type) {
            (Some(var), _) => var.as_str(),
            (None, ForgeType::GitHub) => DEFAULT_GITHUB_TOKEN_ENV,
            (None, _) => return None,
        };
        std::env::var(var).ok().filter(|token| !token.trim().is_empty())
    }

    /// Validates a single forge entry.
    pub(crate) fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::validation(path, message);

        if self.name.trim().is_empty() {
            return Err(invalid("forge name must not be empty".to_string()));
        }

        for (key, value) in [("api-url", &self.api_url), ("web-url", &self.web_url)] {
            if let Some(value) = value {
                if Url::parse(value).is_err() {
                    return Err(invalid(format!(
                        "forge '{}': {key} is not a valid URL: {value}",
                        self.name
                    )));
                }
            }
        }

        if self.forge_type == ForgeType::Local && self.root.is_none() {
            return Err(invalid(format!(
                "forge '{}': local forges require a root",
                self.name
            )));
        }

        if self.targets().iter().any(|t| t.trim().is_empty()) {
            return Err(invalid(format!(
                "forge '{}': organizations and groups must not contain empty entries",
                self.name
            )));
        }

        Ok(())
    }
}
