//! Repository filtering policy.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rules deciding which discovered repositories are published.
///
/// Patterns use the glob subset described in [`crate::filter::matches_pattern`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FilteringConfig {
    /// Repositories must contain documentation at one of these paths.
    pub required_paths: Vec<String>,

    /// When non-empty, the repository name or full name must match one of these.
    pub include_patterns: Vec<String>,

    /// Repositories whose name or full name matches one of these are dropped.
    pub exclude_patterns: Vec<String>,

    /// Marker files that opt a repository out (e.g. `.docignore`).
    pub ignore_files: Vec<String>,
}

impl FilteringConfig {
    /// Checks that no rule list contains an empty entry.
    pub(crate) fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let lists = [
            ("required-paths", &self.required_paths),
            ("include-patterns", &self.include_patterns),
            ("exclude-patterns", &self.exclude_patterns),
            ("ignore-files", &self.ignore_files),
        ];
        for (key, values) in lists {
            if values.iter().any(|v| v.trim().is_empty()) {
                return Err(ConfigError::validation(
                    path,
                    format!("filtering.{key} must not contain empty entries"),
                ));
            }
        }
        Ok(())
    }
}
