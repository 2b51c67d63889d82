//! Documentation probe settings shared by forge clients.

use crate::config::FilteringConfig;

/// Paths checked when the filter policy does not name any.
pub const DEFAULT_DOC_PATHS: &[&str] = &["docs", "documentation"];

/// Opt-out marker checked when the filter policy does not name any.
pub const DEFAULT_IGNORE_FILE: &str = ".docignore";

/// What a client looks for when probing a repository for documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocProbe {
    /// A repository has docs if any of these paths exists.
    pub doc_paths: Vec<String>,

    /// A repository opts out if any of these files exists at its root.
    pub ignore_files: Vec<String>,
}

impl DocProbe {
    /// Derives probe settings from the filter policy.
    pub fn from_filtering(filtering: &FilteringConfig) -> Self {
        let doc_paths = if filtering.required_paths.is_empty() {
            DEFAULT_DOC_PATHS.iter().map(|p| p.to_string()).collect()
        } else {
            filtering.required_paths.clone()
        };
        let ignore_files = if filtering.ignore_files.is_empty() {
            vec![DEFAULT_IGNORE_FILE.to_string()]
        } else {
            filtering.ignore_files.clone()
        };
        Self {
            doc_paths,
            ignore_files,
        }
    }
}

impl Default for DocProbe {
    fn default() -> Self {
        Self::from_filtering(&FilteringConfig::default())
    }
}
