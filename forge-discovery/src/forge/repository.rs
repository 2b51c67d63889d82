//! Discovered repository information.

use super::ForgeType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Metadata key holding the name of the forge a repository came from.
pub const FORGE_NAME_KEY: &str = "forge_name";

/// Metadata key holding the type of the forge a repository came from.
pub const FORGE_TYPE_KEY: &str = "forge_type";

/// A repository listed by a forge client.
///
/// `has_docs` and `has_doc_ignore` start out `false` and are set by the
/// documentation probe; everything else comes from the forge listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Forge-scoped identifier.
    pub id: String,

    /// Repository name.
    pub name: String,

    /// Full repository name in "owner/name" format.
    pub full_name: String,

    /// HTTPS clone URL.
    pub clone_url: String,

    /// SSH clone URL, if the forge exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_url: Option<String>,

    /// Default branch name (e.g., "main").
    pub default_branch: String,

    /// Repository description.
    #[serde(default)]
    pub description: String,

    /// Primary language as reported by the forge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Repository topics.
    #[serde(default)]
    pub topics: BTreeSet<String>,

    /// Whether the repository is private.
    #[serde(default)]
    pub private: bool,

    /// Whether the repository is archived.
    #[serde(default)]
    pub archived: bool,

    /// Whether a recognized documentation path exists.
    #[serde(default)]
    pub has_docs: bool,

    /// Whether an opt-out marker file (e.g. `.docignore`) exists.
    #[serde(default)]
    pub has_doc_ignore: bool,

    /// Last time the repository was updated.
    pub last_updated: DateTime<Utc>,

    /// Free-form metadata; carries `forge_name` and `forge_type` after discovery.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Repository {
    /// Creates a repository with the given identity and defaults for everything else.
    pub fn new(id: impl Into<String>, full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let name = full_name
            .rsplit('/')
            .next()
            .unwrap_or(full_name.as_str())
            .to_string();
        Self {
            id: id.into(),
            name,
            full_name,
            clone_url: String::new(),
            ssh_url: None,
            default_branch: "main".to_string(),
            description: String::new(),
            language: None,
            topics: BTreeSet::new(),
            private: false,
            archived: false,
            has_docs: false,
            has_doc_ignore: false,
            last_updated: Utc::now(),
            metadata: BTreeMap::new(),
        }
    }

    /// Returns the owner part of `full_name`.
    pub fn owner(&self) -> &str {
        self.full_name
            .rsplit_once('/')
            .map(|(owner, _)| owner)
            .unwrap_or_default()
    }

    /// Returns the forge this repository was discovered on, once tagged.
    pub fn forge_name(&self) -> Option<&str> {
        self.metadata.get(FORGE_NAME_KEY).map(String::as_str)
    }

    /// Records the originating forge in `metadata`.
    ///
    /// Values already set by the client are kept.
    pub fn tag_forge(&mut self, forge_name: &str, forge_type: ForgeType) {
        self.metadata
            .entry(FORGE_NAME_KEY.to_string())
            .or_insert_with(|| forge_name.to_string());
        self.metadata
            .entry(FORGE_TYPE_KEY.to_string())
            .or_insert_with(|| forge_type.to_string());
    }

    /// Resets the documentation flags to "undocumented".
    pub fn mark_undocumented(&mut self) {
        self.has_docs = false;
        self.has_doc_ignore = false;
    }
}
