//! Forge type identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of service hosting a set of repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForgeType {
    /// github.com or GitHub Enterprise.
    #[serde(rename = "github")]
    GitHub,
    /// gitlab.com or a self-hosted GitLab.
    #[serde(rename = "gitlab")]
    GitLab,
    /// Forgejo / Gitea.
    Forgejo,
    /// A directory tree on the local filesystem.
    Local,
}

impl ForgeType {
    /// Returns the identifier used in configuration files and repository metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            ForgeType::GitHub => "github",
            ForgeType::GitLab => "gitlab",
            ForgeType::Forgejo => "forgejo",
            ForgeType::Local => "local",
        }
    }
}

impl fmt::Display for ForgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForgeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" => Ok(ForgeType::GitHub),
            "gitlab" => Ok(ForgeType::GitLab),
            "forgejo" | "gitea" => Ok(ForgeType::Forgejo),
            "local" => Ok(ForgeType::Local),
            other => Err(format!("unknown forge type '{other}'")),
        }
    }
}
