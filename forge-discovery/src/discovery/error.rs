//! Repository discovery error types.

use crate::forge::ForgeError;
use thiserror::Error;
use tokio::task::JoinError;

/// Errors that stop discovery of a single forge, or of the whole run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A client is registered without a configuration of the same name.
    #[error("forge '{forge}' has no configuration")]
    MissingConfig { forge: String },

    /// Organization listing failed while auto-discovering the scan scope.
    #[error("forge '{forge}': failed to list organizations: {source}")]
    ListOrganizations {
        forge: String,
        #[source]
        source: ForgeError,
    },

    /// Repository listing failed.
    #[error("forge '{forge}': failed to list repositories: {source}")]
    ListRepositories {
        forge: String,
        #[source]
        source: ForgeError,
    },

    /// A documentation check task panicked.
    #[error("forge '{forge}': documentation check task failed: {source}")]
    CheckTask {
        forge: String,
        #[source]
        source: JoinError,
    },

    /// A forge task panicked; the run cannot produce a result.
    #[error("discovery worker failed: {0}")]
    Worker(#[source] JoinError),
}

impl DiscoveryError {
    /// Name of the forge the error belongs to, if it is tied to one.
    pub fn forge(&self) -> Option<&str> {
        match self {
            DiscoveryError::MissingConfig { forge }
            | DiscoveryError::ListOrganizations { forge, .. }
            | DiscoveryError::ListRepositories { forge, .. }
            | DiscoveryError::CheckTask { forge, .. } => Some(forge),
            DiscoveryError::Worker(_) => None,
        }
    }
}
