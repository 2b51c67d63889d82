//! Forge client construction.
//!
//! Callers build clients through [`create_client`] so that nothing outside
//! this module depends on a concrete client type.

use std::sync::Arc;
use tracing::debug;

use super::github::GitHubClient;
use super::local::LocalForge;
use super::{DocProbe, ForgeClient, ForgeError, ForgeType};
use crate::config::ForgeConfig;

/// Builds the client for a configured forge.
///
/// # Errors
///
/// Returns [`ForgeError::NotImplemented`] for forge types without a client
/// in this crate, and propagates client construction failures.
pub fn create_client(
    config: &ForgeConfig,
    probe: &DocProbe,
) -> Result<Arc<dyn ForgeClient>, ForgeError> {
    debug!(forge = %config.name, forge_type = %config.forge_type, "Creating forge client");

    match config.forge_type {
        ForgeType::GitHub => {
            let client = GitHubClient::new(config, config.token(), probe.clone())?;
            Ok(Arc::new(client))
        }
        ForgeType::Local => {
            let root = config.root.clone().ok_or_else(|| {
                ForgeError::NotFound(format!("root directory for local forge '{}'", config.name))
            })?;
            Ok(Arc::new(LocalForge::new(
                config.name.clone(),
                root,
                probe.clone(),
            )))
        }
        ForgeType::GitLab | ForgeType::Forgejo => Err(ForgeError::NotImplemented(format!(
            "{} client for forge '{}'",
            config.forge_type, config.name
        ))),
    }
}
