//! Registry of configured forges.

use crate::config::ForgeConfig;
use crate::forge::ForgeClient;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// One forge as seen by a discovery run.
#[derive(Clone)]
pub struct RegisteredForge {
    /// Name the client reports.
    pub name: String,

    /// Matching configuration, if one was registered under the same name.
    pub config: Option<ForgeConfig>,

    /// Client used for every call against this forge.
    pub client: Arc<dyn ForgeClient>,
}

/// Maps forge names to their configuration and client.
///
/// Registration takes `&mut self` and discovery only borrows the manager, so
/// every forge is registered before a discovery run can start.
#[derive(Default, Clone)]
pub struct ForgeManager {
    configs: HashMap<String, ForgeConfig>,
    clients: HashMap<String, Arc<dyn ForgeClient>>,
}

impl ForgeManager {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a forge.
    ///
    /// The configuration is keyed by `config.name` and the client by
    /// `client.name()`. A later registration under the same name replaces the
    /// earlier one.
    pub fn add_forge(&mut self, config: ForgeConfig, client: Arc<dyn ForgeClient>) {
        let client_name = client.name().to_string();
        if client_name != config.name {
            warn!(
                config = %config.name,
                client = %client_name,
                "Forge client name differs from its configuration name"
            );
        }
        debug!(forge = %client_name, forge_type = %client.forge_type(), "Registered forge");

        self.configs.insert(config.name.clone(), config);
        self.clients.insert(client_name, client);
    }

    /// Returns the client registered under `name`.
    pub fn get_forge(&self, name: &str) -> Option<Arc<dyn ForgeClient>> {
        self.clients.get(name).cloned()
    }

    /// Returns every registered client by name.
    pub fn all_forges(&self) -> HashMap<String, Arc<dyn ForgeClient>> {
        self.clients.clone()
    }

    /// Returns every registered configuration by name.
    pub fn forge_configs(&self) -> HashMap<String, ForgeConfig> {
        self.configs.clone()
    }

    /// Number of registered clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no clients are registered.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Pairs every client with its configuration, sorted by name.
    pub fn snapshot(&self) -> Vec<RegisteredForge> {
        let mut forges: Vec<RegisteredForge> = self
            .clients
            .iter()
            .map(|(name, client)| RegisteredForge {
                name: name.clone(),
                config: self.configs.get(name).cloned(),
                client: Arc::clone(client),
            })
            .collect();
        forges.sort_by(|a, b| a.name.cmp(&b.name));
        forges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::MockForge;
    use crate::forge::ForgeType;

    #[test]
    fn add_and_get() {
        let mut manager = ForgeManager::new();
        assert!(manager.is_empty());

        manager.add_forge(
            ForgeConfig::new("gh", ForgeType::GitHub),
            Arc::new(MockForge::new("gh")),
        );

        assert_eq!(manager.len(), 1);
        assert!(manager.get_forge("gh").is_some());
        assert!(manager.get_forge("missing").is_none());
        assert!(manager.all_forges().contains_key("gh"));
        assert!(manager.forge_configs().contains_key("gh"));
    }

    #[test]
    fn snapshot_reports_missing_config() {
        let mut manager = ForgeManager::new();
        manager.add_forge(
            ForgeConfig::new("configured-as", ForgeType::GitHub),
            Arc::new(MockForge::new("client-name")),
        );

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name, "client-name");
        assert!(snapshot[0].config.is_none());
    }

    #[test]
    fn snapshot_is_sorted() {
        let mut manager = ForgeManager::new();
        for name in ["zeta", "alpha", "mid"] {
            manager.add_forge(
                ForgeConfig::new(name, ForgeType::Local),
                Arc::new(MockForge::new(name)),
            );
        }

        let names: Vec<_> = manager.snapshot().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }
}
