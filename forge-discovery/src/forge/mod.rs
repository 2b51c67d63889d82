//! Forge client contract and implementations.
//!
//! Every forge type (GitHub, GitLab, Forgejo, a local directory tree) is
//! reached through the [`ForgeClient`] trait. The discovery service only ever
//! calls the trait and never branches on the concrete client.
//!
//! # Module Structure
//!
//! - [`github`] - GitHub client built on octocrab
//! - [`local`] - Filesystem stand-in used for local workspaces
//! - [`mock`] - Deterministic in-memory client for tests
//! - [`pagination`] - Page walking shared by HTTP clients
//! - [`factory`] - Builds the right client for a forge configuration

mod error;
pub mod factory;
pub mod github;
mod kind;
pub mod local;
pub mod mock;
mod organization;
pub mod pagination;
mod probe;
mod repository;
mod webhook;

pub use error::ForgeError;
pub use factory::create_client;
pub use kind::ForgeType;
pub use organization::Organization;
pub use probe::{DocProbe, DEFAULT_DOC_PATHS, DEFAULT_IGNORE_FILE};
pub use repository::{Repository, FORGE_NAME_KEY, FORGE_TYPE_KEY};
pub use webhook::{WebhookEvent, WebhookEventKind};

use async_trait::async_trait;

/// Access to one forge instance.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the discovery service shares a
/// single client across all concurrent probes for its forge.
///
/// # Ordering
///
/// No ordering is guaranteed between calls, nor within returned lists.
#[async_trait]
pub trait ForgeClient: Send + Sync {
    /// Returns the type of forge this client talks to.
    fn forge_type(&self) -> ForgeType;

    /// Returns the configured name of this forge instance.
    fn name(&self) -> &str;

    /// Lists every organization or group visible to the client.
    async fn list_organizations(&self) -> Result<Vec<Organization>, ForgeError>;

    /// Lists the repositories belonging to the given organizations.
    ///
    /// `organizations` holds [`Organization::name`] values as emitted by
    /// [`ForgeClient::list_organizations`] or taken from configuration.
    async fn list_repositories(
        &self,
        organizations: &[String],
    ) -> Result<Vec<Repository>, ForgeError>;

    /// Fetches a single repository.
    async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository, ForgeError>;

    /// Probes a repository for documentation, setting `has_docs` and `has_doc_ignore`.
    async fn check_documentation(&self, repository: &mut Repository) -> Result<(), ForgeError>;

    /// Verifies a webhook signature. Forges without webhook support reject everything.
    fn validate_webhook(&self, _payload: &[u8], _signature: &str, _secret: &str) -> bool {
        false
    }

    /// Parses a webhook delivery.
    fn parse_webhook_event(
        &self,
        _payload: &[u8],
        event_type: &str,
    ) -> Result<WebhookEvent, ForgeError> {
        Err(ForgeError::NotImplemented(format!(
            "{} webhook events ({event_type})",
            self.forge_type()
        )))
    }

    /// Registers a webhook on a repository.
    async fn register_webhook(
        &self,
        repository: &Repository,
        _webhook_url: &str,
    ) -> Result<(), ForgeError> {
        Err(ForgeError::NotImplemented(format!(
            "webhook registration on {} for {}",
            self.forge_type(),
            repository.full_name
        )))
    }

    /// Returns the URL at which `file_path` can be edited on `branch`.
    fn edit_url(&self, repository: &Repository, file_path: &str, branch: &str) -> String;
}
