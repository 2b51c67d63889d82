//! Repository discovery across every registered forge.
//!
//! A run fans out over forges (at most [`DiscoveryLimits::forge_concurrency`]
//! at a time). For each forge the scan scope is resolved, repositories are
//! listed, and every repository is probed for documentation and filtered in
//! the same task (at most [`DiscoveryLimits::probe_concurrency`] probes in
//! flight per forge). Forges and probes are spawned as runtime tasks, so they
//! execute in parallel on a multi-thread runtime. Failures are recorded per
//! forge and never abort the run.

mod error;
mod result;

pub use error::DiscoveryError;
pub use result::{BuildRepository, DiscoveryResult, FilteredRepository, ForgeStats};

use crate::concurrency::run_bounded;
use crate::config::{DiscoveryLimits, FilteringConfig};
use crate::filter::decide;
use crate::forge::{Organization, Repository};
use crate::registry::{ForgeManager, RegisteredForge};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Number of filter decisions per forge written to the debug log.
const DECISION_SAMPLE_SIZE: usize = 5;

/// Everything discovered on a single forge.
#[derive(Debug, Default)]
pub struct ForgeDiscovery {
    /// Repositories that passed the filter.
    pub repositories: Vec<Repository>,
    /// Organizations reported by the forge.
    pub organizations: Vec<Organization>,
    /// Repositories the filter excluded.
    pub filtered: Vec<FilteredRepository>,
}

/// Coordinates discovery over the forges of a [`ForgeManager`].
pub struct DiscoveryService {
    forges: ForgeManager,
    filtering: Arc<FilteringConfig>,
    limits: DiscoveryLimits,
}

impl DiscoveryService {
    /// Creates a service with default concurrency limits.
    pub fn new(forges: ForgeManager, filtering: FilteringConfig) -> Self {
        Self {
            forges,
            filtering: Arc::new(filtering),
            limits: DiscoveryLimits::default(),
        }
    }

    /// Overrides the concurrency limits. Zero is raised to one.
    pub fn with_limits(mut self, limits: DiscoveryLimits) -> Self {
        self.limits = DiscoveryLimits {
            forge_concurrency: limits.forge_concurrency.max(1),
            probe_concurrency: limits.probe_concurrency.max(1),
        };
        self
    }

    /// Returns the forge registry.
    pub fn manager(&self) -> &ForgeManager {
        &self.forges
    }

    /// Returns the active filter policy.
    pub fn filtering(&self) -> &FilteringConfig {
        &self.filtering
    }

    /// Returns the active concurrency limits.
    pub fn limits(&self) -> DiscoveryLimits {
        self.limits
    }

    /// Discovers repositories on every registered forge.
    ///
    /// Per-forge failures are reported in [`DiscoveryResult::errors`]; inspect
    /// it to detect degraded runs. Once `cancel` fires, this returns promptly
    /// with whatever was aggregated so far: unfinished forge and probe tasks
    /// are aborted, including any pending rate-limit wait.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Worker`] if a forge task panics.
    pub async fn discover_all(
        &self,
        cancel: &CancellationToken,
    ) -> Result<DiscoveryResult, DiscoveryError> {
        let started = Instant::now();
        let forges = self.forges.snapshot();

        if forges.is_empty() {
            info!("No forges registered, nothing to discover");
            return Ok(DiscoveryResult::empty());
        }
        if cancel.is_cancelled() {
            warn!("Discovery cancelled before it started");
            return Ok(DiscoveryResult::empty());
        }

        info!(
            forges = forges.len(),
            forge_concurrency = self.limits.forge_concurrency,
            probe_concurrency = self.limits.probe_concurrency,
            "Starting discovery"
        );

        let aggregate = Arc::new(Mutex::new(DiscoveryResult::empty()));
        let wave = run_bounded(forges, self.limits.forge_concurrency, |forge| {
            let aggregate = Arc::clone(&aggregate);
            let policy = Arc::clone(&self.filtering);
            let probe_concurrency = self.limits.probe_concurrency;
            let cancel = cancel.clone();
            async move {
                if cancel.is_cancelled() {
                    warn!(forge = %forge.name, "Discovery cancelled, skipping forge");
                    return;
                }

                let span = info_span!(
                    "discover_forge",
                    forge = %forge.name,
                    forge_type = %forge.client.forge_type()
                );
                let outcome = discover_registered(&forge, policy, probe_concurrency, &cancel)
                    .instrument(span)
                    .await;

                let mut result = aggregate.lock().await;
                match outcome {
                    Ok(found) => result.record_forge(&forge.name, found),
                    Err(e) => {
                        error!(forge = %forge.name, error = %e, "Forge discovery failed");
                        result.errors.insert(forge.name.clone(), e);
                    }
                }
            }
        });

        tokio::select! {
            joined = wave => {
                if let Err(e) = joined {
                    error!(error = %e, "Discovery worker failed");
                    return Err(DiscoveryError::Worker(e));
                }
            }
            () = cancel.cancelled() => {
                warn!("Discovery cancelled, returning partial result");
            }
        }

        let mut result = std::mem::replace(&mut *aggregate.lock().await, DiscoveryResult::empty());
        result.duration = started.elapsed();

        info!(
            repositories = result.repositories.len(),
            filtered = result.filtered.len(),
            failed_forges = result.errors.len(),
            duration_ms = result.duration.as_millis() as u64,
            "Discovery complete"
        );
        Ok(result)
    }

    /// Discovers and filters the repositories of one forge.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] if the forge has no configuration, if the
    /// repository listing fails, if organization listing fails while
    /// auto-discovering the scope, or if a documentation check task panics.
    pub async fn discover_forge(
        &self,
        forge: &RegisteredForge,
        cancel: &CancellationToken,
    ) -> Result<ForgeDiscovery, DiscoveryError> {
        discover_registered(
            forge,
            Arc::clone(&self.filtering),
            self.limits.probe_concurrency,
            cancel,
        )
        .await
    }
}

async fn discover_registered(
    forge: &RegisteredForge,
    policy: Arc<FilteringConfig>,
    probe_concurrency: usize,
    cancel: &CancellationToken,
) -> Result<ForgeDiscovery, DiscoveryError> {
    let name = forge.name.as_str();
    let client = &forge.client;
    let config = forge
        .config
        .as_ref()
        .ok_or_else(|| DiscoveryError::MissingConfig {
            forge: name.to_string(),
        })?;

    let targets = config.targets();
    let (organizations, repositories) = if targets.is_empty() {
        info!("No organizations configured, auto-discovering");
        let organizations =
            client
                .list_organizations()
                .await
                .map_err(|source| DiscoveryError::ListOrganizations {
                    forge: name.to_string(),
                    source,
                })?;

        if organizations.is_empty() {
            warn!("Auto-discovery found no organizations");
            return Ok(ForgeDiscovery::default());
        }

        // The same listing seeds both the metadata and the scan scope.
        let scope: Vec<String> = organizations.iter().map(|o| o.name.clone()).collect();
        debug!(organizations = ?scope, "Auto-discovered organizations");
        let repositories = client.list_repositories(&scope).await.map_err(|source| {
            DiscoveryError::ListRepositories {
                forge: name.to_string(),
                source,
            }
        })?;
        (organizations, repositories)
    } else {
        debug!(organizations = ?targets, "Using configured organizations");
        let (organizations, repositories) = tokio::join!(
            client.list_organizations(),
            client.list_repositories(&targets)
        );
        let organizations = organizations.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to fetch organization metadata, continuing without it");
            Vec::new()
        });
        let repositories = repositories.map_err(|source| DiscoveryError::ListRepositories {
            forge: name.to_string(),
            source,
        })?;
        (organizations, repositories)
    };

    let mut tagged = Vec::with_capacity(repositories.len());
    for mut repository in repositories {
        if repository.full_name.trim().is_empty() {
            warn!(id = %repository.id, "Skipping repository without a full name");
            continue;
        }
        repository.tag_forge(name, client.forge_type());
        tagged.push(repository);
    }

    let total = tagged.len();
    info!(count = total, "Found repositories");

    let found = Arc::new(Mutex::new(ForgeDiscovery {
        organizations,
        ..Default::default()
    }));
    let sampled = Arc::new(AtomicUsize::new(0));

    run_bounded(tagged, probe_concurrency, |mut repository| {
        let client = Arc::clone(client);
        let policy = Arc::clone(&policy);
        let found = Arc::clone(&found);
        let sampled = Arc::clone(&sampled);
        let cancel = cancel.clone();
        async move {
            if cancel.is_cancelled() {
                debug!(repo = %repository.full_name, "Discovery cancelled, skipping probe");
                return;
            }

            if let Err(e) = client.check_documentation(&mut repository).await {
                warn!(
                    repo = %repository.full_name,
                    error = %e,
                    "Documentation probe failed, treating repository as undocumented"
                );
                repository.mark_undocumented();
            }

            let decision = decide(&repository, &policy);
            if sampled.fetch_add(1, Ordering::Relaxed) < DECISION_SAMPLE_SIZE {
                debug!(
                    repo = %repository.full_name,
                    has_docs = repository.has_docs,
                    has_doc_ignore = repository.has_doc_ignore,
                    include = decision.include,
                    reason = %decision.reason,
                    "Filter decision"
                );
            }

            let mut found = found.lock().await;
            if decision.include {
                found.repositories.push(repository);
            } else {
                found
                    .filtered
                    .push(FilteredRepository::new(repository, decision));
            }
        }
        .in_current_span()
    })
    .await
    .map_err(|source| DiscoveryError::CheckTask {
        forge: name.to_string(),
        source,
    })?;

    let found = std::mem::take(&mut *found.lock().await);

    if total > 0 && found.repositories.is_empty() {
        debug!(
            total,
            required_paths = ?policy.required_paths,
            include_patterns = ?policy.include_patterns,
            exclude_patterns = ?policy.exclude_patterns,
            ignore_files = ?policy.ignore_files,
            "Every repository was filtered out"
        );
    }

    info!(
        included = found.repositories.len(),
        filtered = found.filtered.len(),
        "Forge discovery complete"
    );
    Ok(found)
}
