//! Aggregated output of a discovery run.

use super::{DiscoveryError, ForgeDiscovery};
use crate::config::FilteringConfig;
use crate::filter::{FilterDecision, FilterReason};
use crate::forge::{Organization, Repository, FORGE_NAME_KEY, FORGE_TYPE_KEY};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::time::Duration;

/// Documentation path exported when the policy requires none.
const DEFAULT_BUILD_PATH: &str = "docs";

/// A repository the filter engine excluded, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilteredRepository {
    /// The excluded repository.
    #[serde(flatten)]
    pub repository: Repository,

    /// Rule that excluded it.
    pub filter_reason: FilterReason,

    /// Extra context, e.g. the matching exclude pattern.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_detail: Option<String>,
}

impl FilteredRepository {
    /// Records an exclusion decision against a repository.
    pub fn new(repository: Repository, decision: FilterDecision) -> Self {
        Self {
            repository,
            filter_reason: decision.reason,
            filter_detail: decision.detail,
        }
    }
}

/// Per-forge repository counts, recorded when the forge's results are merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ForgeStats {
    /// Repositories that passed the filter.
    pub included: usize,
    /// Repositories the filter excluded.
    pub filtered: usize,
}

/// Result of one full discovery run.
#[derive(Debug, Serialize)]
pub struct DiscoveryResult {
    /// Repositories that passed the filter, in no particular order.
    pub repositories: Vec<Repository>,

    /// Organizations seen per forge.
    pub organizations: BTreeMap<String, Vec<Organization>>,

    /// Repositories the filter excluded.
    pub filtered: Vec<FilteredRepository>,

    /// Counts per successfully discovered forge, keyed by registered name.
    pub forge_stats: BTreeMap<String, ForgeStats>,

    /// Forges that failed entirely.
    #[serde(serialize_with = "serialize_errors")]
    pub errors: BTreeMap<String, DiscoveryError>,

    /// When the run started.
    pub timestamp: DateTime<Utc>,

    /// How long the run took, serialized as nanoseconds.
    #[serde(serialize_with = "serialize_duration_nanos")]
    pub duration: Duration,
}

/// A repository in the shape consumed by the site build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildRepository {
    /// Repository name.
    pub name: String,
    /// Clone URL.
    pub url: String,
    /// Branch to build.
    pub branch: String,
    /// Documentation paths inside the repository.
    pub paths: Vec<String>,
    /// Descriptive tags carried into the generated site.
    pub tags: BTreeMap<String, String>,
}

impl DiscoveryResult {
    /// Creates an empty result stamped with the current time.
    pub fn empty() -> Self {
        Self {
            repositories: Vec::new(),
            organizations: BTreeMap::new(),
            filtered: Vec::new(),
            forge_stats: BTreeMap::new(),
            errors: BTreeMap::new(),
            timestamp: Utc::now(),
            duration: Duration::ZERO,
        }
    }

    /// Merges everything discovered on `forge` into the run.
    pub fn record_forge(&mut self, forge: &str, found: ForgeDiscovery) {
        self.forge_stats.insert(
            forge.to_string(),
            ForgeStats {
                included: found.repositories.len(),
                filtered: found.filtered.len(),
            },
        );
        self.repositories.extend(found.repositories);
        self.filtered.extend(found.filtered);
        self.organizations
            .insert(forge.to_string(), found.organizations);
    }

    /// Returns true if any forge failed.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Included repositories tagged with `forge` as their forge name.
    pub fn repositories_for<'a>(&'a self, forge: &'a str) -> impl Iterator<Item = &'a Repository> {
        self.repositories
            .iter()
            .filter(move |repo| repo.forge_name() == Some(forge))
    }

    /// Serializes the result as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Converts the included repositories into site-build entries.
    pub fn build_repositories(&self, filtering: &FilteringConfig) -> Vec<BuildRepository> {
        let paths = if filtering.required_paths.is_empty() {
            vec![DEFAULT_BUILD_PATH.to_string()]
        } else {
            filtering.required_paths.clone()
        };

        self.repositories
            .iter()
            .map(|repo| {
                let mut tags = BTreeMap::new();
                for key in [FORGE_NAME_KEY, FORGE_TYPE_KEY] {
                    if let Some(value) = repo.metadata.get(key) {
                        tags.insert(key.to_string(), value.clone());
                    }
                }
                tags.insert("full_name".to_string(), repo.full_name.clone());
                if let Some(language) = &repo.language {
                    tags.insert("language".to_string(), language.clone());
                }
                if !repo.description.is_empty() {
                    tags.insert("description".to_string(), repo.description.clone());
                }

                BuildRepository {
                    name: repo.name.clone(),
                    url: repo.clone_url.clone(),
                    branch: repo.default_branch.clone(),
                    paths: paths.clone(),
                    tags,
                }
            })
            .collect()
    }
}

fn serialize_errors<S: Serializer>(
    errors: &BTreeMap<String, DiscoveryError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(errors.iter().map(|(forge, error)| (forge, error.to_string())))
}

fn serialize_duration_nanos<S: Serializer>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX))
}
