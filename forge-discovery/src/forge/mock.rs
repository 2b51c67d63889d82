//! Mock forge implementation for deterministic testing.
//!
//! The mock forge keeps organizations and repositories in memory, lets tests
//! choose which calls fail, and counts every call so tests can verify how the
//! discovery service used it.
//!
//! # Example
//!
//! ```
//! use forge_discovery::forge::mock::MockForge;
//! use forge_discovery::forge::{ForgeClient, Organization, Repository};
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let forge = MockForge::new("mock")
//!     .with_organization(Organization::named("acme"))
//!     .with_repository(Repository::new("1", "acme/api"))
//!     .with_docs("acme/api", true, false);
//!
//! let mut repos = forge.list_repositories(&["acme".to_string()]).await.unwrap();
//! forge.check_documentation(&mut repos[0]).await.unwrap();
//! assert!(repos[0].has_docs);
//! assert_eq!(forge.calls().list_repositories, 1);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{ForgeClient, ForgeError, ForgeType, Organization, Repository};

/// Mock forge for testing.
///
/// Clones share call counters, so a test can keep one handle while the
/// discovery service owns another.
#[derive(Debug, Clone)]
pub struct MockForge {
    name: String,
    forge_type: ForgeType,
    organizations: Vec<Organization>,
    repositories: Vec<Repository>,
    /// Probe results by full name: (has_docs, has_doc_ignore).
    docs: HashMap<String, (bool, bool)>,
    probe_failures: HashSet<String>,
    fail_list_organizations: Option<String>,
    fail_list_repositories: Option<String>,
    probe_delay: Option<Duration>,
    /// Thread-blocking work done inside every probe.
    probe_work: Option<Duration>,
    listing_delay: Option<Duration>,
    counters: Arc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    list_organizations: AtomicUsize,
    list_repositories: AtomicUsize,
    check_documentation: AtomicUsize,
    in_flight_probes: AtomicUsize,
    peak_probes: AtomicUsize,
    in_flight_listings: AtomicUsize,
    peak_listings: AtomicUsize,
    scopes: Mutex<Vec<Vec<String>>>,
}

impl Counters {
    fn enter(in_flight: &AtomicUsize, peak: &AtomicUsize) {
        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
    }
}

/// Snapshot of the calls made against a [`MockForge`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockCalls {
    /// Calls to `list_organizations`.
    pub list_organizations: usize,
    /// Calls to `list_repositories`.
    pub list_repositories: usize,
    /// Calls to `check_documentation`.
    pub check_documentation: usize,
    /// Highest number of probes observed in flight at once.
    pub peak_probes: usize,
    /// Highest number of `list_repositories` calls observed in flight at once.
    pub peak_listings: usize,
    /// Organization lists passed to `list_repositories`, in call order.
    pub scopes: Vec<Vec<String>>,
}

impl MockForge {
    /// Creates an empty local-type mock forge.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            forge_type: ForgeType::Local,
            organizations: Vec::new(),
            repositories: Vec::new(),
            docs: HashMap::new(),
            probe_failures: HashSet::new(),
            fail_list_organizations: None,
            fail_list_repositories: None,
            probe_delay: None,
            probe_work: None,
            listing_delay: None,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Sets the reported forge type.
    pub fn with_type(mut self, forge_type: ForgeType) -> Self {
        self.forge_type = forge_type;
        self
    }

    /// Adds an organization.
    pub fn with_organization(mut self, organization: Organization) -> Self {
        self.organizations.push(organization);
        self
    }

    /// Adds a repository; it is listed under the owner part of its full name.
    pub fn with_repository(mut self, repository: Repository) -> Self {
        self.repositories.push(repository);
        self
    }

    /// Sets what the documentation probe reports for `full_name`.
    pub fn with_docs(mut self, full_name: &str, has_docs: bool, has_doc_ignore: bool) -> Self {
        self.docs
            .insert(full_name.to_string(), (has_docs, has_doc_ignore));
        self
    }

    /// Makes the documentation probe fail for `full_name`.
    pub fn with_probe_failure(mut self, full_name: &str) -> Self {
        self.probe_failures.insert(full_name.to_string());
        self
    }

    /// Makes `list_organizations` fail.
    pub fn failing_list_organizations(mut self, message: impl Into<String>) -> Self {
        self.fail_list_organizations = Some(message.into());
        self
    }

    /// Makes `list_repositories` fail.
    pub fn failing_list_repositories(mut self, message: impl Into<String>) -> Self {
        self.fail_list_repositories = Some(message.into());
        self
    }

    /// Delays every documentation probe.
    pub fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = Some(delay);
        self
    }

    /// Blocks the worker thread for `work` inside every probe.
    pub fn with_blocking_probe(mut self, work: Duration) -> Self {
        self.probe_work = Some(work);
        self
    }

    /// Delays every `list_repositories` call.
    pub fn with_listing_delay(mut self, delay: Duration) -> Self {
        self.listing_delay = Some(delay);
        self
    }

    /// Makes this mock record its calls into `other`'s counters.
    pub fn sharing_calls_with(mut self, other: &MockForge) -> Self {
        self.counters = Arc::clone(&other.counters);
        self
    }

    /// Returns the calls made so far.
    pub fn calls(&self) -> MockCalls {
        let c = &self.counters;
        MockCalls {
            list_organizations: c.list_organizations.load(Ordering::SeqCst),
            list_repositories: c.list_repositories.load(Ordering::SeqCst),
            check_documentation: c.check_documentation.load(Ordering::SeqCst),
            peak_probes: c.peak_probes.load(Ordering::SeqCst),
            peak_listings: c.peak_listings.load(Ordering::SeqCst),
            scopes: c
                .scopes
                .lock()
                .map(|scopes| scopes.clone())
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl ForgeClient for MockForge {
    fn forge_type(&self) -> ForgeType {
        self.forge_type
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>, ForgeError> {
        self.counters
            .list_organizations
            .fetch_add(1, Ordering::SeqCst);
        match &self.fail_list_organizations {
            Some(message) => Err(ForgeError::Network(message.clone())),
            None => Ok(self.organizations.clone()),
        }
    }

    async fn list_repositories(
        &self,
        organizations: &[String],
    ) -> Result<Vec<Repository>, ForgeError> {
        self.counters
            .list_repositories
            .fetch_add(1, Ordering::SeqCst);
        if let Ok(mut scopes) = self.counters.scopes.lock() {
            scopes.push(organizations.to_vec());
        }

        if let Some(delay) = self.listing_delay {
            let counters = &self.counters;
            Counters::enter(&counters.in_flight_listings, &counters.peak_listings);
            tokio::time::sleep(delay).await;
            counters.in_flight_listings.fetch_sub(1, Ordering::SeqCst);
        }

        if let Some(message) = &self.fail_list_repositories {
            return Err(ForgeError::Network(message.clone()));
        }

        Ok(self
            .repositories
            .iter()
            .filter(|repo| organizations.iter().any(|org| org == repo.owner()))
            .cloned()
            .collect())
    }

    async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository, ForgeError> {
        let full_name = format!("{owner}/{name}");
        self.repositories
            .iter()
            .find(|repo| repo.full_name == full_name)
            .cloned()
            .ok_or(ForgeError::NotFound(full_name))
    }

    async fn check_documentation(&self, repository: &mut Repository) -> Result<(), ForgeError> {
        let counters = &self.counters;
        counters.check_documentation.fetch_add(1, Ordering::SeqCst);
        Counters::enter(&counters.in_flight_probes, &counters.peak_probes);

        if let Some(delay) = self.probe_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(work) = self.probe_work {
            std::thread::sleep(work);
        }
        counters.in_flight_probes.fetch_sub(1, Ordering::SeqCst);

        if self.probe_failures.contains(&repository.full_name) {
            return Err(ForgeError::Network(format!(
                "probe failed for {}",
                repository.full_name
            )));
        }

        let (has_docs, has_doc_ignore) = self
            .docs
            .get(&repository.full_name)
            .copied()
            .unwrap_or((false, false));
        repository.has_docs = has_docs;
        repository.has_doc_ignore = has_doc_ignore;
        Ok(())
    }

    fn edit_url(&self, repository: &Repository, file_path: &str, branch: &str) -> String {
        format!(
            "mock://{}/{}/edit/{branch}/{file_path}",
            self.name, repository.full_name
        )
    }
}
