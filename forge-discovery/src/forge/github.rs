//! GitHub forge client.
//!
//! Uses octocrab for transport and authentication, but decodes responses into
//! local structs so only the fields discovery needs are required.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info_span, Instrument};

use super::pagination::{collect_pages, PageRequest, Pagination};
use super::{
    DocProbe, ForgeClient, ForgeError, ForgeType, Organization, Repository, WebhookEvent,
    WebhookEventKind,
};
use crate::config::ForgeConfig;
use crate::rate_limit::ensure_core_rate_limit;

/// Web URL used for edit links when none is configured.
pub const DEFAULT_WEB_URL: &str = "https://github.com";

/// Client for github.com or a GitHub Enterprise instance.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    name: String,
    octocrab: Octocrab,
    web_url: String,
    probe: DocProbe,
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
struct ApiOrganization {
    id: u64,
    login: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiRepository {
    id: u64,
    name: String,
    full_name: String,
    #[serde(default)]
    clone_url: Option<String>,
    #[serde(default)]
    ssh_url: Option<String>,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PushPayload {
    #[serde(rename = "ref", default)]
    git_ref: Option<String>,
    repository: PayloadRepository,
    #[serde(default)]
    commits: Vec<PushCommit>,
}

#[derive(Debug, Deserialize)]
struct PayloadRepository {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryPayload {
    repository: PayloadRepository,
}

#[derive(Debug, Default, Deserialize)]
struct PushCommit {
    #[serde(default)]
    added: Vec<String>,
    #[serde(default)]
    modified: Vec<String>,
    #[serde(default)]
    removed: Vec<String>,
}

#[derive(Serialize)]
struct RefQuery<'a> {
    #[serde(rename = "ref")]
    git_ref: &'a str,
}

impl GitHubClient {
    /// Builds a client from its forge configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ForgeError::Api`] if octocrab rejects the API URL or fails
    /// to build.
    pub fn new(
        config: &ForgeConfig,
        token: Option<String>,
        probe: DocProbe,
    ) -> Result<Self, ForgeError> {
        let mut builder = Octocrab::builder();
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }
        if let Some(api_url) = &config.api_url {
            builder = builder.base_uri(api_url.as_str())?;
        }

        Ok(Self::from_octocrab(
            config.name.clone(),
            builder.build()?,
            config
                .web_url
                .clone()
                .unwrap_or_else(|| DEFAULT_WEB_URL.to_string()),
            probe,
        ))
    }

    /// Wraps an existing octocrab instance.
    pub fn from_octocrab(
        name: impl Into<String>,
        octocrab: Octocrab,
        web_url: impl Into<String>,
        probe: DocProbe,
    ) -> Self {
        Self {
            name: name.into(),
            octocrab,
            web_url: web_url.into().trim_end_matches('/').to_string(),
            probe,
            pagination: Pagination::default(),
        }
    }

    async fn list_org_repositories(&self, org: &str) -> Result<Vec<Repository>, ForgeError> {
        ensure_core_rate_limit(&self.octocrab).await?;

        let route = format!("/orgs/{org}/repos");
        let repos: Vec<ApiRepository> = collect_pages(self.pagination, |page: PageRequest| {
            let route = route.as_str();
            async move { self.octocrab.get(route, Some(&page)).await }
        })
        .await?;

        debug!(org, count = repos.len(), "Listed organization repositories");
        Ok(repos.into_iter().map(convert_repository).collect())
    }

    /// Returns true if `path` exists in the repository on its default branch.
    async fn path_exists(&self, repository: &Repository, path: &str) -> Result<bool, ForgeError> {
        let route = format!(
            "/repos/{}/contents/{}",
            repository.full_name,
            path.trim_matches('/')
        );
        let query = RefQuery {
            git_ref: &repository.default_branch,
        };
        match self
            .octocrab
            .get::<serde_json::Value, _, _>(route, Some(&query))
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn is_not_found(error: &octocrab::Error) -> bool {
    matches!(error, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404)
}

fn convert_repository(api: ApiRepository) -> Repository {
    let clone_url = api
        .clone_url
        .or_else(|| api.html_url.as_ref().map(|url| format!("{url}.git")))
        .unwrap_or_else(|| format!("{DEFAULT_WEB_URL}/{}.git", api.full_name));

    let mut repository = Repository::new(api.id.to_string(), api.full_name);
    repository.name = api.name;
    repository.clone_url = clone_url;
    repository.ssh_url = api.ssh_url;
    repository.default_branch = api.default_branch.unwrap_or_else(|| "main".to_string());
    repository.description = api.description.unwrap_or_default();
    repository.language = api.language;
    repository.topics = api.topics.into_iter().collect::<BTreeSet<_>>();
    repository.private = api.private;
    repository.archived = api.archived;
    if let Some(updated_at) = api.updated_at {
        repository.last_updated = updated_at;
    }
    repository
}

#[async_trait]
impl ForgeClient for GitHubClient {
    fn forge_type(&self) -> ForgeType {
        ForgeType::GitHub
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>, ForgeError> {
        ensure_core_rate_limit(&self.octocrab).await?;

        let orgs: Vec<ApiOrganization> = collect_pages(self.pagination, |page: PageRequest| async move {
            self.octocrab.get("/user/orgs", Some(&page)).await
        })
        .await?;

        Ok(orgs
            .into_iter()
            .map(|org| Organization {
                id: org.id.to_string(),
                url: format!("{}/{}", self.web_url, org.login),
                display_name: org.login.clone(),
                name: org.login,
                description: org.description.unwrap_or_default(),
            })
            .collect())
    }

    async fn list_repositories(
        &self,
        organizations: &[String],
    ) -> Result<Vec<Repository>, ForgeError> {
        let mut repositories = Vec::new();
        for org in organizations {
            let span = info_span!("github_org", forge = %self.name, org = %org);
            repositories.extend(self.list_org_repositories(org).instrument(span).await?);
        }
        Ok(repositories)
    }

    async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository, ForgeError> {
        let route = format!("/repos/{owner}/{name}");
        match self.octocrab.get::<ApiRepository, _, ()>(route, None).await {
            Ok(api) => Ok(convert_repository(api)),
            Err(e) if is_not_found(&e) => Err(ForgeError::NotFound(format!("{owner}/{name}"))),
            Err(e) => Err(e.into()),
        }
    }

    async fn check_documentation(&self, repository: &mut Repository) -> Result<(), ForgeError> {
        let mut has_docs = false;
        for path in &self.probe.doc_paths {
            if self.path_exists(repository, path).await? {
                has_docs = true;
                break;
            }
        }

        let mut has_doc_ignore = false;
        for file in &self.probe.ignore_files {
            if self.path_exists(repository, file).await? {
                has_doc_ignore = true;
                break;
            }
        }

        repository.has_docs = has_docs;
        repository.has_doc_ignore = has_doc_ignore;
        Ok(())
    }

    fn parse_webhook_event(
        &self,
        payload: &[u8],
        event_type: &str,
    ) -> Result<WebhookEvent, ForgeError> {
        match event_type {
            "push" => {
                let push: PushPayload = serde_json::from_slice(payload)?;
                let changed_files = push
                    .commits
                    .into_iter()
                    .flat_map(|c| c.added.into_iter().chain(c.modified).chain(c.removed))
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect();
                Ok(WebhookEvent {
                    kind: WebhookEventKind::Push,
                    repository: push.repository.full_name,
                    branch: push
                        .git_ref
                        .as_deref()
                        .and_then(|r| r.strip_prefix("refs/heads/"))
                        .map(str::to_string),
                    changed_files,
                })
            }
            other => {
                let event: RepositoryPayload = serde_json::from_slice(payload)?;
                let kind = if other == "repository" {
                    WebhookEventKind::Repository
                } else {
                    WebhookEventKind::Other
                };
                Ok(WebhookEvent {
                    kind,
                    repository: event.repository.full_name,
                    branch: None,
                    changed_files: Vec::new(),
                })
            }
        }
    }

    async fn register_webhook(
        &self,
        repository: &Repository,
        webhook_url: &str,
    ) -> Result<(), ForgeError> {
        let route = format!("/repos/{}/hooks", repository.full_name);
        let body = serde_json::json!({
            "name": "web",
            "active": true,
            "events": ["push", "repository"],
            "config": { "url": webhook_url, "content_type": "json" },
        });
        let _: serde_json::Value = self.octocrab.post(route, Some(&body)).await?;
        Ok(())
    }

    fn edit_url(&self, repository: &Repository, file_path: &str, branch: &str) -> String {
        format!(
            "{}/{}/edit/{}/{}",
            self.web_url,
            repository.full_name,
            branch,
            file_path.trim_start_matches('/')
        )
    }
}
