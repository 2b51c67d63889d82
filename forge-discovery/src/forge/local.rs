//! Local filesystem forge.
//!
//! Treats a directory tree as a forge:
//!
//! ```text
//! root/
//! ├── acme/            <- organization
//! │   ├── api-docs/    <- repository "acme/api-docs"
//! │   └── tool/
//! └── platform/
//!     └── infra/
//! ```
//!
//! Hidden directories are skipped at both levels.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

use super::{DocProbe, ForgeClient, ForgeError, ForgeType, Organization, Repository};

/// Forge backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct LocalForge {
    name: String,
    root: PathBuf,
    probe: DocProbe,
}

impl LocalForge {
    /// Creates a local forge rooted at `root`.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>, probe: DocProbe) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            probe,
        }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn build_repository(&self, owner: &str, name: &str) -> Result<Repository, ForgeError> {
        let path = self.root.join(owner).join(name);
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| ForgeError::io(&path, e))?;
        if !metadata.is_dir() {
            return Err(ForgeError::NotFound(format!("{owner}/{name}")));
        }

        let full_name = format!("{owner}/{name}");
        let mut repository = Repository::new(full_name.clone(), full_name);
        repository.clone_url = directory_url(&path);
        repository.default_branch = read_head_branch(&path)
            .await
            .unwrap_or_else(|| "main".to_string());
        if let Ok(modified) = metadata.modified() {
            repository.last_updated = DateTime::<Utc>::from(modified);
        }
        repository
            .metadata
            .insert("path".to_string(), path.display().to_string());
        Ok(repository)
    }
}

#[async_trait]
impl ForgeClient for LocalForge {
    fn forge_type(&self) -> ForgeType {
        ForgeType::Local
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>, ForgeError> {
        let mut organizations = Vec::new();
        for name in list_visible_dirs(&self.root).await? {
            let mut organization = Organization::named(name.clone());
            organization.url = directory_url(&self.root.join(&name));
            organizations.push(organization);
        }
        debug!(forge = %self.name, count = organizations.len(), "Listed local organizations");
        Ok(organizations)
    }

    async fn list_repositories(
        &self,
        organizations: &[String],
    ) -> Result<Vec<Repository>, ForgeError> {
        let mut repositories = Vec::new();
        for owner in organizations {
            let org_path = self.root.join(owner);
            if !tokio::fs::try_exists(&org_path).await.unwrap_or(false) {
                return Err(ForgeError::NotFound(format!(
                    "organization '{owner}' under {}",
                    self.root.display()
                )));
            }
            for name in list_visible_dirs(&org_path).await? {
                repositories.push(self.build_repository(owner, &name).await?);
            }
        }
        Ok(repositories)
    }

    async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository, ForgeError> {
        let path = self.root.join(owner).join(name);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(ForgeError::NotFound(format!("{owner}/{name}")));
        }
        self.build_repository(owner, name).await
    }

    async fn check_documentation(&self, repository: &mut Repository) -> Result<(), ForgeError> {
        let path = self.root.join(&repository.full_name);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(ForgeError::NotFound(repository.full_name.clone()));
        }

        repository.has_docs = any_exists(&path, &self.probe.doc_paths).await;
        repository.has_doc_ignore = any_exists(&path, &self.probe.ignore_files).await;
        Ok(())
    }

    fn edit_url(&self, repository: &Repository, file_path: &str, _branch: &str) -> String {
        directory_url(&self.root.join(&repository.full_name).join(file_path))
    }
}

/// Lists non-hidden subdirectories of `path`, sorted by name.
async fn list_visible_dirs(path: &Path) -> Result<Vec<String>, ForgeError> {
    let mut entries = tokio::fs::read_dir(path)
        .await
        .map_err(|e| ForgeError::io(path, e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ForgeError::io(path, e))?
    {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        let is_dir = entry
            .file_type()
            .await
            .map(|t| t.is_dir())
            .unwrap_or(false);
        if is_dir {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

async fn any_exists(base: &Path, relative: &[String]) -> bool {
    for candidate in relative {
        if tokio::fs::try_exists(base.join(candidate))
            .await
            .unwrap_or(false)
        {
            return true;
        }
    }
    false
}

/// Reads the branch name out of `.git/HEAD`, if the directory is a git checkout.
async fn read_head_branch(path: &Path) -> Option<String> {
    let head = tokio::fs::read_to_string(path.join(".git").join("HEAD"))
        .await
        .ok()?;
    head.trim()
        .strip_prefix("ref: refs/heads/")
        .map(str::to_string)
}

fn directory_url(path: &Path) -> String {
    Url::from_file_path(path)
        .map(|url| url.to_string())
        .unwrap_or_else(|()| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn layout() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("acme/api-docs/docs")).unwrap();
        fs::create_dir_all(root.join("acme/legacy/docs")).unwrap();
        fs::write(root.join("acme/legacy/.docignore"), "").unwrap();
        fs::create_dir_all(root.join("acme/tool/src")).unwrap();
        fs::create_dir_all(root.join("acme/.cache")).unwrap();
        fs::create_dir_all(root.join("platform/infra/.git")).unwrap();
        fs::write(
            root.join("platform/infra/.git/HEAD"),
            "ref: refs/heads/trunk\n",
        )
        .unwrap();
        fs::create_dir_all(root.join(".hidden-org/repo")).unwrap();
        fs::write(root.join("README.md"), "not an org").unwrap();
        temp
    }

    #[tokio::test]
    async fn lists_visible_organizations() {
        let temp = layout();
        let forge = LocalForge::new("ws", temp.path(), DocProbe::default());

        let orgs = forge.list_organizations().await.unwrap();
        let names: Vec<_> = orgs.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["acme", "platform"]);
    }

    #[tokio::test]
    async fn lists_repositories_per_organization() {
        let temp = layout();
        let forge = LocalForge::new("ws", temp.path(), DocProbe::default());

        let repos = forge
            .list_repositories(&["acme".to_string(), "platform".to_string()])
            .await
            .unwrap();
        let names: Vec<_> = repos.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["acme/api-docs", "acme/legacy", "acme/tool", "platform/infra"]
        );
        assert_eq!(repos[3].default_branch, "trunk");
        assert_eq!(repos[0].default_branch, "main");
        assert!(repos[0].clone_url.starts_with("file://"));
    }

    #[tokio::test]
    async fn unknown_organization_is_not_found() {
        let temp = layout();
        let forge = LocalForge::new("ws", temp.path(), DocProbe::default());

        let result = forge.list_repositories(&["ghost".to_string()]).await;
        assert!(matches!(result, Err(ForgeError::NotFound(_))));
    }

    #[tokio::test]
    async fn probes_docs_and_docignore() {
        let temp = layout();
        let forge = LocalForge::new("ws", temp.path(), DocProbe::default());

        let mut api = forge.get_repository("acme", "api-docs").await.unwrap();
        let mut legacy = forge.get_repository("acme", "legacy").await.unwrap();
        let mut tool = forge.get_repository("acme", "tool").await.unwrap();

        forge.check_documentation(&mut api).await.unwrap();
        forge.check_documentation(&mut legacy).await.unwrap();
        forge.check_documentation(&mut tool).await.unwrap();

        assert!(api.has_docs && !api.has_doc_ignore);
        assert!(legacy.has_docs && legacy.has_doc_ignore);
        assert!(!tool.has_docs && !tool.has_doc_ignore);
    }

    #[tokio::test]
    async fn get_missing_repository() {
        let temp = layout();
        let forge = LocalForge::new("ws", temp.path(), DocProbe::default());

        let result = forge.get_repository("acme", "nope").await;
        assert!(matches!(result, Err(ForgeError::NotFound(_))));
    }

    #[test]
    fn edit_url_points_into_checkout() {
        let temp = layout();
        let forge = LocalForge::new("ws", temp.path(), DocProbe::default());
        let repo = Repository::new("acme/api-docs", "acme/api-docs");

        let url = forge.edit_url(&repo, "docs/index.md", "main");
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("acme/api-docs/docs/index.md"));
    }
}
