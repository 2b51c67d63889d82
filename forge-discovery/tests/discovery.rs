use std::fs;
use std::sync::Arc;
use std::time::Duration;

use forge_discovery::forge::local::LocalForge;
use forge_discovery::forge::mock::MockForge;
use forge_discovery::{
    DiscoveryError, DiscoveryLimits, DiscoveryService, DocProbe, FilterReason, FilteringConfig,
    ForgeConfig, ForgeManager, ForgeType, Organization, Repository, RunSummary,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn reason_of(result: &forge_discovery::DiscoveryResult, full_name: &str) -> FilterReason {
    result
        .filtered
        .iter()
        .find(|f| f.repository.full_name == full_name)
        .map(|f| f.filter_reason)
        .unwrap_or(FilterReason::Included)
}

/// root/acme/{api, web, old-archive, blank}, root/labs/tool
fn workspace() -> TempDir {
    let root = TempDir::new().unwrap();
    let acme = root.path().join("acme");

    fs::create_dir_all(acme.join("api/docs")).unwrap();
    fs::create_dir_all(acme.join("api/.git")).unwrap();
    fs::write(acme.join("api/.git/HEAD"), "ref: refs/heads/trunk\n").unwrap();

    fs::create_dir_all(acme.join("web/docs")).unwrap();
    fs::write(acme.join("web/.docignore"), "").unwrap();

    fs::create_dir_all(acme.join("old-archive/docs")).unwrap();
    fs::create_dir_all(acme.join("blank/src")).unwrap();

    fs::create_dir_all(root.path().join("labs/tool/docs")).unwrap();
    root
}

#[tokio::test]
async fn local_forge_end_to_end() {
    let root = workspace();
    let filtering = FilteringConfig {
        required_paths: vec!["docs".to_string()],
        exclude_patterns: vec!["*-archive".to_string()],
        ..Default::default()
    };
    let config = ForgeConfig::new("workspace", ForgeType::Local).with_root(root.path());
    let client = LocalForge::new("workspace", root.path(), DocProbe::from_filtering(&filtering));

    let mut manager = ForgeManager::new();
    manager.add_forge(config, Arc::new(client));
    let service = DiscoveryService::new(manager, filtering.clone());

    let result = service
        .discover_all(&CancellationToken::new())
        .await
        .unwrap();

    assert!(!result.has_errors());
    let mut included: Vec<_> = result
        .repositories
        .iter()
        .map(|r| r.full_name.as_str())
        .collect();
    included.sort_unstable();
    assert_eq!(included, vec!["acme/api", "labs/tool"]);

    assert_eq!(reason_of(&result, "acme/web"), FilterReason::DocignorePresent);
    assert_eq!(
        reason_of(&result, "acme/old-archive"),
        FilterReason::ExcludePatternsMatch
    );
    assert_eq!(
        reason_of(&result, "acme/blank"),
        FilterReason::MissingRequiredPaths
    );
    assert_eq!(result.organizations["workspace"].len(), 2);

    let api = result
        .repositories
        .iter()
        .find(|r| r.full_name == "acme/api")
        .unwrap();
    assert_eq!(api.default_branch, "trunk");
    assert_eq!(api.forge_name(), Some("workspace"));

    let builds = result.build_repositories(&filtering);
    assert_eq!(builds.len(), 2);
    assert!(builds.iter().all(|b| b.paths == vec!["docs"]));

    let summary = RunSummary::from_result(&result);
    assert!(summary.all_success());
    assert_eq!(summary.repositories_filtered, 3);
}

#[tokio::test]
async fn one_failing_forge_does_not_hide_the_others() {
    let root = workspace();
    let probe = DocProbe::default();

    let mut manager = ForgeManager::new();
    manager.add_forge(
        ForgeConfig::new("broken", ForgeType::GitHub).with_organizations(["acme"]),
        Arc::new(MockForge::new("broken").failing_list_repositories("503 service unavailable")),
    );
    manager.add_forge(
        ForgeConfig::new("missing-org", ForgeType::Local)
            .with_root(root.path())
            .with_organizations(["nobody"]),
        Arc::new(LocalForge::new("missing-org", root.path(), probe.clone())),
    );
    manager.add_forge(
        ForgeConfig::new("workspace", ForgeType::Local)
            .with_root(root.path())
            .with_organizations(["labs"]),
        Arc::new(LocalForge::new("workspace", root.path(), probe)),
    );
    let service = DiscoveryService::new(manager, FilteringConfig::default());

    let result = service
        .discover_all(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.errors.len(), 2);
    assert!(matches!(
        result.errors.get("broken"),
        Some(DiscoveryError::ListRepositories { .. })
    ));
    assert!(matches!(
        result.errors.get("missing-org"),
        Some(DiscoveryError::ListRepositories { .. })
    ));
    assert_eq!(result.repositories.len(), 1);
    assert_eq!(result.repositories[0].full_name, "labs/tool");

    let summary = RunSummary::from_result(&result);
    assert_eq!(summary.forges_attempted, 3);
    assert_eq!(summary.forges_failed, 2);
    assert!(summary.has_failures());
}

#[tokio::test]
async fn every_repository_lands_in_exactly_one_bucket() {
    let mut mock = MockForge::new("gh").with_type(ForgeType::GitHub);
    for i in 0..30 {
        let full_name = format!("acme/repo-{i}");
        mock = mock
            .with_repository(Repository::new(i.to_string(), full_name.as_str()))
            .with_docs(&full_name, i % 3 != 0, i % 5 == 0);
    }
    let mut manager = ForgeManager::new();
    manager.add_forge(
        ForgeConfig::new("gh", ForgeType::GitHub).with_organizations(["acme"]),
        Arc::new(mock),
    );
    let service = DiscoveryService::new(manager, FilteringConfig::default()).with_limits(
        DiscoveryLimits {
            forge_concurrency: 1,
            probe_concurrency: 4,
        },
    );

    let result = service
        .discover_all(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.repositories.len() + result.filtered.len(), 30);
    for repo in &result.repositories {
        assert!(!repo.has_doc_ignore);
    }
    for filtered in &result.filtered {
        assert_ne!(filtered.filter_reason, FilterReason::Included);
        assert!(!result
            .repositories
            .iter()
            .any(|r| r.full_name == filtered.repository.full_name));
    }
}

#[tokio::test]
async fn auto_discovery_with_no_organizations_is_empty() {
    let mock = MockForge::new("gh").with_repository(Repository::new("1", "acme/api"));
    let handle = mock.clone();
    let mut manager = ForgeManager::new();
    manager.add_forge(ForgeConfig::new("gh", ForgeType::GitHub), Arc::new(mock));
    let service = DiscoveryService::new(manager, FilteringConfig::default());

    let result = service
        .discover_all(&CancellationToken::new())
        .await
        .unwrap();

    assert!(!result.has_errors());
    assert!(result.repositories.is_empty());
    assert!(result.organizations["gh"].is_empty());
    assert_eq!(handle.calls().list_organizations, 1);
    assert_eq!(handle.calls().list_repositories, 0);
}

#[tokio::test]
async fn many_forges_run_under_the_forge_ceiling() {
    let mut manager = ForgeManager::new();
    let mut handles: Vec<MockForge> = Vec::new();
    for i in 0..10 {
        let name = format!("forge-{i}");
        let mut mock = MockForge::new(name.as_str())
            .with_organization(Organization::named("acme"))
            .with_repository(Repository::new("1", "acme/api"))
            .with_docs("acme/api", true, false)
            .with_listing_delay(Duration::from_millis(30));
        if let Some(first) = handles.first() {
            mock = mock.sharing_calls_with(first);
        }
        handles.push(mock.clone());
        manager.add_forge(ForgeConfig::new(name, ForgeType::Local), Arc::new(mock));
    }
    let service = DiscoveryService::new(manager, FilteringConfig::default()).with_limits(
        DiscoveryLimits {
            forge_concurrency: 3,
            probe_concurrency: 2,
        },
    );

    let result = service
        .discover_all(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.repositories.len(), 10);
    assert_eq!(result.organizations.len(), 10);
    assert_eq!(result.forge_stats.len(), 10);

    let calls = handles[0].calls();
    assert_eq!(calls.list_organizations, 10);
    assert_eq!(calls.list_repositories, 10);
    assert!(calls.peak_listings <= 3, "peak {} above ceiling", calls.peak_listings);
    assert!(calls.peak_listings > 1, "forges never overlapped");
}

#[tokio::test]
async fn cancellation_stops_new_probes() {
    let mut mock = MockForge::new("gh").with_probe_delay(Duration::from_millis(50));
    for i in 0..40 {
        mock = mock.with_repository(Repository::new(i.to_string(), format!("acme/repo-{i}")));
    }
    let handle = mock.clone();
    let mut manager = ForgeManager::new();
    manager.add_forge(
        ForgeConfig::new("gh", ForgeType::GitHub).with_organizations(["acme"]),
        Arc::new(mock),
    );
    let service = DiscoveryService::new(manager, FilteringConfig::default()).with_limits(
        DiscoveryLimits {
            forge_concurrency: 1,
            probe_concurrency: 2,
        },
    );

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(120)).await;
        trigger.cancel();
    });

    let result = service.discover_all(&cancel).await.unwrap();

    assert!(!result.has_errors());
    assert!(result.repositories.len() + result.filtered.len() < 40);
    assert!(handle.calls().check_documentation < 40);
}
