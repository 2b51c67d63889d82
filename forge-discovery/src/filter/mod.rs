//! Repository filter engine.
//!
//! [`decide`] is a pure function of the repository and the policy. Rules are
//! evaluated in a fixed order and the first one that applies wins:
//!
//! 1. archived
//! 2. opt-out marker present
//! 3. required paths configured but no docs found
//! 4. include patterns configured and none match
//! 5. an exclude pattern matches
//! 6. otherwise included

mod decision;
mod pattern;

pub use decision::{FilterDecision, FilterReason};
pub use pattern::{first_match, matches_pattern};

use crate::config::FilteringConfig;
use crate::forge::Repository;

/// Decides whether a repository is published under `policy`.
pub fn decide(repository: &Repository, policy: &FilteringConfig) -> FilterDecision {
    if repository.archived {
        return FilterDecision::excluded(FilterReason::Archived);
    }

    if repository.has_doc_ignore {
        return FilterDecision::excluded(FilterReason::DocignorePresent);
    }

    if !policy.required_paths.is_empty() && !repository.has_docs {
        return FilterDecision::excluded(FilterReason::MissingRequiredPaths);
    }

    let names = [repository.name.as_str(), repository.full_name.as_str()];

    if !policy.include_patterns.is_empty() && first_match(&names, &policy.include_patterns).is_none()
    {
        return FilterDecision::excluded(FilterReason::IncludePatternsMiss);
    }

    if let Some(pattern) = first_match(&names, &policy.exclude_patterns) {
        return FilterDecision::excluded(FilterReason::ExcludePatternsMatch).with_detail(pattern);
    }

    FilterDecision::included()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(full_name: &str) -> Repository {
        let mut repo = Repository::new(full_name, full_name);
        repo.has_docs = true;
        repo
    }

    fn policy() -> FilteringConfig {
        FilteringConfig {
            required_paths: vec!["docs".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn includes_documented_repository() {
        let decision = decide(&repo("acme/api-docs"), &policy());
        assert_eq!(decision, FilterDecision::included());
    }

    #[test]
    fn archived_wins_over_everything() {
        let mut r = repo("acme/old");
        r.archived = true;
        r.has_doc_ignore = true;
        r.has_docs = false;

        let decision = decide(&r, &policy());
        assert!(!decision.include);
        assert_eq!(decision.reason, FilterReason::Archived);
    }

    #[test]
    fn docignore_before_missing_paths() {
        let mut r = repo("acme/legacy");
        r.has_doc_ignore = true;
        r.has_docs = false;

        assert_eq!(decide(&r, &policy()).reason, FilterReason::DocignorePresent);
    }

    #[test]
    fn missing_docs_only_matters_with_required_paths() {
        let mut r = repo("acme/tool");
        r.has_docs = false;

        assert_eq!(
            decide(&r, &policy()).reason,
            FilterReason::MissingRequiredPaths
        );
        assert!(decide(&r, &FilteringConfig::default()).include);
    }

    #[test]
    fn include_patterns_match_name_or_full_name() {
        let policy = FilteringConfig {
            include_patterns: vec!["acme/*".to_string(), "*-docs".to_string()],
            ..Default::default()
        };

        assert!(decide(&repo("acme/tool"), &policy).include);
        assert!(decide(&repo("other/api-docs"), &policy).include);
        assert_eq!(
            decide(&repo("other/tool"), &policy).reason,
            FilterReason::IncludePatternsMiss
        );
    }

    #[test]
    fn exclude_pattern_reports_detail() {
        let policy = FilteringConfig {
            exclude_patterns: vec!["*-archive".to_string(), "*sandbox*".to_string()],
            ..Default::default()
        };

        let decision = decide(&repo("acme/my-sandbox-app"), &policy);
        assert!(!decision.include);
        assert_eq!(decision.reason, FilterReason::ExcludePatternsMatch);
        assert_eq!(decision.detail.as_deref(), Some("*sandbox*"));
    }

    #[test]
    fn include_miss_before_exclude_match() {
        let policy = FilteringConfig {
            include_patterns: vec!["web*".to_string()],
            exclude_patterns: vec!["*".to_string()],
            ..Default::default()
        };

        assert_eq!(
            decide(&repo("acme/api"), &policy).reason,
            FilterReason::IncludePatternsMiss
        );
        assert_eq!(
            decide(&repo("acme/web"), &policy).reason,
            FilterReason::ExcludePatternsMatch
        );
    }

    #[test]
    fn decision_is_idempotent() {
        let policy = FilteringConfig {
            required_paths: vec!["docs".to_string()],
            include_patterns: vec!["*api*".to_string()],
            exclude_patterns: vec!["*-old".to_string()],
            ignore_files: vec![".docignore".to_string()],
        };
        let r = repo("test-org/api-docs");

        assert_eq!(decide(&r, &policy), decide(&r, &policy));
    }
}
