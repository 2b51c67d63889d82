//! Filter decision types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a repository was included or excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterReason {
    /// The repository is archived.
    Archived,
    /// The repository carries an opt-out marker file.
    DocignorePresent,
    /// Required documentation paths are missing.
    MissingRequiredPaths,
    /// No include pattern matched.
    IncludePatternsMiss,
    /// An exclude pattern matched.
    ExcludePatternsMatch,
    /// The repository passed every rule.
    Included,
}

impl FilterReason {
    /// Every reason, in evaluation order.
    pub const ALL: [FilterReason; 6] = [
        FilterReason::Archived,
        FilterReason::DocignorePresent,
        FilterReason::MissingRequiredPaths,
        FilterReason::IncludePatternsMiss,
        FilterReason::ExcludePatternsMatch,
        FilterReason::Included,
    ];

    /// Returns the stable machine-readable code.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterReason::Archived => "archived",
            FilterReason::DocignorePresent => "docignore_present",
            FilterReason::MissingRequiredPaths => "missing_required_paths",
            FilterReason::IncludePatternsMiss => "include_patterns_miss",
            FilterReason::ExcludePatternsMatch => "exclude_patterns_match",
            FilterReason::Included => "included",
        }
    }
}

impl fmt::Display for FilterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of running the filter engine over one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterDecision {
    /// Whether the repository is published.
    pub include: bool,

    /// The rule that decided.
    pub reason: FilterReason,

    /// Extra context, e.g. the exclude pattern that matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl FilterDecision {
    /// An inclusion decision.
    pub fn included() -> Self {
        Self {
            include: true,
            reason: FilterReason::Included,
            detail: None,
        }
    }

    /// An exclusion decision.
    pub fn excluded(reason: FilterReason) -> Self {
        Self {
            include: false,
            reason,
            detail: None,
        }
    }

    /// Attaches a detail string.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
