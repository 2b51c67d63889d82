//! Run summary types.

use super::result::ForgeOutcome;
use crate::discovery::DiscoveryResult;
use crate::filter::FilterReason;
use std::collections::BTreeMap;
use std::fmt;

/// Summary of a complete discovery run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of forges that ran to completion or failed.
    pub forges_attempted: usize,

    /// Number of forges that failed.
    pub forges_failed: usize,

    /// Number of repositories that passed the filter.
    pub repositories_included: usize,

    /// Number of repositories the filter excluded.
    pub repositories_filtered: usize,

    /// Excluded repositories per filter rule.
    pub filtered_by_reason: BTreeMap<FilterReason, usize>,

    /// Outcome per forge, sorted by forge name.
    pub outcomes: Vec<ForgeOutcome>,
}

impl RunSummary {
    /// Summarizes a discovery result.
    #[must_use]
    pub fn from_result(result: &DiscoveryResult) -> Self {
        let mut summary = Self {
            repositories_included: result.repositories.len(),
            repositories_filtered: result.filtered.len(),
            ..Default::default()
        };

        for filtered in &result.filtered {
            *summary
                .filtered_by_reason
                .entry(filtered.filter_reason)
                .or_default() += 1;
        }

        for outcome in ForgeOutcome::from_result(result) {
            summary.record_outcome(outcome);
        }
        summary
    }

    /// Updates the summary with a forge outcome.
    pub fn record_outcome(&mut self, outcome: ForgeOutcome) {
        self.forges_attempted += 1;
        if matches!(outcome, ForgeOutcome::Failed { .. }) {
            self.forges_failed += 1;
        }
        self.outcomes.push(outcome);
    }

    /// Returns true if any forge failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.forges_failed > 0
    }

    /// Returns true if every attempted forge succeeded.
    #[must_use]
    pub fn all_success(&self) -> bool {
        self.forges_failed == 0
    }

    /// Number of repositories excluded by `reason`.
    #[must_use]
    pub fn filtered_count(&self, reason: FilterReason) -> usize {
        self.filtered_by_reason.get(&reason).copied().unwrap_or(0)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Forges: {} attempted, {} failed",
            self.forges_attempted, self.forges_failed
        )?;
        writeln!(
            f,
            "Repositories: {} included, {} filtered",
            self.repositories_included, self.repositories_filtered
        )?;
        for reason in FilterReason::ALL {
            let count = self.filtered_count(reason);
            if count > 0 {
                writeln!(f, "  {reason}: {count}")?;
            }
        }
        for outcome in &self.outcomes {
            match outcome {
                ForgeOutcome::Succeeded {
                    forge,
                    included,
                    filtered,
                } => writeln!(f, "  [ok] {forge}: {included} included, {filtered} filtered")?,
                ForgeOutcome::Failed { forge, error } => {
                    writeln!(f, "  [failed] {forge}: {error}")?
                }
            }
        }
        Ok(())
    }
}
