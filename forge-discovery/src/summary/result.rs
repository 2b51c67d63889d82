//! Per-forge outcome types.

use crate::discovery::DiscoveryResult;

/// Outcome of discovering a single forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForgeOutcome {
    /// Discovery completed.
    Succeeded {
        /// Forge name.
        forge: String,
        /// Repositories that passed the filter.
        included: usize,
        /// Repositories the filter excluded.
        filtered: usize,
    },

    /// Discovery failed.
    Failed {
        /// Forge name.
        forge: String,
        /// Error message.
        error: String,
    },
}

impl ForgeOutcome {
    /// Splits a discovery result into one outcome per forge that ran, sorted by name.
    pub fn from_result(result: &DiscoveryResult) -> Vec<Self> {
        let mut outcomes: Vec<Self> = result
            .forge_stats
            .iter()
            .map(|(forge, stats)| ForgeOutcome::Succeeded {
                forge: forge.clone(),
                included: stats.included,
                filtered: stats.filtered,
            })
            .chain(result.errors.iter().map(|(forge, error)| ForgeOutcome::Failed {
                forge: forge.clone(),
                error: error.to_string(),
            }))
            .collect();
        outcomes.sort_by(|a, b| a.forge().cmp(b.forge()));
        outcomes
    }

    /// Name of the forge.
    pub fn forge(&self) -> &str {
        match self {
            ForgeOutcome::Succeeded { forge, .. } | ForgeOutcome::Failed { forge, .. } => forge,
        }
    }
}
