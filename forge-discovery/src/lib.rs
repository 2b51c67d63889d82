#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod concurrency;
pub mod config;
pub mod discovery;
pub mod filter;
pub mod forge;
pub mod rate_limit;
pub mod registry;
pub mod summary;

pub use concurrency::run_bounded;
pub use config::{ConfigError, DiscoveryConfig, DiscoveryLimits, FilteringConfig, ForgeConfig};
pub use discovery::{
    BuildRepository, DiscoveryError, DiscoveryResult, DiscoveryService, FilteredRepository,
    ForgeDiscovery, ForgeStats,
};
pub use filter::{decide, matches_pattern, FilterDecision, FilterReason};
pub use forge::{
    create_client, DocProbe, ForgeClient, ForgeError, ForgeType, Organization, Repository,
    WebhookEvent, WebhookEventKind,
};
pub use rate_limit::{check_core_rate_limit, ensure_core_rate_limit, wait_if_needed, RateLimitInfo};
pub use registry::{ForgeManager, RegisteredForge};
pub use summary::{ForgeOutcome, RunSummary};
