//! Rate limit pacing for the GitHub API.
//!
//! Listing calls check the core rate limit first and sleep until the window
//! resets when almost nothing is left. Failed calls are never retried here.
//! Instances that answer `/rate_limit` with 404 have rate limiting disabled
//! and are not paced.

use octocrab::Octocrab;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Maximum time to wait for rate limit reset (1 hour).
const MAX_WAIT_SECS: u64 = 3600;

/// Minimum remaining requests before proactively waiting.
const MIN_REMAINING_THRESHOLD: u32 = 5;

/// Rate limit information for a specific resource.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,
    /// Unix timestamp when the rate limit resets.
    pub reset: u64,
    /// Total requests allowed per window.
    pub limit: u32,
}

/// Checks the current rate limit status for the core API.
///
/// # Errors
///
/// Returns an error if the rate limit API call fails.
pub async fn check_core_rate_limit(octocrab: &Octocrab) -> Result<RateLimitInfo, octocrab::Error> {
    let rate_limit = octocrab.ratelimit().get().await?;
    let core = &rate_limit.resources.core;

    Ok(RateLimitInfo {
        remaining: core.remaining as u32,
        reset: core.reset,
        limit: core.limit as u32,
    })
}

/// Returns how long to wait before the next call, if at all.
fn wait_duration(info: &RateLimitInfo, now: u64) -> Option<u64> {
    if info.remaining >= MIN_REMAINING_THRESHOLD || info.reset <= now {
        return None;
    }
    Some(info.reset - now)
}

/// Waits if the rate limit is low, returning true if we waited.
pub async fn wait_if_needed(info: &RateLimitInfo) -> bool {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let Some(wait_secs) = wait_duration(info, now) else {
        return false;
    };

    if wait_secs > MAX_WAIT_SECS {
        warn!(
            wait_secs,
            max_wait = MAX_WAIT_SECS,
            "Rate limit reset too far in future, capping wait time"
        );
    }

    let actual_wait = wait_secs.min(MAX_WAIT_SECS);
    info!(
        remaining = info.remaining,
        limit = info.limit,
        wait_secs = actual_wait,
        "Rate limit low, waiting for reset"
    );

    tokio::time::sleep(Duration::from_secs(actual_wait)).await;
    true
}

/// Ensures sufficient rate limit before making core API calls.
///
/// # Errors
///
/// Returns an error if the rate limit check fails for any reason other than
/// rate limiting being disabled on the instance.
pub async fn ensure_core_rate_limit(octocrab: &Octocrab) -> Result<(), octocrab::Error> {
    let info = match check_core_rate_limit(octocrab).await {
        Ok(info) => info,
        Err(e) if rate_limiting_disabled(&e) => {
            debug!("Rate limiting is disabled on this instance, not pacing");
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    wait_if_needed(&info).await;
    Ok(())
}

fn rate_limiting_disabled(error: &octocrab::Error) -> bool {
    matches!(error, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(remaining: u32, reset: u64) -> RateLimitInfo {
        RateLimitInfo {
            remaining,
            reset,
            limit: 5000,
        }
    }

    #[test]
    fn no_wait_with_capacity() {
        assert_eq!(wait_duration(&info(100, 2_000), 1_000), None);
    }

    #[test]
    fn no_wait_after_reset() {
        assert_eq!(wait_duration(&info(1, 900), 1_000), None);
    }

    #[test]
    fn waits_until_reset_when_low() {
        assert_eq!(wait_duration(&info(4, 1_030), 1_000), Some(30));
    }

    #[tokio::test]
    async fn test_wait_if_needed_reset_passed() {
        let waited = wait_if_needed(&info(1, 0)).await;
        assert!(!waited);
    }
}
