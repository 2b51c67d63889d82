//! Page-number pagination shared by forge clients.
//!
//! GitHub, GitLab and Forgejo all expose `?page=N&per_page=M` listings. This
//! module walks such a listing until the forge returns a short page.

use serde::Serialize;
use std::future::Future;
use tracing::{debug, warn};

/// Results per page requested from forges.
pub const DEFAULT_PER_PAGE: u8 = 100;

/// Upper bound on pages fetched from a single listing.
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// Query parameters for one page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u8,
}

/// Limits applied while walking a listing.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    /// Items requested per page.
    pub per_page: u8,
    /// Stop after this many pages even if more are available.
    pub max_pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Fetches every page of a listing and concatenates the items in order.
///
/// `fetch` is called with page 1, 2, ... until it returns fewer than
/// `per_page` items or `max_pages` is reached. The first error aborts the
/// walk and is returned.
///
/// # Errors
///
/// Returns whatever error `fetch` produced.
pub async fn collect_pages<T, E, F, Fut>(pagination: Pagination, mut fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let per_page = pagination.per_page.max(1);
    let mut items = Vec::new();

    for page in 1..=pagination.max_pages {
        let batch = fetch(PageRequest { page, per_page }).await?;
        let count = batch.len();
        items.extend(batch);
        debug!(page, count, total = items.len(), "Fetched page");

        if count < usize::from(per_page) {
            return Ok(items);
        }
    }

    warn!(
        max_pages = pagination.max_pages,
        total = items.len(),
        "Reached maximum page limit, listing may be incomplete"
    );
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn pagination(per_page: u8, max_pages: u32) -> Pagination {
        Pagination {
            per_page,
            max_pages,
        }
    }

    #[tokio::test]
    async fn stops_at_short_page() {
        let calls = AtomicU32::new(0);
        let items: Vec<u32> = collect_pages(pagination(2, 10), |req| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok::<_, String>(match req.page {
                    1 => vec![1, 2],
                    2 => vec![3, 4],
                    3 => vec![5],
                    _ => vec![],
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn full_last_page_needs_one_empty_page() {
        let calls = AtomicU32::new(0);
        let items: Vec<u32> = collect_pages(pagination(2, 10), |req| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, String>(if req.page == 1 { vec![1, 2] } else { vec![] }) }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn respects_page_cap() {
        let items: Vec<u32> = collect_pages(pagination(1, 3), |req| async move {
            Ok::<_, String>(vec![req.page])
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn propagates_first_error() {
        let result: Result<Vec<u32>, String> = collect_pages(pagination(1, 5), |req| async move {
            if req.page == 2 {
                Err(format!("page {} failed", req.page))
            } else {
                Ok(vec![req.page])
            }
        })
        .await;

        assert_eq!(result, Err("page 2 failed".to_string()));
    }
}
