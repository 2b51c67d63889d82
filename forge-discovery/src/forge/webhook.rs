//! Webhook events reported by forges.

use serde::Serialize;

/// Kind of webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventKind {
    /// Commits were pushed.
    Push,
    /// A repository was created, renamed, archived or deleted.
    Repository,
    /// Anything the discovery engine does not react to.
    Other,
}

/// A parsed webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookEvent {
    /// Kind of event.
    pub kind: WebhookEventKind,

    /// Full name of the affected repository.
    pub repository: String,

    /// Branch the event refers to, for push events.
    pub branch: Option<String>,

    /// Files added, modified or removed by the event.
    pub changed_files: Vec<String>,
}

impl WebhookEvent {
    /// Returns true if any changed file lives under one of `paths`.
    pub fn touches_any(&self, paths: &[String]) -> bool {
        self.changed_files.iter().any(|file| {
            paths.iter().any(|path| {
                let path = path.trim_end_matches('/');
                file == path || file.starts_with(&format!("{path}/"))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touches_any_matches_directory_prefix() {
        let event = WebhookEvent {
            kind: WebhookEventKind::Push,
            repository: "acme/api".to_string(),
            branch: Some("main".to_string()),
            changed_files: vec!["docs/index.md".to_string(), "src/lib.rs".to_string()],
        };

        assert!(event.touches_any(&["docs".to_string()]));
        assert!(event.touches_any(&["docs/".to_string()]));
        assert!(!event.touches_any(&["doc".to_string()]));
    }
}
