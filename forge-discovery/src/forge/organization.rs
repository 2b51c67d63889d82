//! Forge-level namespaces.

use serde::{Deserialize, Serialize};

/// An organization, group or user namespace on a forge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Forge-scoped identifier.
    pub id: String,

    /// Identifier accepted by the client's repository listing.
    ///
    /// Some forges expect a numeric id here rather than a slug; the discovery
    /// service passes it back to the client unchanged.
    pub name: String,

    /// Human-readable name.
    #[serde(default)]
    pub display_name: String,

    /// Organization description.
    #[serde(default)]
    pub description: String,

    /// Web URL of the organization.
    #[serde(default)]
    pub url: String,
}

impl Organization {
    /// Creates an organization whose id, name and display name are all `name`.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            display_name: name.clone(),
            name,
            description: String::new(),
            url: String::new(),
        }
    }
}
