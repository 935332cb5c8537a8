use serde::Serialize;
use tracing::debug;

use crate::model::permission::{Identity, PermissionPath};

/// Result of a permission check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Deny,
}

/// Decide whether `identity` may perform `path` (`category.action`).
///
/// Denies when there is no identity, when the path is malformed, or when
/// either segment is missing from the identity's tree. Never fails.
pub fn check_permission(identity: Option<&Identity>, path: &str) -> Decision {
    let Some(identity) = identity else {
        debug!(path, "no identity, denying");
        return Decision::Deny;
    };
    let Some(parsed) = PermissionPath::parse(path) else {
        debug!(path, "malformed permission path, denying");
        return Decision::Deny;
    };
    if identity.permissions.allows(&parsed) {
        Decision::Allow
    } else {
        Decision::Deny
    }
}
