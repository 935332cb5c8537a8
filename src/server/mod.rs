pub mod guard;

pub use guard::{AuthError, Denial, IdentityVerifier, PermissionGuard, bearer_token, require};
