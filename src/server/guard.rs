//! Request-side gate in front of mutating server operations.
//!
//! Resolves the caller from the `Authorization` header and checks one
//! permission path. Deny is a [`Denial`] carrying the status (401 when
//! nobody is authenticated, 403 when the caller lacks the capability)
//! and a short message body.

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use crate::model::config::AuthMessages;
use crate::model::permission::Identity;
use crate::ops::permission_ops::{Decision, check_permission};

/// Error type for credential verification
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credential")]
    InvalidCredential,
    #[error("credential expired")]
    Expired,
}

/// Turns a bearer credential into an identity (signature and expiry checks
/// live behind this trait).
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

pub const UNAUTHORIZED: u16 = 401;
pub const FORBIDDEN: u16 = 403;

/// Short-circuit response for a denied request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Denial {
    #[serde(skip)]
    pub status: u16,
    #[serde(rename = "error")]
    pub message: String,
}

impl Denial {
    pub fn unauthenticated(messages: &AuthMessages) -> Self {
        Denial {
            status: UNAUTHORIZED,
            message: messages.unauthenticated_message.clone(),
        }
    }

    pub fn forbidden(messages: &AuthMessages) -> Self {
        Denial {
            status: FORBIDDEN,
            message: messages.forbidden_message.clone(),
        }
    }

    /// JSON response body, `{"error": <message>}`
    pub fn body(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Extract the token from `Bearer <token>` (scheme is case-insensitive)
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// Gate for an already-resolved caller
pub fn require(identity: Option<&Identity>, path: &str, messages: &AuthMessages) -> Result<(), Denial> {
    match check_permission(identity, path) {
        Decision::Allow => Ok(()),
        Decision::Deny => {
            let denial = match identity {
                None => Denial::unauthenticated(messages),
                Some(_) => Denial::forbidden(messages),
            };
            warn!(
                path,
                status = denial.status,
                caller = identity.map(|i| i.id),
                "request denied"
            );
            Err(denial)
        }
    }
}

/// Verifier plus evaluator, ready to sit in front of a handler
pub struct PermissionGuard<V> {
    verifier: V,
    messages: AuthMessages,
}

impl<V: IdentityVerifier> PermissionGuard<V> {
    pub fn new(verifier: V, messages: AuthMessages) -> Self {
        PermissionGuard { verifier, messages }
    }

    /// Resolve the caller from the raw `Authorization` header value and
    /// check `path`. On allow the identity is handed on to the handler.
    pub async fn authorize(&self, authorization: Option<&str>, path: &str) -> Result<Identity, Denial> {
        let identity = match authorization.and_then(bearer_token) {
            Some(token) => match self.verifier.verify(token).await {
                Ok(identity) => Some(identity),
                Err(err) => {
                    warn!(error = %err, "credential rejected");
                    None
                }
            },
            None => None,
        };
        require(identity.as_ref(), path, &self.messages)?;
        // require() only allows when an identity is present
        identity.ok_or_else(|| Denial::unauthenticated(&self.messages))
    }
}
