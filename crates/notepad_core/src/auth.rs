//! Authentication collaborator boundary.
//!
//! # Responsibility
//! - Expose the current user identity to remote-store tagging.
//!
//! # Invariants
//! - Authentication failures never block local operation: `None` means an
//!   anonymous session and every local code path proceeds unchanged.

/// Provides the opaque current-user token used to scope remote writes.
pub trait AuthProvider: Send + Sync {
    /// Returns the current user id, or `None` for an anonymous session.
    fn current_user_id(&self) -> Option<String>;
}

/// Default collaborator: always an anonymous session.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnonymousAuth;

impl AuthProvider for AnonymousAuth {
    fn current_user_id(&self) -> Option<String> {
        None
    }
}

/// Fixed-identity provider for callers that resolved a user out of band.
#[derive(Debug, Clone)]
pub struct StaticAuth {
    user_id: String,
}

impl StaticAuth {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

impl AuthProvider for StaticAuth {
    fn current_user_id(&self) -> Option<String> {
        Some(self.user_id.clone())
    }
}
