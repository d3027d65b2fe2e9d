//! Caller identity.
//!
//! Authentication itself is delegated to an external identity provider.
//! The repository only needs to know who is calling, or that nobody is.

use std::sync::Arc;

/// Source of the current caller's user id.
pub trait IdentityProvider: Send + Sync {
    /// The authenticated user id, or `None` for anonymous callers.
    fn current_user_id(&self) -> Option<String>;
}

/// A resolved caller, injected into request extensions by the auth
/// middleware and usable directly as an `IdentityProvider`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    user_id: Option<String>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn into_provider(self) -> Arc<dyn IdentityProvider> {
        Arc::new(self)
    }
}

impl IdentityProvider for Caller {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }
}
