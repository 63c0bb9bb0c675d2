//! Fixed identity provider.

use crate::providers::IdentityProvider;
use crate::state::UserId;

/// An identity provider that always answers the same thing.
#[derive(Debug, Clone, Copy)]
pub struct StaticIdentity {
    user: Option<UserId>,
}

impl StaticIdentity {
    /// A provider reporting `user` as signed in.
    #[must_use]
    pub const fn signed_in(user: UserId) -> Self {
        Self { user: Some(user) }
    }

    /// A provider reporting nobody signed in.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user: None }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserId> {
        self.user
    }
}
