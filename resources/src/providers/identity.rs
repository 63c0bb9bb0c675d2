//! Caller identity.

use crate::state::UserId;

/// Who, if anyone, is signed in.
///
/// Synchronous by design: the session is resolved once at the edge and the
/// answer is already in hand when a reducer runs. `None` means an anonymous
/// visitor, which is a normal state rather than an error; reducers turn
/// identity-requiring presses into silent no-ops.
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, or `None` for anonymous visitors.
    fn current_user(&self) -> Option<UserId>;
}
