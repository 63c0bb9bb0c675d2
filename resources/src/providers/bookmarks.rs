//! Bookmark persistence.

use std::future::Future;

use crate::error::Result;
use crate::state::{ResourceId, UserId};

/// Persistence operations for per-user bookmarks.
///
/// A bookmark is a bare row in the same per-user relation reactions use,
/// tagged with its own kind; presence of the row is the entire payload.
/// Unlike reactions, bookmark toggles are committed remotely before local
/// state changes.
pub trait BookmarkStore: Send + Sync {
    /// Whether the caller has bookmarked the resource.
    fn is_bookmarked(
        &self,
        user: UserId,
        resource: ResourceId,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Record a bookmark. Idempotent.
    fn add_bookmark(
        &self,
        user: UserId,
        resource: ResourceId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Remove a bookmark. Removing an absent bookmark is not an error.
    fn remove_bookmark(
        &self,
        user: UserId,
        resource: ResourceId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// IDs of everything the caller has bookmarked, most recent first.
    fn bookmarked_resources(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<ResourceId>>> + Send;
}
