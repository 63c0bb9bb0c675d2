//! Comment persistence.

use std::future::Future;

use crate::error::Result;
use crate::state::{Comment, ResourceId, UserId};

/// Persistence operations for resource comments.
pub trait CommentStore: Send + Sync {
    /// All comments on a resource, oldest first.
    fn comments_for(
        &self,
        resource: ResourceId,
    ) -> impl Future<Output = Result<Vec<Comment>>> + Send;

    /// Persist a new comment, seeded with a zero score.
    fn add_comment(
        &self,
        resource: ResourceId,
        author: UserId,
        content: String,
    ) -> impl Future<Output = Result<Comment>> + Send;
}
