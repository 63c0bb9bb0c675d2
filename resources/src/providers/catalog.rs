//! Resource catalog persistence.

use std::future::Future;

use crate::error::Result;
use crate::state::{NewResource, Resource, ResourceId, Suggestion};

/// Persistence operations for the resource catalog itself.
pub trait ResourceCatalog: Send + Sync {
    /// Approved resources filed under a tag, newest first.
    ///
    /// Unapproved submissions never appear here.
    fn resources_by_tag(&self, tag: &str) -> impl Future<Output = Result<Vec<Resource>>> + Send;

    /// Look up a single resource whose title contains the pattern,
    /// case-insensitively.
    ///
    /// Titles are unique, so a substring recovered from a slug resolves to
    /// at most one row.
    fn resource_by_title(
        &self,
        title_pattern: &str,
    ) -> impl Future<Output = Result<Option<Resource>>> + Send;

    /// Fetch specific resources by ID, preserving the requested order.
    fn resources_by_ids(
        &self,
        ids: &[ResourceId],
    ) -> impl Future<Output = Result<Vec<Resource>>> + Send;

    /// Persist a new submission.
    ///
    /// Stored with `approved = false` and a zero counter; a human review
    /// flips the flag later, outside this crate.
    fn submit_resource(
        &self,
        submission: NewResource,
    ) -> impl Future<Output = Result<Resource>> + Send;

    /// Persist a site-improvement suggestion, unreviewed.
    fn submit_suggestion(
        &self,
        suggestion: Suggestion,
    ) -> impl Future<Output = Result<()>> + Send;
}
