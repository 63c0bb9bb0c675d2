//! In-memory persistence platform.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;

use crate::error::{ResourceError, Result};
use crate::providers::{BookmarkStore, CommentStore, ReactionGateway, ResourceCatalog};
use crate::reaction::Reaction;
use crate::state::{
    ActionKind, Comment, CommentId, NewResource, Resource, ResourceId, Suggestion, UserId,
};

/// One row of the tagged per-user relation.
#[derive(Debug, Clone)]
struct ActionRow {
    user_id: UserId,
    resource_id: ResourceId,
    kind: ActionKind,
    reaction: Option<Reaction>,
    seq: u64,
}

#[derive(Debug, Default)]
struct Tables {
    resources: Vec<Resource>,
    actions: Vec<ActionRow>,
    comments: Vec<Comment>,
    suggestions: Vec<Suggestion>,
    next_seq: u64,
}

impl Tables {
    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

/// In-memory implementation of every provider trait.
///
/// Clones share the same tables, so the gateway, catalog, bookmark, and
/// comment views of one platform stay consistent with each other.
#[derive(Debug, Clone, Default)]
pub struct MemoryPlatform {
    tables: Arc<Mutex<Tables>>,
    fail_counter_writes: Arc<AtomicBool>,
    fail_record_writes: Arc<AtomicBool>,
    gateway_calls: Arc<AtomicUsize>,
}

impl MemoryPlatform {
    /// An empty platform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // Poisoning only matters if another test thread panicked mid-write;
        // the tables are still usable for assertions
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn track_call(&self) {
        self.gateway_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn persistence_err(what: &str) -> ResourceError {
        ResourceError::Persistence(format!("injected {what} failure"))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Failure switches and instrumentation
    // ═══════════════════════════════════════════════════════════════════

    /// Make every counter write fail.
    pub fn fail_counter_writes(&self, fail: bool) {
        self.fail_counter_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every per-user row write (reaction, bookmark) fail.
    pub fn fail_record_writes(&self, fail: bool) {
        self.fail_record_writes.store(fail, Ordering::SeqCst);
    }

    /// How many provider calls have been made.
    ///
    /// Seeding helpers do not count.
    #[must_use]
    pub fn gateway_calls(&self) -> usize {
        self.gateway_calls.load(Ordering::SeqCst)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Seeding and inspection (tests and demos)
    // ═══════════════════════════════════════════════════════════════════

    /// Insert an approved resource and return its ID.
    pub async fn seed_resource(&self, title: &str, tags: &[&str], likes: i64) -> ResourceId {
        let id = ResourceId::new();
        self.lock().resources.push(Resource {
            id,
            title: title.to_string(),
            resource_url: format!("https://example.com/{title}"),
            image_url: None,
            resource_type: "Online Course".to_string(),
            tags: tags.iter().map(ToString::to_string).collect(),
            likes,
            approved: true,
            created_at: Utc::now(),
        });
        id
    }

    /// Flip a seeded resource's approval flag.
    pub async fn set_approved(&self, id: ResourceId, approved: bool) {
        let mut tables = self.lock();
        if let Some(resource) = tables.resources.iter_mut().find(|r| r.id == id) {
            resource.approved = approved;
        }
    }

    /// Insert a reaction row directly.
    pub async fn seed_reaction(&self, user: UserId, resource: ResourceId, reaction: Reaction) {
        let mut tables = self.lock();
        let seq = tables.bump_seq();
        tables.actions.push(ActionRow {
            user_id: user,
            resource_id: resource,
            kind: ActionKind::Reaction,
            reaction: Some(reaction),
            seq,
        });
    }

    /// Insert a bookmark row directly.
    pub async fn seed_bookmark(&self, user: UserId, resource: ResourceId) {
        let mut tables = self.lock();
        let seq = tables.bump_seq();
        tables.actions.push(ActionRow {
            user_id: user,
            resource_id: resource,
            kind: ActionKind::Bookmark,
            reaction: None,
            seq,
        });
    }

    /// Current counter value of a resource, bypassing call tracking.
    #[must_use]
    pub async fn counter(&self, resource: ResourceId) -> i64 {
        self.lock()
            .resources
            .iter()
            .find(|r| r.id == resource)
            .map_or(0, |r| r.likes)
    }

    /// Stored reaction row for a user and resource, bypassing call tracking.
    #[must_use]
    pub async fn stored_reaction(&self, user: UserId, resource: ResourceId) -> Option<Reaction> {
        self.lock()
            .actions
            .iter()
            .find(|row| {
                row.user_id == user
                    && row.resource_id == resource
                    && row.kind == ActionKind::Reaction
            })
            .and_then(|row| row.reaction)
    }

    /// Whether a bookmark row exists, bypassing call tracking.
    #[must_use]
    pub async fn is_bookmarked_now(&self, user: UserId, resource: ResourceId) -> bool {
        self.lock().actions.iter().any(|row| {
            row.user_id == user && row.resource_id == resource && row.kind == ActionKind::Bookmark
        })
    }

    /// Fetch a stored resource by ID, bypassing call tracking.
    #[must_use]
    pub async fn resource(&self, id: ResourceId) -> Option<Resource> {
        self.lock().resources.iter().find(|r| r.id == id).cloned()
    }

    /// Stored suggestions, bypassing call tracking.
    #[must_use]
    pub async fn suggestions(&self) -> Vec<Suggestion> {
        self.lock().suggestions.clone()
    }
}

impl ReactionGateway for MemoryPlatform {
    async fn read_reaction(&self, user: UserId, resource: ResourceId) -> Result<Option<Reaction>> {
        self.track_call();
        Ok(self.stored_reaction(user, resource).await)
    }

    async fn upsert_reaction(
        &self,
        user: UserId,
        resource: ResourceId,
        reaction: Reaction,
    ) -> Result<()> {
        self.track_call();
        if self.fail_record_writes.load(Ordering::SeqCst) {
            return Err(Self::persistence_err("record write"));
        }
        let mut tables = self.lock();
        let seq = tables.bump_seq();
        let existing = tables.actions.iter_mut().find(|row| {
            row.user_id == user && row.resource_id == resource && row.kind == ActionKind::Reaction
        });
        match existing {
            Some(row) => row.reaction = Some(reaction),
            None => tables.actions.push(ActionRow {
                user_id: user,
                resource_id: resource,
                kind: ActionKind::Reaction,
                reaction: Some(reaction),
                seq,
            }),
        }
        Ok(())
    }

    async fn delete_reaction(&self, user: UserId, resource: ResourceId) -> Result<()> {
        self.track_call();
        if self.fail_record_writes.load(Ordering::SeqCst) {
            return Err(Self::persistence_err("record delete"));
        }
        self.lock().actions.retain(|row| {
            !(row.user_id == user
                && row.resource_id == resource
                && row.kind == ActionKind::Reaction)
        });
        Ok(())
    }

    async fn read_counter(&self, resource: ResourceId) -> Result<i64> {
        self.track_call();
        self.lock()
            .resources
            .iter()
            .find(|r| r.id == resource)
            .map(|r| r.likes)
            .ok_or(ResourceError::NotFound)
    }

    async fn write_counter(&self, resource: ResourceId, likes: i64) -> Result<()> {
        self.track_call();
        if self.fail_counter_writes.load(Ordering::SeqCst) {
            return Err(Self::persistence_err("counter write"));
        }
        let mut tables = self.lock();
        let row = tables
            .resources
            .iter_mut()
            .find(|r| r.id == resource)
            .ok_or(ResourceError::NotFound)?;
        row.likes = likes;
        Ok(())
    }
}

impl BookmarkStore for MemoryPlatform {
    async fn is_bookmarked(&self, user: UserId, resource: ResourceId) -> Result<bool> {
        self.track_call();
        Ok(self.is_bookmarked_now(user, resource).await)
    }

    async fn add_bookmark(&self, user: UserId, resource: ResourceId) -> Result<()> {
        self.track_call();
        if self.fail_record_writes.load(Ordering::SeqCst) {
            return Err(Self::persistence_err("bookmark write"));
        }
        let mut tables = self.lock();
        let exists = tables.actions.iter().any(|row| {
            row.user_id == user && row.resource_id == resource && row.kind == ActionKind::Bookmark
        });
        if !exists {
            let seq = tables.bump_seq();
            tables.actions.push(ActionRow {
                user_id: user,
                resource_id: resource,
                kind: ActionKind::Bookmark,
                reaction: None,
                seq,
            });
        }
        Ok(())
    }

    async fn remove_bookmark(&self, user: UserId, resource: ResourceId) -> Result<()> {
        self.track_call();
        if self.fail_record_writes.load(Ordering::SeqCst) {
            return Err(Self::persistence_err("bookmark delete"));
        }
        self.lock().actions.retain(|row| {
            !(row.user_id == user
                && row.resource_id == resource
                && row.kind == ActionKind::Bookmark)
        });
        Ok(())
    }

    async fn bookmarked_resources(&self, user: UserId) -> Result<Vec<ResourceId>> {
        self.track_call();
        let tables = self.lock();
        let mut rows: Vec<&ActionRow> = tables
            .actions
            .iter()
            .filter(|row| row.user_id == user && row.kind == ActionKind::Bookmark)
            .collect();
        rows.sort_by(|a, b| b.seq.cmp(&a.seq));
        Ok(rows.iter().map(|row| row.resource_id).collect())
    }
}

impl ResourceCatalog for MemoryPlatform {
    async fn resources_by_tag(&self, tag: &str) -> Result<Vec<Resource>> {
        self.track_call();
        let tables = self.lock();
        let mut matching: Vec<Resource> = tables
            .resources
            .iter()
            .filter(|r| r.approved && r.tags.iter().any(|t| t == tag))
            .cloned()
            .collect();
        matching.reverse(); // insertion order is oldest-first
        Ok(matching)
    }

    async fn resource_by_title(&self, title_pattern: &str) -> Result<Option<Resource>> {
        self.track_call();
        let pattern = title_pattern.to_lowercase();
        Ok(self
            .lock()
            .resources
            .iter()
            .find(|r| r.title.to_lowercase().contains(&pattern))
            .cloned())
    }

    async fn resources_by_ids(&self, ids: &[ResourceId]) -> Result<Vec<Resource>> {
        self.track_call();
        let tables = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| tables.resources.iter().find(|r| r.id == *id).cloned())
            .collect())
    }

    async fn submit_resource(&self, submission: NewResource) -> Result<Resource> {
        self.track_call();
        let resource = Resource {
            id: ResourceId::new(),
            title: submission.title,
            resource_url: submission.resource_url,
            image_url: submission.image_url,
            resource_type: submission.resource_type,
            tags: submission.tags,
            likes: 0,
            approved: false,
            created_at: Utc::now(),
        };
        self.lock().resources.push(resource.clone());
        Ok(resource)
    }

    async fn submit_suggestion(&self, suggestion: Suggestion) -> Result<()> {
        self.track_call();
        self.lock().suggestions.push(suggestion);
        Ok(())
    }
}

impl CommentStore for MemoryPlatform {
    async fn comments_for(&self, resource: ResourceId) -> Result<Vec<Comment>> {
        self.track_call();
        Ok(self
            .lock()
            .comments
            .iter()
            .filter(|c| c.resource_id == resource)
            .cloned()
            .collect())
    }

    async fn add_comment(
        &self,
        resource: ResourceId,
        author: UserId,
        content: String,
    ) -> Result<Comment> {
        self.track_call();
        let comment = Comment {
            id: CommentId::new(),
            resource_id: resource,
            user_id: author,
            content,
            likes: 0,
            created_at: Utc::now(),
        };
        self.lock().comments.push(comment.clone());
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_tables() {
        let platform = MemoryPlatform::new();
        let clone = platform.clone();
        let resource = platform.seed_resource("Shared", &["rust"], 3).await;

        assert_eq!(clone.counter(resource).await, 3);
        clone.write_counter(resource, 4).await.ok();
        assert_eq!(platform.counter(resource).await, 4);
    }

    #[tokio::test]
    async fn upsert_replaces_rather_than_duplicates() {
        let platform = MemoryPlatform::new();
        let resource = platform.seed_resource("One Row", &["rust"], 0).await;
        let user = UserId::new();

        platform
            .upsert_reaction(user, resource, Reaction::Liked)
            .await
            .ok();
        platform
            .upsert_reaction(user, resource, Reaction::Disliked)
            .await
            .ok();

        assert_eq!(
            platform.stored_reaction(user, resource).await,
            Some(Reaction::Disliked)
        );
        assert_eq!(platform.lock().actions.len(), 1);
    }

    #[tokio::test]
    async fn deleting_an_absent_reaction_is_not_an_error() {
        let platform = MemoryPlatform::new();
        let resource = platform.seed_resource("Nothing", &["rust"], 0).await;

        let result = platform.delete_reaction(UserId::new(), resource).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn bookmarks_and_reactions_do_not_collide() {
        let platform = MemoryPlatform::new();
        let resource = platform.seed_resource("Tagged Relation", &["rust"], 0).await;
        let user = UserId::new();

        platform
            .upsert_reaction(user, resource, Reaction::Liked)
            .await
            .ok();
        platform.add_bookmark(user, resource).await.ok();
        // Removing the bookmark must not touch the reaction row
        platform.remove_bookmark(user, resource).await.ok();

        assert_eq!(
            platform.stored_reaction(user, resource).await,
            Some(Reaction::Liked)
        );
        assert!(!platform.is_bookmarked_now(user, resource).await);
    }
}
