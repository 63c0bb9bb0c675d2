//! PostgreSQL-backed providers.
//!
//! One pool-holding value implements every provider trait, mirroring the
//! hosted platform the reducers were written against. Reactions and
//! bookmarks share the `user_actions` relation, keyed by
//! `(user_id, resource_id, kind)`; a neutral stance has no row.
//!
//! The counter update honors the gateway contract exactly: `read_counter`
//! selects the aggregate, `write_counter` overwrites it with the
//! caller-computed value. No `UPDATE ... SET likes = likes + $1` shortcut,
//! so the accepted lost-update window behaves the same here as against any
//! other backend.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::error::{ResourceError, Result};
use crate::providers::{BookmarkStore, CommentStore, ReactionGateway, ResourceCatalog};
use crate::reaction::Reaction;
use crate::state::{
    ActionKind, Comment, CommentId, NewResource, Resource, ResourceId, Suggestion, UserId,
};

/// PostgreSQL implementation of every provider trait.
#[derive(Debug, Clone)]
pub struct PgPlatform {
    pool: PgPool,
}

impl PgPlatform {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Persistence`] if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ResourceError::Persistence(e.to_string()))
    }
}

fn map_sqlx(err: sqlx::Error) -> ResourceError {
    ResourceError::Persistence(err.to_string())
}

fn resource_from_row(row: &PgRow) -> Result<Resource> {
    Ok(Resource {
        id: ResourceId(row.try_get("id").map_err(map_sqlx)?),
        title: row.try_get("title").map_err(map_sqlx)?,
        resource_url: row.try_get("resource_url").map_err(map_sqlx)?,
        image_url: row.try_get("image_url").map_err(map_sqlx)?,
        resource_type: row.try_get("resource_type").map_err(map_sqlx)?,
        tags: row.try_get("tags").map_err(map_sqlx)?,
        likes: row.try_get("likes").map_err(map_sqlx)?,
        approved: row.try_get("approved").map_err(map_sqlx)?,
        created_at: row.try_get("created_at").map_err(map_sqlx)?,
    })
}

fn comment_from_row(row: &PgRow) -> Result<Comment> {
    Ok(Comment {
        id: CommentId(row.try_get("id").map_err(map_sqlx)?),
        resource_id: ResourceId(row.try_get("resource_id").map_err(map_sqlx)?),
        user_id: UserId(row.try_get("user_id").map_err(map_sqlx)?),
        content: row.try_get("content").map_err(map_sqlx)?,
        likes: row.try_get("likes").map_err(map_sqlx)?,
        created_at: row.try_get("created_at").map_err(map_sqlx)?,
    })
}

impl ReactionGateway for PgPlatform {
    async fn read_reaction(&self, user: UserId, resource: ResourceId) -> Result<Option<Reaction>> {
        let row = sqlx::query(
            "SELECT reaction FROM user_actions
             WHERE user_id = $1 AND resource_id = $2 AND kind = $3",
        )
        .bind(user.0)
        .bind(resource.0)
        .bind(ActionKind::Reaction.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        match row {
            Some(row) => {
                let value: String = row.try_get("reaction").map_err(map_sqlx)?;
                Ok(Some(Reaction::parse(&value)?))
            }
            None => Ok(None),
        }
    }

    async fn upsert_reaction(
        &self,
        user: UserId,
        resource: ResourceId,
        reaction: Reaction,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO user_actions (user_id, resource_id, kind, reaction)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, resource_id, kind)
             DO UPDATE SET reaction = EXCLUDED.reaction",
        )
        .bind(user.0)
        .bind(resource.0)
        .bind(ActionKind::Reaction.as_str())
        .bind(reaction.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn delete_reaction(&self, user: UserId, resource: ResourceId) -> Result<()> {
        sqlx::query(
            "DELETE FROM user_actions
             WHERE user_id = $1 AND resource_id = $2 AND kind = $3",
        )
        .bind(user.0)
        .bind(resource.0)
        .bind(ActionKind::Reaction.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn read_counter(&self, resource: ResourceId) -> Result<i64> {
        let row = sqlx::query("SELECT likes FROM resources WHERE id = $1")
            .bind(resource.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .ok_or(ResourceError::NotFound)?;
        row.try_get("likes").map_err(map_sqlx)
    }

    async fn write_counter(&self, resource: ResourceId, likes: i64) -> Result<()> {
        let result = sqlx::query("UPDATE resources SET likes = $2 WHERE id = $1")
            .bind(resource.0)
            .bind(likes)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(ResourceError::NotFound);
        }
        Ok(())
    }
}

impl BookmarkStore for PgPlatform {
    async fn is_bookmarked(&self, user: UserId, resource: ResourceId) -> Result<bool> {
        let row = sqlx::query(
            "SELECT 1 AS present FROM user_actions
             WHERE user_id = $1 AND resource_id = $2 AND kind = $3",
        )
        .bind(user.0)
        .bind(resource.0)
        .bind(ActionKind::Bookmark.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(row.is_some())
    }

    async fn add_bookmark(&self, user: UserId, resource: ResourceId) -> Result<()> {
        sqlx::query(
            "INSERT INTO user_actions (user_id, resource_id, kind)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, resource_id, kind) DO NOTHING",
        )
        .bind(user.0)
        .bind(resource.0)
        .bind(ActionKind::Bookmark.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn remove_bookmark(&self, user: UserId, resource: ResourceId) -> Result<()> {
        sqlx::query(
            "DELETE FROM user_actions
             WHERE user_id = $1 AND resource_id = $2 AND kind = $3",
        )
        .bind(user.0)
        .bind(resource.0)
        .bind(ActionKind::Bookmark.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn bookmarked_resources(&self, user: UserId) -> Result<Vec<ResourceId>> {
        let rows = sqlx::query(
            "SELECT resource_id FROM user_actions
             WHERE user_id = $1 AND kind = $2
             ORDER BY created_at DESC",
        )
        .bind(user.0)
        .bind(ActionKind::Bookmark.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.iter()
            .map(|row| Ok(ResourceId(row.try_get("resource_id").map_err(map_sqlx)?)))
            .collect()
    }
}

impl ResourceCatalog for PgPlatform {
    async fn resources_by_tag(&self, tag: &str) -> Result<Vec<Resource>> {
        let rows = sqlx::query(
            "SELECT id, title, resource_url, image_url, resource_type,
                    tags, likes, approved, created_at
             FROM resources
             WHERE approved AND $1 = ANY(tags)
             ORDER BY created_at DESC",
        )
        .bind(tag)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.iter().map(resource_from_row).collect()
    }

    async fn resource_by_title(&self, title_pattern: &str) -> Result<Option<Resource>> {
        // Titles are unique; the slug-recovered pattern matches at most one
        let escaped = title_pattern.replace('%', "\\%").replace('_', "\\_");
        let row = sqlx::query(
            "SELECT id, title, resource_url, image_url, resource_type,
                    tags, likes, approved, created_at
             FROM resources
             WHERE title ILIKE '%' || $1 || '%'
             LIMIT 1",
        )
        .bind(escaped)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        row.as_ref().map(resource_from_row).transpose()
    }

    async fn resources_by_ids(&self, ids: &[ResourceId]) -> Result<Vec<Resource>> {
        let raw: Vec<uuid::Uuid> = ids.iter().map(|id| id.0).collect();
        let rows = sqlx::query(
            "SELECT id, title, resource_url, image_url, resource_type,
                    tags, likes, approved, created_at
             FROM resources
             WHERE id = ANY($1)",
        )
        .bind(&raw)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        let fetched = rows
            .iter()
            .map(resource_from_row)
            .collect::<Result<Vec<_>>>()?;

        // Preserve the requested order
        Ok(ids
            .iter()
            .filter_map(|id| fetched.iter().find(|r| r.id == *id).cloned())
            .collect())
    }

    async fn submit_resource(&self, submission: NewResource) -> Result<Resource> {
        let row = sqlx::query(
            "INSERT INTO resources
                 (title, resource_url, image_url, resource_type, tags, likes, approved)
             VALUES ($1, $2, $3, $4, $5, 0, FALSE)
             RETURNING id, title, resource_url, image_url, resource_type,
                       tags, likes, approved, created_at",
        )
        .bind(&submission.title)
        .bind(&submission.resource_url)
        .bind(&submission.image_url)
        .bind(&submission.resource_type)
        .bind(&submission.tags)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ResourceError::InvalidSubmission {
                    reason: "a resource with this title already exists".to_string(),
                }
            }
            _ => map_sqlx(e),
        })?;

        resource_from_row(&row)
    }

    async fn submit_suggestion(&self, suggestion: Suggestion) -> Result<()> {
        sqlx::query(
            "INSERT INTO suggestions (title, resource_url, image_url, resource_type, tags)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&suggestion.title)
        .bind(&suggestion.resource_url)
        .bind(&suggestion.image_url)
        .bind(&suggestion.resource_type)
        .bind(&suggestion.tags)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }
}

impl CommentStore for PgPlatform {
    async fn comments_for(&self, resource: ResourceId) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT id, resource_id, user_id, content, likes, created_at
             FROM comments
             WHERE resource_id = $1
             ORDER BY created_at ASC",
        )
        .bind(resource.0)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.iter().map(comment_from_row).collect()
    }

    async fn add_comment(
        &self,
        resource: ResourceId,
        author: UserId,
        content: String,
    ) -> Result<Comment> {
        let row = sqlx::query(
            "INSERT INTO comments (resource_id, user_id, content, likes)
             VALUES ($1, $2, $3, 0)
             RETURNING id, resource_id, user_id, content, likes, created_at",
        )
        .bind(resource.0)
        .bind(author.0)
        .bind(&content)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;

        comment_from_row(&row)
    }
}
