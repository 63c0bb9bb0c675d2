//! Shared domain records.
//!
//! This module defines the rows the external platform persists and the ID
//! newtypes used throughout the crate. All types are `Clone` to support the
//! functional architecture pattern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for a user.
///
/// Issued by the external identity platform; this crate never mints users,
/// only carries their IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub uuid::Uuid);

impl UserId {
    /// Generate a new random `UserId` (tests and demos).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub uuid::Uuid);

impl ResourceId {
    /// Generate a new random `ResourceId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentId(pub uuid::Uuid);

impl CommentId {
    /// Generate a new random `CommentId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for CommentId {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Domain Records
// ═══════════════════════════════════════════════════════════════════════

/// A shared learning resource.
///
/// The `likes` counter is shared mutable state updated by every user who
/// reacts to the resource; it is mutated only through the reaction
/// reconciliation path and may legitimately be negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Opaque immutable identifier.
    pub id: ResourceId,

    /// Unique display title.
    pub title: String,

    /// Where the resource lives.
    pub resource_url: String,

    /// Optional preview image.
    pub image_url: Option<String>,

    /// Open-ended kind ("Online Course", "Book", ...).
    pub resource_type: String,

    /// Tags the resource is filed under.
    pub tags: Vec<String>,

    /// Aggregate reaction score (likes minus dislikes, plus any seed value
    /// the row carried before reactions existed).
    pub likes: i64,

    /// Submissions start unapproved and are hidden from tag listings.
    pub approved: bool,

    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Distinguishes the rows of the single tagged per-user relation.
///
/// Reactions and bookmarks share one relation keyed by
/// `(user_id, resource_id, kind)` rather than two competing schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// A like/dislike vote; payload is a [`crate::Reaction`].
    Reaction,
    /// A bookmark; presence of the row is the whole payload.
    Bookmark,
}

impl ActionKind {
    /// Storage name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reaction => "reaction",
            Self::Bookmark => "bookmark",
        }
    }
}

/// A comment on a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment identifier.
    pub id: CommentId,

    /// Resource the comment belongs to.
    pub resource_id: ResourceId,

    /// Author.
    pub user_id: UserId,

    /// Comment body.
    pub content: String,

    /// Comment score (seeded at zero; not wired to the reaction engine).
    pub likes: i64,

    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Payload of the submit-resource form, before an ID and timestamps exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewResource {
    /// Display title.
    pub title: String,

    /// Where the resource lives.
    pub resource_url: String,

    /// Optional preview image (uploaded separately; URL only here).
    pub image_url: Option<String>,

    /// Open-ended kind.
    pub resource_type: String,

    /// At least one tag is required.
    pub tags: Vec<String>,
}

/// A site-improvement suggestion, persisted unreviewed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Suggested title.
    pub title: String,

    /// Suggested link.
    pub resource_url: String,

    /// Optional preview image.
    pub image_url: Option<String>,

    /// Suggested kind.
    pub resource_type: String,

    /// Suggested tags.
    pub tags: Vec<String>,
}
