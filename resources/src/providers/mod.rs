//! Provider traits for external platform integration.
//!
//! Each trait covers one slice of the persistence platform. Reducers receive
//! providers through their environments and never touch the platform
//! directly, so any backend (in-memory mock, PostgreSQL, a hosted BaaS) can
//! stand behind the same reducer logic.
//!
//! All async trait methods return `impl Future<Output = ...> + Send` so
//! implementations stay object-safe-free and allocation-free at the seam.

mod bookmarks;
mod catalog;
mod comments;
mod gateway;
mod identity;

pub use bookmarks::BookmarkStore;
pub use catalog::ResourceCatalog;
pub use comments::CommentStore;
pub use gateway::ReactionGateway;
pub use identity::IdentityProvider;
