//! # Optimal Resources
//!
//! The community resource-sharing domain: browsing programming-learning
//! resources by tag, submitting new resources, commenting, bookmarking, and
//! the like/dislike reaction engine.
//!
//! ## Architecture
//!
//! Every feature is implemented as a reducer with explicit effects:
//!
//! ```text
//! Action → Reducer → (State, Effects) → Effect Execution → More Actions
//! ```
//!
//! All persistence is delegated to an external platform consumed through the
//! provider traits in [`providers`]; in-memory implementations live in
//! [`mocks`] and PostgreSQL-backed ones behind the `postgres` feature.
//!
//! ## The reaction engine
//!
//! The one piece of real business logic is the tri-state like/dislike
//! reconciliation in [`reaction`]: a user's current stance plus a button
//! press yields the next stance and a signed delta to the resource's shared
//! counter. The [`reducers::reaction`] module drives it optimistically:
//! apply locally, commit remotely, roll back on failure.
//!
//! ## Example: pressing like
//!
//! ```rust,ignore
//! use optimal_resources::*;
//!
//! let effects = reducer.reduce(
//!     &mut panel,
//!     ReactionAction::Press { requested: Reaction::Liked },
//!     &env,
//! );
//!
//! // Counter already updated optimistically
//! assert_eq!(panel.likes, 4);
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod error;
pub mod providers;
pub mod reaction;
pub mod reducers;
pub mod slug;
pub mod state;

// In-memory providers, used by tests and demos
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// PostgreSQL-backed providers
#[cfg(feature = "postgres")]
pub mod stores;

// Re-export main types for convenience
pub use error::{ResourceError, Result};
pub use reaction::{Reaction, apply_reaction, likes_label};
pub use reducers::bookmark::{BookmarkAction, BookmarkReducer, BookmarkState};
pub use reducers::catalog::{CatalogAction, CatalogReducer, CatalogState};
pub use reducers::comments::{CommentsAction, CommentsReducer, CommentsState};
pub use reducers::reaction::{ReactionAction, ReactionPanel, ReactionReducer};
pub use state::{Comment, CommentId, NewResource, Resource, ResourceId, Suggestion, UserId};
