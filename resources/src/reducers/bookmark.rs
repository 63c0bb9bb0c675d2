//! Bookmark toggle reducer.
//!
//! Unlike the reaction panel, the bookmark toggle is NOT optimistic: the
//! remote write completes before local state flips, so there is no snapshot
//! and no rollback. A failed write leaves the toggle exactly where it was.
//!
//! Anonymous toggles are silent no-ops, same as reactions.

use std::marker::PhantomData;

use optimal_core::effect::Effect;
use optimal_core::reducer::Reducer;
use optimal_core::{SmallVec, smallvec};

use crate::error::ResourceError;
use crate::providers::{BookmarkStore, IdentityProvider};
use crate::state::ResourceId;

/// State of one resource's bookmark toggle.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkState {
    /// The resource the toggle belongs to.
    pub resource_id: ResourceId,

    /// Whether the caller currently has the resource bookmarked.
    pub bookmarked: bool,

    /// Whether the initial load has completed.
    pub loaded: bool,

    /// Whether a toggle write is in flight.
    pub busy: bool,

    /// The most recent failure.
    pub last_error: Option<ResourceError>,
}

impl BookmarkState {
    /// An unloaded toggle for a resource.
    #[must_use]
    pub const fn new(resource_id: ResourceId) -> Self {
        Self {
            resource_id,
            bookmarked: false,
            loaded: false,
            busy: false,
            last_error: None,
        }
    }
}

/// Actions for the bookmark toggle.
#[derive(Debug, Clone, PartialEq)]
pub enum BookmarkAction {
    /// Fetch whether the caller has bookmarked the resource.
    Load,

    /// Initial load finished.
    Loaded {
        /// Whether a bookmark row exists.
        bookmarked: bool,
    },

    /// The user pressed the bookmark button.
    Toggle,

    /// The remote write landed; local state may now flip.
    Toggled {
        /// The new bookmark state.
        bookmarked: bool,
    },

    /// A load or toggle failed; local state is unchanged.
    Failed {
        /// What went wrong.
        error: ResourceError,
    },
}

/// Dependencies of the bookmark toggle.
#[derive(Debug, Clone)]
pub struct BookmarkEnvironment<B, I>
where
    B: BookmarkStore + Clone,
    I: IdentityProvider + Clone,
{
    /// Bookmark persistence.
    pub bookmarks: B,

    /// Who is signed in.
    pub identity: I,
}

/// Reducer for one resource's bookmark toggle.
#[derive(Debug, Clone)]
pub struct BookmarkReducer<B, I> {
    _phantom: PhantomData<(B, I)>,
}

impl<B, I> BookmarkReducer<B, I> {
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<B, I> Default for BookmarkReducer<B, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, I> Reducer for BookmarkReducer<B, I>
where
    B: BookmarkStore + Clone + 'static,
    I: IdentityProvider + Clone + 'static,
{
    type State = BookmarkState;
    type Action = BookmarkAction;
    type Environment = BookmarkEnvironment<B, I>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            BookmarkAction::Load => {
                let Some(user) = env.identity.current_user() else {
                    // Anonymous visitors have no bookmarks to load
                    state.loaded = true;
                    return smallvec![];
                };
                let bookmarks = env.bookmarks.clone();
                let resource = state.resource_id;

                smallvec![Effect::Future(Box::pin(async move {
                    match bookmarks.is_bookmarked(user, resource).await {
                        Ok(bookmarked) => Some(BookmarkAction::Loaded { bookmarked }),
                        Err(error) => Some(BookmarkAction::Failed { error }),
                    }
                }))]
            }

            BookmarkAction::Loaded { bookmarked } => {
                state.bookmarked = bookmarked;
                state.loaded = true;
                smallvec![]
            }

            BookmarkAction::Toggle => {
                let Some(user) = env.identity.current_user() else {
                    return smallvec![];
                };
                if state.busy {
                    return smallvec![];
                }

                // Commit remotely first; local state flips on Toggled
                state.busy = true;
                let target = !state.bookmarked;
                let bookmarks = env.bookmarks.clone();
                let resource = state.resource_id;

                smallvec![Effect::Future(Box::pin(async move {
                    let result = if target {
                        bookmarks.add_bookmark(user, resource).await
                    } else {
                        bookmarks.remove_bookmark(user, resource).await
                    };
                    match result {
                        Ok(()) => Some(BookmarkAction::Toggled { bookmarked: target }),
                        Err(error) => Some(BookmarkAction::Failed { error }),
                    }
                }))]
            }

            BookmarkAction::Toggled { bookmarked } => {
                state.bookmarked = bookmarked;
                state.busy = false;
                state.last_error = None;
                smallvec![]
            }

            BookmarkAction::Failed { error } => {
                tracing::warn!(resource = ?state.resource_id, %error, "bookmark operation failed");
                state.busy = false;
                state.last_error = Some(error);
                smallvec![]
            }
        }
    }
}
