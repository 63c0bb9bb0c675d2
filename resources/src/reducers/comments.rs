//! Comment thread reducer.

use std::marker::PhantomData;

use optimal_core::effect::Effect;
use optimal_core::reducer::Reducer;
use optimal_core::{SmallVec, smallvec};

use crate::error::ResourceError;
use crate::providers::{CommentStore, IdentityProvider};
use crate::state::{Comment, ResourceId};

/// State of one resource's comment thread.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentsState {
    /// The resource the thread belongs to.
    pub resource_id: ResourceId,

    /// Loaded comments, oldest first.
    pub comments: Vec<Comment>,

    /// The comment being composed.
    pub draft: String,

    /// Whether a load or post is in flight.
    pub loading: bool,

    /// The most recent failure.
    pub last_error: Option<ResourceError>,
}

impl CommentsState {
    /// An empty thread for a resource.
    #[must_use]
    pub const fn new(resource_id: ResourceId) -> Self {
        Self {
            resource_id,
            comments: Vec::new(),
            draft: String::new(),
            loading: false,
            last_error: None,
        }
    }
}

/// Actions for the comment thread.
#[derive(Debug, Clone, PartialEq)]
pub enum CommentsAction {
    /// Fetch the thread.
    Load,

    /// The thread finished loading.
    Loaded {
        /// Comments, oldest first.
        comments: Vec<Comment>,
    },

    /// Update the draft as the user types.
    DraftChanged {
        /// Current textarea contents.
        content: String,
    },

    /// Post the current draft.
    Post,

    /// A post was persisted; the draft clears.
    Posted {
        /// The stored comment.
        comment: Comment,
    },

    /// A load or post failed.
    Failed {
        /// What went wrong.
        error: ResourceError,
    },
}

/// Dependencies of the comment thread.
#[derive(Debug, Clone)]
pub struct CommentsEnvironment<S, I>
where
    S: CommentStore + Clone,
    I: IdentityProvider + Clone,
{
    /// Comment persistence.
    pub comments: S,

    /// Who is signed in.
    pub identity: I,
}

/// Reducer for one resource's comment thread.
#[derive(Debug, Clone)]
pub struct CommentsReducer<S, I> {
    _phantom: PhantomData<(S, I)>,
}

impl<S, I> CommentsReducer<S, I> {
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<S, I> Default for CommentsReducer<S, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, I> Reducer for CommentsReducer<S, I>
where
    S: CommentStore + Clone + 'static,
    I: IdentityProvider + Clone + 'static,
{
    type State = CommentsState;
    type Action = CommentsAction;
    type Environment = CommentsEnvironment<S, I>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CommentsAction::Load => {
                state.loading = true;
                let comments = env.comments.clone();
                let resource = state.resource_id;

                smallvec![Effect::Future(Box::pin(async move {
                    match comments.comments_for(resource).await {
                        Ok(comments) => Some(CommentsAction::Loaded { comments }),
                        Err(error) => Some(CommentsAction::Failed { error }),
                    }
                }))]
            }

            CommentsAction::Loaded { comments } => {
                state.comments = comments;
                state.loading = false;
                smallvec![]
            }

            CommentsAction::DraftChanged { content } => {
                state.draft = content;
                smallvec![]
            }

            CommentsAction::Post => {
                let Some(user) = env.identity.current_user() else {
                    return smallvec![];
                };
                let content = state.draft.trim().to_string();
                if content.is_empty() {
                    return smallvec![];
                }
                state.loading = true;
                let comments = env.comments.clone();
                let resource = state.resource_id;

                smallvec![Effect::Future(Box::pin(async move {
                    match comments.add_comment(resource, user, content).await {
                        Ok(comment) => Some(CommentsAction::Posted { comment }),
                        Err(error) => Some(CommentsAction::Failed { error }),
                    }
                }))]
            }

            CommentsAction::Posted { comment } => {
                state.comments.push(comment);
                state.draft.clear();
                state.loading = false;
                state.last_error = None;
                smallvec![]
            }

            CommentsAction::Failed { error } => {
                tracing::warn!(resource = ?state.resource_id, %error, "comment operation failed");
                state.loading = false;
                state.last_error = Some(error);
                smallvec![]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MemoryPlatform, StaticIdentity};
    use crate::state::UserId;

    type Env = CommentsEnvironment<MemoryPlatform, StaticIdentity>;

    async fn drain(
        reducer: &CommentsReducer<MemoryPlatform, StaticIdentity>,
        state: &mut CommentsState,
        env: &Env,
        effects: SmallVec<[Effect<CommentsAction>; 4]>,
    ) {
        for effect in effects {
            if let Effect::Future(future) = effect {
                if let Some(action) = future.await {
                    let next = reducer.reduce(state, action, env);
                    Box::pin(drain(reducer, state, env, next)).await;
                }
            }
        }
    }

    #[tokio::test]
    async fn posting_clears_the_draft_and_appends() {
        let platform = MemoryPlatform::new();
        let resource = platform.seed_resource("Commented", &["rust"], 0).await;
        let user = UserId::new();
        let env = CommentsEnvironment {
            comments: platform.clone(),
            identity: StaticIdentity::signed_in(user),
        };
        let reducer = CommentsReducer::new();

        let mut state = CommentsState::new(resource);
        reducer.reduce(
            &mut state,
            CommentsAction::DraftChanged {
                content: "Great resource!".to_string(),
            },
            &env,
        );
        let effects = reducer.reduce(&mut state, CommentsAction::Post, &env);
        drain(&reducer, &mut state, &env, effects).await;

        assert!(state.draft.is_empty());
        assert_eq!(state.comments.len(), 1);
        assert_eq!(state.comments[0].content, "Great resource!");
        // New comments start with a zero score
        assert_eq!(state.comments[0].likes, 0);
    }

    #[tokio::test]
    async fn blank_drafts_are_not_posted() {
        let platform = MemoryPlatform::new();
        let resource = platform.seed_resource("Quiet", &["rust"], 0).await;
        let env = CommentsEnvironment {
            comments: platform.clone(),
            identity: StaticIdentity::signed_in(UserId::new()),
        };
        let reducer = CommentsReducer::new();

        let mut state = CommentsState::new(resource);
        state.draft = "   ".to_string();
        let effects = reducer.reduce(&mut state, CommentsAction::Post, &env);

        assert!(effects.is_empty());
        assert_eq!(platform.gateway_calls(), 0);
    }

    #[tokio::test]
    async fn anonymous_post_is_a_silent_no_op() {
        let platform = MemoryPlatform::new();
        let resource = platform.seed_resource("Locked", &["rust"], 0).await;
        let env = CommentsEnvironment {
            comments: platform.clone(),
            identity: StaticIdentity::anonymous(),
        };
        let reducer = CommentsReducer::new();

        let mut state = CommentsState::new(resource);
        state.draft = "hello".to_string();
        let effects = reducer.reduce(&mut state, CommentsAction::Post, &env);

        assert!(effects.is_empty());
        assert_eq!(state.draft, "hello");
        assert_eq!(platform.gateway_calls(), 0);
    }
}
