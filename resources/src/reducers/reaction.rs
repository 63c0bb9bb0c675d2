//! Reaction panel reducer.
//!
//! Drives the like/dislike buttons under a resource with optimistic
//! updates:
//!
//! 1. `Load` reads the caller's stored vote and the shared counter.
//! 2. `Press` reconciles the press through [`apply_reaction`], applies the
//!    result locally at once, snapshots the previous values, and spawns the
//!    remote commit.
//! 3. `Committed` confirms the optimistic state; `CommitFailed` restores the
//!    snapshot exactly.
//!
//! Anonymous presses are silent no-ops: no state change, no effects, no
//! gateway traffic.
//!
//! The remote commit writes the counter first (read the remote aggregate,
//! add the delta, write it back), then the per-user record. If the record
//! write fails after the counter landed, one compensating counter write is
//! attempted; if that also fails the drift is accepted and reported as
//! [`ResourceError::PartialCommit`].

use std::marker::PhantomData;

use optimal_core::effect::Effect;
use optimal_core::reducer::Reducer;
use optimal_core::{SmallVec, smallvec};

use crate::error::ResourceError;
use crate::providers::{IdentityProvider, ReactionGateway};
use crate::reaction::{Reaction, apply_reaction};
use crate::state::ResourceId;

// ═══════════════════════════════════════════════════════════════════════
// State
// ═══════════════════════════════════════════════════════════════════════

/// Local values captured before an optimistic update, for rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionSnapshot {
    /// Stance before the press.
    pub reaction: Option<Reaction>,
    /// Counter before the press.
    pub likes: i64,
}

/// State of one resource's reaction panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionPanel {
    /// The resource the panel belongs to.
    pub resource_id: ResourceId,

    /// The caller's current stance, optimistically updated.
    pub reaction: Option<Reaction>,

    /// The shared counter, optimistically updated.
    pub likes: i64,

    /// Whether the initial load has completed.
    pub loaded: bool,

    /// Pre-press values of the commit currently in flight, if any.
    ///
    /// While this is `Some`, further presses are ignored.
    pub in_flight: Option<ReactionSnapshot>,

    /// The most recent failure, cleared on the next successful commit.
    pub last_error: Option<ResourceError>,
}

impl ReactionPanel {
    /// An unloaded panel for a resource.
    #[must_use]
    pub const fn new(resource_id: ResourceId) -> Self {
        Self {
            resource_id,
            reaction: None,
            likes: 0,
            loaded: false,
            in_flight: None,
            last_error: None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Actions
// ═══════════════════════════════════════════════════════════════════════

/// Actions for the reaction panel.
#[derive(Debug, Clone, PartialEq)]
pub enum ReactionAction {
    /// Fetch the caller's stored vote and the shared counter.
    Load,

    /// Initial load finished.
    Loaded {
        /// The caller's stored vote, `None` for neutral or anonymous.
        reaction: Option<Reaction>,
        /// The shared counter as the platform holds it.
        likes: i64,
    },

    /// Initial load failed; the panel stays unloaded.
    LoadFailed {
        /// What went wrong.
        error: ResourceError,
    },

    /// The user pressed a reaction button.
    Press {
        /// Which button.
        requested: Reaction,
    },

    /// The remote commit landed.
    Committed {
        /// The stance that was persisted.
        reaction: Option<Reaction>,
        /// The counter delta that was applied remotely.
        delta: i64,
    },

    /// The remote commit failed; local state rolls back.
    CommitFailed {
        /// What went wrong.
        error: ResourceError,
    },
}

// ═══════════════════════════════════════════════════════════════════════
// Environment
// ═══════════════════════════════════════════════════════════════════════

/// Dependencies of the reaction panel.
#[derive(Debug, Clone)]
pub struct ReactionEnvironment<G, I>
where
    G: ReactionGateway + Clone,
    I: IdentityProvider + Clone,
{
    /// Persistence gateway for votes and the counter.
    pub gateway: G,

    /// Who is signed in.
    pub identity: I,
}

// ═══════════════════════════════════════════════════════════════════════
// Reducer
// ═══════════════════════════════════════════════════════════════════════

/// Reducer for one resource's reaction panel.
#[derive(Debug, Clone)]
pub struct ReactionReducer<G, I> {
    _phantom: PhantomData<(G, I)>,
}

impl<G, I> ReactionReducer<G, I> {
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<G, I> Default for ReactionReducer<G, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G, I> Reducer for ReactionReducer<G, I>
where
    G: ReactionGateway + Clone + 'static,
    I: IdentityProvider + Clone + 'static,
{
    type State = ReactionPanel;
    type Action = ReactionAction;
    type Environment = ReactionEnvironment<G, I>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════
            // Load: fetch stored vote and counter
            // ═══════════════════════════════════════════════════════════
            ReactionAction::Load => {
                let gateway = env.gateway.clone();
                let user = env.identity.current_user();
                let resource = state.resource_id;

                smallvec![Effect::Future(Box::pin(async move {
                    let likes = match gateway.read_counter(resource).await {
                        Ok(likes) => likes,
                        Err(error) => return Some(ReactionAction::LoadFailed { error }),
                    };
                    // Anonymous visitors see the counter but hold no vote
                    let reaction = match user {
                        Some(user) => match gateway.read_reaction(user, resource).await {
                            Ok(reaction) => reaction,
                            Err(error) => return Some(ReactionAction::LoadFailed { error }),
                        },
                        None => None,
                    };
                    Some(ReactionAction::Loaded { reaction, likes })
                }))]
            }

            ReactionAction::Loaded { reaction, likes } => {
                state.reaction = reaction;
                state.likes = likes;
                state.loaded = true;
                smallvec![]
            }

            ReactionAction::LoadFailed { error } => {
                tracing::warn!(resource = ?state.resource_id, %error, "reaction load failed");
                state.last_error = Some(error);
                smallvec![]
            }

            // ═══════════════════════════════════════════════════════════
            // Press: optimistic update + remote commit
            // ═══════════════════════════════════════════════════════════
            ReactionAction::Press { requested } => {
                let Some(user) = env.identity.current_user() else {
                    // Anonymous: silent no-op, no gateway traffic
                    return smallvec![];
                };

                if state.in_flight.is_some() {
                    tracing::debug!(
                        resource = ?state.resource_id,
                        "press ignored, commit in flight"
                    );
                    return smallvec![];
                }

                let (next, delta) = apply_reaction(state.reaction, requested);

                // Snapshot then apply locally; rollback restores these exact values
                state.in_flight = Some(ReactionSnapshot {
                    reaction: state.reaction,
                    likes: state.likes,
                });
                state.reaction = next;
                state.likes += delta;

                let gateway = env.gateway.clone();
                let resource = state.resource_id;

                smallvec![Effect::Future(Box::pin(async move {
                    Some(commit(&gateway, user, resource, next, delta).await)
                }))]
            }

            ReactionAction::Committed { reaction, delta } => {
                tracing::debug!(
                    resource = ?state.resource_id,
                    ?reaction,
                    delta,
                    "reaction committed"
                );
                state.in_flight = None;
                state.last_error = None;
                smallvec![]
            }

            ReactionAction::CommitFailed { error } => {
                tracing::warn!(resource = ?state.resource_id, %error, "reaction commit failed");
                if let Some(snapshot) = state.in_flight.take() {
                    state.reaction = snapshot.reaction;
                    state.likes = snapshot.likes;
                }
                state.last_error = Some(error);
                smallvec![]
            }
        }
    }
}

/// Run the remote commit: counter first, then the per-user record.
async fn commit<G: ReactionGateway>(
    gateway: &G,
    user: crate::state::UserId,
    resource: ResourceId,
    next: Option<Reaction>,
    delta: i64,
) -> ReactionAction {
    // Read-modify-write against the REMOTE aggregate, not the local
    // optimistic value. Concurrent commits can still lose an increment;
    // that window is part of the counter contract.
    let base = match gateway.read_counter(resource).await {
        Ok(base) => base,
        Err(error) => return ReactionAction::CommitFailed { error },
    };
    if let Err(error) = gateway.write_counter(resource, base + delta).await {
        return ReactionAction::CommitFailed { error };
    }

    let record_result = match next {
        Some(reaction) => gateway.upsert_reaction(user, resource, reaction).await,
        None => gateway.delete_reaction(user, resource).await,
    };

    match record_result {
        Ok(()) => ReactionAction::Committed {
            reaction: next,
            delta,
        },
        Err(error) => {
            // Counter already moved. Try once to move it back.
            let compensated = match gateway.read_counter(resource).await {
                Ok(current) => gateway
                    .write_counter(resource, current - delta)
                    .await
                    .is_ok(),
                Err(_) => false,
            };
            if compensated {
                ReactionAction::CommitFailed { error }
            } else {
                tracing::error!(
                    ?resource,
                    delta,
                    %error,
                    "record write and compensating counter write both failed"
                );
                ReactionAction::CommitFailed {
                    error: ResourceError::PartialCommit,
                }
            }
        }
    }
}
