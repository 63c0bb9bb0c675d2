//! Reaction persistence gateway.

use std::future::Future;

use crate::error::Result;
use crate::reaction::Reaction;
use crate::state::{ResourceId, UserId};

/// Persistence operations backing the reaction engine.
///
/// The counter methods expose a deliberate read-modify-write contract:
/// [`read_counter`](Self::read_counter) returns the current aggregate and
/// [`write_counter`](Self::write_counter) overwrites it with a caller-computed
/// absolute value. Two users reacting to the same resource in the same
/// instant can therefore lose one increment. That window is accepted; an
/// atomic in-database increment is a valid stronger implementation but not
/// required of the backend.
///
/// Reaction rows live in a per-user relation keyed by
/// `(user, resource, kind)`. A neutral stance is the absence of a row, never
/// a stored "none" value.
pub trait ReactionGateway: Send + Sync {
    /// Read the caller's stored vote on a resource, if any.
    fn read_reaction(
        &self,
        user: UserId,
        resource: ResourceId,
    ) -> impl Future<Output = Result<Option<Reaction>>> + Send;

    /// Insert or update the caller's vote on a resource.
    fn upsert_reaction(
        &self,
        user: UserId,
        resource: ResourceId,
        reaction: Reaction,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Remove the caller's vote on a resource.
    ///
    /// Deleting an absent row is not an error.
    fn delete_reaction(
        &self,
        user: UserId,
        resource: ResourceId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Read a resource's aggregate counter.
    fn read_counter(&self, resource: ResourceId) -> impl Future<Output = Result<i64>> + Send;

    /// Overwrite a resource's aggregate counter with an absolute value.
    fn write_counter(
        &self,
        resource: ResourceId,
        likes: i64,
    ) -> impl Future<Output = Result<()>> + Send;
}
