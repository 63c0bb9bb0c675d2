//! Reaction engine walkthrough.
//!
//! Seeds an in-memory platform with one resource, signs a user in, and runs
//! the full like/dislike journey through the store, printing the label the
//! UI would render at each step.
//!
//! ```bash
//! cargo run -p optimal-feed-demo
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use optimal_resources::mocks::{MemoryPlatform, StaticIdentity};
use optimal_resources::reducers::reaction::ReactionEnvironment;
use optimal_resources::{
    Reaction, ReactionAction, ReactionPanel, ReactionReducer, UserId, likes_label,
};
use optimal_runtime::Store;

const TIMEOUT: Duration = Duration::from_secs(2);

fn commit_resolved(action: &ReactionAction) -> bool {
    matches!(
        action,
        ReactionAction::Committed { .. } | ReactionAction::CommitFailed { .. }
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let platform = MemoryPlatform::new();
    let resource = platform
        .seed_resource("Rust for Rustaceans", &["rust"], 3)
        .await;
    let user = UserId::new();

    let store = Store::new(
        ReactionPanel::new(resource),
        ReactionReducer::new(),
        ReactionEnvironment {
            gateway: platform.clone(),
            identity: StaticIdentity::signed_in(user),
        },
    );

    store
        .send_and_wait_for(
            ReactionAction::Load,
            |a| matches!(a, ReactionAction::Loaded { .. }),
            TIMEOUT,
        )
        .await
        .context("initial load")?;
    let label = store.state(|p| likes_label(p.likes)).await;
    tracing::info!(%label, "panel loaded");

    for (step, requested) in [
        ("press like", Reaction::Liked),
        ("switch to dislike", Reaction::Disliked),
        ("press dislike again", Reaction::Disliked),
    ] {
        let outcome = store
            .send_and_wait_for(
                ReactionAction::Press { requested },
                commit_resolved,
                TIMEOUT,
            )
            .await
            .context(step)?;
        let label = store.state(|p| likes_label(p.likes)).await;
        tracing::info!(step, ?outcome, %label, "commit resolved");
    }

    let stored = platform.stored_reaction(user, resource).await;
    let counter = platform.counter(resource).await;
    tracing::info!(?stored, counter, "back to neutral, counter restored");

    store.shutdown(TIMEOUT).await.context("shutdown")?;
    Ok(())
}
