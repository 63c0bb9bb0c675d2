//! End-to-end reaction flows through the runtime store.

use std::time::Duration;

use optimal_resources::mocks::{MemoryPlatform, StaticIdentity};
use optimal_resources::reducers::reaction::ReactionEnvironment;
use optimal_resources::{
    Reaction, ReactionAction, ReactionPanel, ReactionReducer, ResourceError, UserId, likes_label,
};
use optimal_runtime::Store;

const COMMIT_TIMEOUT: Duration = Duration::from_secs(1);

type PanelStore = Store<
    ReactionPanel,
    ReactionAction,
    ReactionEnvironment<MemoryPlatform, StaticIdentity>,
    ReactionReducer<MemoryPlatform, StaticIdentity>,
>;

fn commit_resolved(action: &ReactionAction) -> bool {
    matches!(
        action,
        ReactionAction::Committed { .. } | ReactionAction::CommitFailed { .. }
    )
}

fn panel_store(platform: &MemoryPlatform, identity: StaticIdentity, panel: ReactionPanel) -> PanelStore {
    Store::new(
        panel,
        ReactionReducer::new(),
        ReactionEnvironment {
            gateway: platform.clone(),
            identity,
        },
    )
}

#[allow(clippy::unwrap_used)]
async fn press(store: &PanelStore, requested: Reaction) -> ReactionAction {
    store
        .send_and_wait_for(
            ReactionAction::Press { requested },
            commit_resolved,
            COMMIT_TIMEOUT,
        )
        .await
        .unwrap()
}

#[tokio::test]
#[allow(clippy::expect_used)]
async fn full_reaction_journey() {
    let platform = MemoryPlatform::new();
    let resource = platform
        .seed_resource("Rust for Rustaceans", &["rust"], 3)
        .await;
    let user = UserId::new();
    let store = panel_store(
        &platform,
        StaticIdentity::signed_in(user),
        ReactionPanel::new(resource),
    );

    store
        .send_and_wait_for(
            ReactionAction::Load,
            |a| matches!(a, ReactionAction::Loaded { .. }),
            COMMIT_TIMEOUT,
        )
        .await
        .expect("load resolves");

    assert_eq!(store.state(|p| p.likes).await, 3);
    assert_eq!(store.state(|p| likes_label(p.likes)).await, "3");

    // Like: 3 -> 4, row upserted
    let outcome = press(&store, Reaction::Liked).await;
    assert!(matches!(outcome, ReactionAction::Committed { delta: 1, .. }));
    assert_eq!(store.state(|p| p.likes).await, 4);
    assert_eq!(platform.counter(resource).await, 4);
    assert_eq!(
        platform.stored_reaction(user, resource).await,
        Some(Reaction::Liked)
    );

    // Switch to dislike: 4 -> 2, single atomic double swing
    let outcome = press(&store, Reaction::Disliked).await;
    assert!(matches!(outcome, ReactionAction::Committed { delta: -2, .. }));
    assert_eq!(platform.counter(resource).await, 2);
    assert_eq!(
        platform.stored_reaction(user, resource).await,
        Some(Reaction::Disliked)
    );

    // Press dislike again: back to neutral, 2 -> 3, row deleted
    let outcome = press(&store, Reaction::Disliked).await;
    assert!(matches!(outcome, ReactionAction::Committed { delta: 1, .. }));
    assert_eq!(platform.counter(resource).await, 3);
    assert_eq!(platform.stored_reaction(user, resource).await, None);
    assert_eq!(store.state(|p| p.reaction).await, None);
    assert_eq!(store.state(|p| p.likes).await, 3);
}

#[tokio::test]
#[allow(clippy::expect_used)]
async fn rollback_restores_the_exact_prior_counter() {
    let platform = MemoryPlatform::new();
    let resource = platform
        .seed_resource("Zero To Production In Rust", &["rust"], 5)
        .await;
    let user = UserId::new();
    let store = panel_store(
        &platform,
        StaticIdentity::signed_in(user),
        ReactionPanel::new(resource),
    );

    store
        .send_and_wait_for(
            ReactionAction::Load,
            |a| matches!(a, ReactionAction::Loaded { .. }),
            COMMIT_TIMEOUT,
        )
        .await
        .expect("load resolves");

    platform.fail_counter_writes(true);

    let outcome = press(&store, Reaction::Liked).await;
    assert!(matches!(outcome, ReactionAction::CommitFailed { .. }));

    // Optimistic bump rolled back, remote untouched
    assert_eq!(store.state(|p| p.likes).await, 5);
    assert_eq!(store.state(|p| p.reaction).await, None);
    assert_eq!(platform.counter(resource).await, 5);
    assert!(
        store
            .state(|p| matches!(p.last_error, Some(ResourceError::Persistence(_))))
            .await
    );

    // Platform recovers; the same press now commits cleanly
    platform.fail_counter_writes(false);
    let outcome = press(&store, Reaction::Liked).await;
    assert!(matches!(outcome, ReactionAction::Committed { delta: 1, .. }));
    assert_eq!(platform.counter(resource).await, 6);
    assert!(store.state(|p| p.last_error.is_none()).await);
}

#[tokio::test]
#[allow(clippy::expect_used)]
async fn zero_counter_renders_as_the_word_like() {
    let platform = MemoryPlatform::new();
    let resource = platform.seed_resource("Brand New", &["rust"], 0).await;
    let user = UserId::new();
    let store = panel_store(
        &platform,
        StaticIdentity::signed_in(user),
        ReactionPanel::new(resource),
    );

    store
        .send_and_wait_for(
            ReactionAction::Load,
            |a| matches!(a, ReactionAction::Loaded { .. }),
            COMMIT_TIMEOUT,
        )
        .await
        .expect("load resolves");
    assert_eq!(store.state(|p| likes_label(p.likes)).await, "Like");

    // A lone dislike takes the counter negative, and the number shows
    let outcome = press(&store, Reaction::Disliked).await;
    assert!(matches!(outcome, ReactionAction::Committed { delta: -1, .. }));
    assert_eq!(store.state(|p| likes_label(p.likes)).await, "-1");
    assert_eq!(platform.counter(resource).await, -1);
}
