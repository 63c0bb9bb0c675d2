//! Store behavior through the public API only.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use optimal_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use optimal_runtime::Store;

#[derive(Clone, Debug, Default)]
struct PipelineState {
    seen: Vec<u8>,
    done: bool,
}

#[derive(Clone, Debug, PartialEq)]
enum PipelineAction {
    Run,
    RunParallel,
    RunLater,
    Stage(u8),
    Finished,
}

struct PipelineReducer;

impl Reducer for PipelineReducer {
    type State = PipelineState;
    type Action = PipelineAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut PipelineState,
        action: PipelineAction,
        (): &(),
    ) -> SmallVec<[Effect<PipelineAction>; 4]> {
        match action {
            PipelineAction::Run => smallvec![Effect::chain(vec![
                Effect::future(async { Some(PipelineAction::Stage(1)) }),
                Effect::future(async { Some(PipelineAction::Stage(2)) }),
                Effect::future(async { Some(PipelineAction::Finished) }),
            ])],
            PipelineAction::RunParallel => smallvec![Effect::merge(vec![
                Effect::future(async { Some(PipelineAction::Stage(1)) }),
                Effect::future(async { Some(PipelineAction::Stage(2)) }),
            ])],
            PipelineAction::RunLater => smallvec![Effect::Delay {
                duration: Duration::from_millis(10),
                action: Box::new(PipelineAction::Stage(9)),
            }],
            PipelineAction::Stage(n) => {
                state.seen.push(n);
                SmallVec::new()
            },
            PipelineAction::Finished => {
                state.done = true;
                SmallVec::new()
            },
        }
    }
}

fn store() -> Store<PipelineState, PipelineAction, (), PipelineReducer> {
    Store::new(PipelineState::default(), PipelineReducer, ())
}

#[tokio::test]
async fn sequential_effects_dispatch_in_order() {
    let store = store();
    store
        .send_and_wait_for(
            PipelineAction::Run,
            |a| matches!(a, PipelineAction::Finished),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    let seen = store.state(|s| s.seen.clone()).await;
    assert_eq!(seen, vec![1, 2]);
    assert!(store.state(|s| s.done).await);
}

#[tokio::test]
async fn parallel_effects_all_complete() {
    let store = store();
    store.send(PipelineAction::RunParallel).await.unwrap();
    store.settled(Duration::from_secs(1)).await.unwrap();

    let mut seen = store.state(|s| s.seen.clone()).await;
    seen.sort_unstable();
    assert_eq!(seen, vec![1, 2]);
}

#[tokio::test]
async fn delayed_actions_arrive_after_the_delay() {
    let store = store();
    store.send(PipelineAction::RunLater).await.unwrap();
    assert!(store.state(|s| s.seen.is_empty()).await);

    store.settled(Duration::from_secs(1)).await.unwrap();
    assert_eq!(store.state(|s| s.seen.clone()).await, vec![9]);
}

#[tokio::test]
async fn observers_see_state_already_updated() {
    let store = store();
    let observed = store
        .send_and_wait_for(
            PipelineAction::Run,
            |a| matches!(a, PipelineAction::Stage(1)),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(observed, PipelineAction::Stage(1));
    // The reduction for Stage(1) happened before the broadcast
    assert!(store.state(|s| s.seen.contains(&1)).await);
}
