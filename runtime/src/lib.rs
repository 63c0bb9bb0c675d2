//! # Optimal Runtime
//!
//! Runtime implementation for the Optimal composable architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Effect Executor**: Executes effect descriptions and feeds actions back
//!   to the reducer
//! - **Action Broadcast**: Observers can wait for actions produced by effects,
//!   enabling request-response flows over the action loop
//!
//! ## Example
//!
//! ```ignore
//! use optimal_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use futures::future::BoxFuture;
use optimal_core::{SmallVec, effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, broadcast};

pub use error::StoreError;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown
        /// initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for terminal action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before a
        /// matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        ///
        /// The action broadcast channel was closed, typically because the
        /// store is shutting down.
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

/// Shared store internals.
///
/// Held behind an `Arc` so spawned effect tasks can dispatch follow-up
/// actions after the caller's `send()` has returned.
struct StoreInner<S, A, E, R> {
    state: RwLock<S>,
    reducer: R,
    environment: E,
    shutdown: AtomicBool,
    pending_effects: AtomicUsize,
    /// Action broadcast channel for observing actions produced by effects.
    ///
    /// All actions produced by effects (e.g., from `Effect::Future`) are
    /// broadcast to observers. This enables request-response patterns on top
    /// of the action feedback loop.
    action_broadcast: broadcast::Sender<A>,
}

/// The Store - runtime for a reducer-based feature
///
/// The Store manages:
/// 1. State (behind `RwLock` for concurrent access)
/// 2. Reducer (business logic)
/// 3. Environment (injected dependencies)
/// 4. Effect execution (with feedback loop)
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
///
/// # Concurrency and Effect Execution
///
/// - The reducer executes synchronously while holding a write lock
/// - Effects execute asynchronously in spawned tasks
/// - `send()` returns after starting effect execution, not completion
/// - Multiple concurrent `send()` calls serialize at the reducer level
/// - Effects may complete in non-deterministic order
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    inner: Arc<StoreInner<S, A, E, R>>,
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    ///
    /// The action broadcast capacity defaults to 16; use
    /// [`Store::with_broadcast_capacity`] when observers frequently lag.
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_broadcast_capacity(initial_state, reducer, environment, 16)
    }

    /// Create a new Store with custom action broadcast capacity
    ///
    /// # Arguments
    ///
    /// - `initial_state`: The starting state for the store
    /// - `reducer`: The reducer implementation (business logic)
    /// - `environment`: Injected dependencies
    /// - `capacity`: Action broadcast channel capacity
    #[must_use]
    pub fn with_broadcast_capacity(
        initial_state: S,
        reducer: R,
        environment: E,
        capacity: usize,
    ) -> Self {
        let (action_broadcast, _) = broadcast::channel(capacity);

        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(initial_state),
                reducer,
                environment,
                shutdown: AtomicBool::new(false),
                pending_effects: AtomicUsize::new(0),
                action_broadcast,
            }),
        }
    }

    /// Send an action to the store
    ///
    /// This is the primary way to interact with the store:
    /// 1. Acquires write lock on state
    /// 2. Calls reducer with (state, action, environment)
    /// 3. Executes returned effects asynchronously
    /// 4. Effects may produce more actions (feedback loop)
    ///
    /// `send()` returns after starting effect execution, not completion. Use
    /// [`Store::send_and_wait_for`] to wait for a terminal action, or
    /// [`Store::settled`] to wait for all pending effects.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting
    /// down.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> Result<(), StoreError> {
        if self.inner.shutdown.load(Ordering::Acquire) {
            return Err(StoreError::ShutdownInProgress);
        }

        let effects = {
            let mut state = self.inner.state.write().await;
            self.inner
                .reducer
                .reduce(&mut state, action, &self.inner.environment)
        };

        spawn_effects(&self.inner, effects);
        Ok(())
    }

    /// Send an action and wait for a matching result action
    ///
    /// This method is designed for request-response patterns. It subscribes
    /// to the action broadcast BEFORE sending (avoiding a race with fast
    /// effects), sends the initial action, then waits for an action matching
    /// the predicate.
    ///
    /// # Arguments
    ///
    /// - `action`: The initial action to send
    /// - `predicate`: Function to test if an action is the terminal result
    /// - `timeout`: Maximum time to wait for matching action
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`]: Timeout expired before matching action
    /// - [`StoreError::ChannelClosed`]: Action broadcast channel closed
    /// - [`StoreError::ShutdownInProgress`]: Store is shutting down
    pub async fn send_and_wait_for<P>(
        &self,
        action: A,
        predicate: P,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        P: Fn(&A) -> bool,
    {
        let mut receiver = self.inner.action_broadcast.subscribe();
        self.send(action).await?;

        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Err(StoreError::Timeout);
            }

            match tokio::time::timeout(remaining, receiver.recv()).await {
                Err(_) => return Err(StoreError::Timeout),
                Ok(Err(broadcast::error::RecvError::Closed)) => {
                    return Err(StoreError::ChannelClosed);
                },
                Ok(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                    tracing::warn!(skipped, "Action observer lagged behind broadcast");
                },
                Ok(Ok(observed)) => {
                    if predicate(&observed) {
                        return Ok(observed);
                    }
                },
            }
        }
    }

    /// Subscribe to actions produced by effects
    ///
    /// Returns a broadcast receiver observing every action fed back into the
    /// reducer by effect execution.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<A> {
        self.inner.action_broadcast.subscribe()
    }

    /// Read state through a closure
    ///
    /// Holds the read lock only for the duration of the closure.
    pub async fn state<F, T>(&self, read: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let guard = self.inner.state.read().await;
        read(&guard)
    }

    /// Number of effects currently executing
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.inner.pending_effects.load(Ordering::Acquire)
    }

    /// Wait until all pending effects have completed
    ///
    /// Polls the pending-effect counter. Intended for tests and demo
    /// drivers; production flows should prefer `send_and_wait_for`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if effects are still running when the
    /// timeout elapses.
    pub async fn settled(&self, timeout: Duration) -> Result<(), StoreError> {
        let start = tokio::time::Instant::now();
        let poll_interval = Duration::from_millis(10);

        while self.pending_effects() > 0 {
            if start.elapsed() >= timeout {
                return Err(StoreError::Timeout);
            }
            tokio::time::sleep(poll_interval).await;
        }
        Ok(())
    }

    /// Initiate graceful shutdown of the store
    ///
    /// This method:
    /// 1. Sets the shutdown flag (rejecting new actions)
    /// 2. Waits for pending effects to complete (with timeout)
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before
    /// all pending effects complete.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        tracing::info!("Initiating graceful shutdown");
        self.inner.shutdown.store(true, Ordering::Release);

        let start = tokio::time::Instant::now();
        let poll_interval = Duration::from_millis(100);

        loop {
            let pending = self.inner.pending_effects.load(Ordering::Acquire);

            if pending == 0 {
                tracing::info!("All effects completed, shutdown successful");
                return Ok(());
            }

            if start.elapsed() >= timeout {
                tracing::error!(
                    pending_effects = pending,
                    "Shutdown timeout with effects still running"
                );
                return Err(StoreError::ShutdownTimeout(pending));
            }

            tracing::debug!(
                pending_effects = pending,
                elapsed_ms = start.elapsed().as_millis(),
                "Waiting for effects to complete"
            );
            tokio::time::sleep(poll_interval).await;
        }
    }
}

/// Spawn one task per top-level effect, tracking the pending count.
fn spawn_effects<S, A, E, R>(
    inner: &Arc<StoreInner<S, A, E, R>>,
    effects: SmallVec<[Effect<A>; 4]>,
) where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    for effect in effects {
        if matches!(effect, Effect::None) {
            continue;
        }

        inner.pending_effects.fetch_add(1, Ordering::AcqRel);
        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            execute_effect(&inner, effect).await;
            inner.pending_effects.fetch_sub(1, Ordering::AcqRel);
        });
    }
}

/// Execute a single effect, recursing through composite variants.
///
/// Boxed because `Parallel`/`Sequential` recurse through an async fn.
fn execute_effect<'a, S, A, E, R>(
    inner: &'a Arc<StoreInner<S, A, E, R>>,
    effect: Effect<A>,
) -> BoxFuture<'a, ()>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    Box::pin(async move {
        match effect {
            Effect::None => {},
            Effect::Parallel(effects) => {
                let mut handles = Vec::with_capacity(effects.len());
                for nested in effects {
                    let inner = Arc::clone(inner);
                    handles.push(tokio::spawn(async move {
                        execute_effect(&inner, nested).await;
                    }));
                }
                for handle in handles {
                    if let Err(join_error) = handle.await {
                        tracing::error!(%join_error, "Parallel effect task failed");
                    }
                }
            },
            Effect::Sequential(effects) => {
                for nested in effects {
                    execute_effect(inner, nested).await;
                }
            },
            Effect::Delay { duration, action } => {
                tokio::time::sleep(duration).await;
                dispatch(inner, *action).await;
            },
            Effect::Future(future) => {
                if let Some(action) = future.await {
                    dispatch(inner, action).await;
                }
            },
        }
    })
}

/// Feed an effect-produced action back into the reducer.
///
/// The action is reduced before it is broadcast, so an observer woken by an
/// action always sees the state that action produced. Any effects the
/// reduction yields are executed inline so the parent task's pending count
/// covers them.
async fn dispatch<S, A, E, R>(inner: &Arc<StoreInner<S, A, E, R>>, action: A)
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    let effects = {
        let mut state = inner.state.write().await;
        inner
            .reducer
            .reduce(&mut state, action.clone(), &inner.environment)
    };

    // Broadcast errors only mean there are no observers right now.
    let _ = inner.action_broadcast.send(action);

    for effect in effects {
        execute_effect(inner, effect).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use optimal_core::smallvec;

    #[derive(Clone, Debug, Default)]
    struct CounterState {
        value: i64,
        confirmations: u32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum CounterAction {
        Add(i64),
        AddConfirmed(i64),
    }

    struct CounterReducer;

    impl Reducer for CounterReducer {
        type State = CounterState;
        type Action = CounterAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut CounterState,
            action: CounterAction,
            (): &(),
        ) -> SmallVec<[Effect<CounterAction>; 4]> {
            match action {
                CounterAction::Add(amount) => {
                    state.value += amount;
                    smallvec![Effect::future(async move {
                        Some(CounterAction::AddConfirmed(amount))
                    })]
                },
                CounterAction::AddConfirmed(_) => {
                    state.confirmations += 1;
                    SmallVec::new()
                },
            }
        }
    }

    fn store() -> Store<CounterState, CounterAction, (), CounterReducer> {
        Store::new(CounterState::default(), CounterReducer, ())
    }

    #[tokio::test]
    async fn send_updates_state() {
        let store = store();
        store.send(CounterAction::Add(3)).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 3);
    }

    #[tokio::test]
    async fn effects_feed_actions_back() {
        let store = store();
        let observed = store
            .send_and_wait_for(
                CounterAction::Add(1),
                |a| matches!(a, CounterAction::AddConfirmed(_)),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        assert_eq!(observed, CounterAction::AddConfirmed(1));
        assert_eq!(store.state(|s| s.confirmations).await, 1);
    }

    #[tokio::test]
    async fn settled_waits_for_effects() {
        let store = store();
        store.send(CounterAction::Add(1)).await.unwrap();
        store.settled(Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.pending_effects(), 0);
        assert_eq!(store.state(|s| s.confirmations).await, 1);
    }

    #[tokio::test]
    async fn shutdown_rejects_new_actions() {
        let store = store();
        store.shutdown(Duration::from_secs(1)).await.unwrap();
        assert!(matches!(
            store.send(CounterAction::Add(1)).await,
            Err(StoreError::ShutdownInProgress)
        ));
    }

    #[tokio::test]
    async fn wait_for_times_out_without_match() {
        let store = store();
        let result = store
            .send_and_wait_for(
                CounterAction::Add(1),
                |a| matches!(a, CounterAction::Add(99)),
                Duration::from_millis(50),
            )
            .await;
        assert!(matches!(result, Err(StoreError::Timeout)));
    }
}
