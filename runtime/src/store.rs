use crate::error::StoreError;
use encore_core::event::Event;
use encore_core::reducer::{Events, Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{RwLock, broadcast};

/// Default number of events buffered for slow observers.
const DEFAULT_BROADCAST_CAPACITY: usize = 16;

/// The Store - runtime coordinator for one session
///
/// The Store manages:
/// 1. State (behind `RwLock` for concurrent access)
/// 2. Reducer (business logic)
/// 3. Environment (injected dependencies)
/// 4. Event broadcast to observers
///
/// Cloning a Store yields another handle to the same state.
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
///
/// # Example
///
/// ```ignore
/// let store = Store::new(Session::new(), StepMachine::new(), environment);
///
/// store.send(FlowAction::StartAsNewMember).await?;
/// assert_eq!(store.state(|s| s.step()).await, Step::Membership);
/// ```
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: Arc<R>,
    environment: Arc<E>,
    closed: Arc<AtomicBool>,
    event_broadcast: broadcast::Sender<R::Event>,
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: Arc::clone(&self.reducer),
            environment: Arc::clone(&self.environment),
            closed: Arc::clone(&self.closed),
            event_broadcast: self.event_broadcast.clone(),
        }
    }
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
    R::Event: Event + Clone + std::fmt::Debug,
    R::Error: std::fmt::Display,
    S: Clone,
{
    /// Create a new store with initial state, reducer, and environment
    ///
    /// The event broadcast buffers 16 events; use
    /// [`Store::with_broadcast_capacity`] for observers that lag further.
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_broadcast_capacity(
            initial_state,
            reducer,
            environment,
            DEFAULT_BROADCAST_CAPACITY,
        )
    }

    /// Create a new Store with custom event broadcast capacity
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero (tokio broadcast channel requirement).
    #[must_use]
    pub fn with_broadcast_capacity(
        initial_state: S,
        reducer: R,
        environment: E,
        capacity: usize,
    ) -> Self {
        let (event_broadcast, _) = broadcast::channel(capacity);

        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer: Arc::new(reducer),
            environment: Arc::new(environment),
            closed: Arc::new(AtomicBool::new(false)),
            event_broadcast,
        }
    }

    /// Send an action to the store
    ///
    /// 1. Acquires the write lock on state
    /// 2. Runs the reducer against a copy of the state
    /// 3. Commits the copy only if the reducer accepted the action
    /// 4. Broadcasts the emitted events
    ///
    /// Concurrent `send()` calls serialize on the write lock, and readers
    /// never observe a half-applied action.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Closed`] if the store was closed
    /// - [`StoreError::Rejected`] if the reducer rejected the action
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> Result<Events<R::Event>, StoreError<R::Error>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }

        let mut guard = self.state.write().await;
        // Closed while waiting for the lock
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        let mut next = guard.clone();

        match self.reducer.reduce(&mut next, action, &self.environment) {
            Ok(events) => {
                *guard = next;
                drop(guard);

                metrics::counter!("store.actions.applied").increment(1);

                for event in &events {
                    tracing::debug!(event_type = event.event_type(), "Event emitted");
                    // No subscribers is fine
                    let _ = self.event_broadcast.send(event.clone());
                }

                Ok(events)
            },
            Err(error) => {
                metrics::counter!("store.actions.rejected").increment(1);
                tracing::warn!(%error, "Action rejected");
                Err(StoreError::Rejected(error))
            },
        }
    }

    /// Read current state via a closure
    ///
    /// ```ignore
    /// let bookings = store.state(|s| s.booked_shows().len()).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&*state)
    }

    /// Subscribe to events emitted by accepted actions
    ///
    /// Only events sent after subscribing are received.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<R::Event> {
        self.event_broadcast.subscribe()
    }

    /// Access the injected environment
    #[must_use]
    pub fn environment(&self) -> &E {
        &self.environment
    }

    /// Stop accepting actions
    ///
    /// State stays readable after closing.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::info!("Store closed");
        }
    }

    /// Whether [`Store::close`] has been called on any handle
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
