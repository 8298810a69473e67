use crate::store::Store;
use encore_core::event::Event;
use encore_core::reducer::Reducer;
use std::collections::HashMap;
use std::hash::Hash;
use tokio::sync::RwLock;

/// Maps session identifiers to independent stores.
///
/// Each session gets its own [`Store`] and therefore its own lock; actions on
/// one session never wait on, or observe, another. Sessions share only what
/// the environment shares (typically read-only reference data).
pub struct SessionRegistry<K, S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    sessions: RwLock<HashMap<K, Store<S, A, E, R>>>,
    reducer: R,
    environment: E,
}

impl<K, S, A, E, R> SessionRegistry<K, S, A, E, R>
where
    K: Eq + Hash + Clone + std::fmt::Display,
    R: Reducer<State = S, Action = A, Environment = E> + Clone,
    R::Event: Event + Clone + std::fmt::Debug,
    R::Error: std::fmt::Display,
    S: Clone + Default,
    E: Clone,
{
    /// Create an empty registry whose sessions use `reducer` and `environment`
    #[must_use]
    pub fn new(reducer: R, environment: E) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            reducer,
            environment,
        }
    }

    /// Return the store for `id`, creating a fresh session if none exists
    pub async fn open(&self, id: K) -> Store<S, A, E, R> {
        if let Some(store) = self.sessions.read().await.get(&id) {
            return store.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id)
            .or_insert_with_key(|id| {
                tracing::info!(session = %id, "Session opened");
                Store::new(
                    S::default(),
                    self.reducer.clone(),
                    self.environment.clone(),
                )
            })
            .clone()
    }

    /// Return the store for `id` if the session exists
    pub async fn get(&self, id: &K) -> Option<Store<S, A, E, R>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Remove and close the session for `id`
    ///
    /// Outstanding handles to the removed store reject further actions.
    /// Returns `false` if no such session existed.
    pub async fn close(&self, id: &K) -> bool {
        let removed = self.sessions.write().await.remove(id);
        match removed {
            Some(store) => {
                store.close();
                tracing::info!(session = %id, "Session closed");
                true
            },
            None => false,
        }
    }

    /// Number of open sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are open
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
