//! # Encore Runtime
//!
//! Runtime implementation for the Encore booking flow.
//!
//! ## Core Components
//!
//! - **Store**: Owns one session's state and applies actions atomically
//! - **`SessionRegistry`**: Maps session identifiers to independent stores
//!
//! ## Example
//!
//! ```ignore
//! use encore_runtime::Store;
//!
//! let store = Store::new(Session::new(), StepMachine::new(), environment);
//!
//! // Send an action
//! store.send(FlowAction::StartAsNewMember).await?;
//!
//! // Read state
//! let step = store.state(|s| s.step()).await;
//! ```

/// The Store runtime
pub mod store;

/// Per-session isolation for multi-user hosting
pub mod registry;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError<E> {
        /// The reducer rejected the action; state is unchanged
        #[error("Action rejected: {0}")]
        Rejected(#[source] E),

        /// The store was closed and accepts no further actions
        #[error("Store is closed")]
        Closed,
    }

    impl<E> StoreError<E> {
        /// The reducer error, if this is a rejection
        #[must_use]
        pub const fn rejection(&self) -> Option<&E> {
            match self {
                Self::Rejected(error) => Some(error),
                Self::Closed => None,
            }
        }
    }
}

pub use error::StoreError;
pub use registry::SessionRegistry;
pub use store::Store;
