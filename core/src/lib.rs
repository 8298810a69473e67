//! # Encore Core
//!
//! Core traits and types for the Encore booking flow.
//!
//! The flow is modelled as a reducer: every user action is validated against
//! the current state and either applied as a unit or rejected with an error.
//!
//! ## Core Concepts
//!
//! - **State**: The per-user session record
//! - **Action**: A discrete user-triggered input (button press, form submit)
//! - **Reducer**: `(State, Action, Environment) → Result<Events, Error>`
//! - **Event**: A fact describing what an accepted action changed
//! - **Environment**: Injected dependencies via traits (catalog, clock)
//!
//! ## Example
//!
//! ```ignore
//! use encore_core::*;
//!
//! impl Reducer for StepMachine {
//!     type State = Session;
//!     type Action = FlowAction;
//!     type Event = FlowEvent;
//!     type Error = FlowError;
//!     type Environment = FlowEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut Session,
//!         action: FlowAction,
//!         env: &FlowEnvironment,
//!     ) -> Result<SmallVec<[FlowEvent; 4]>, FlowError> {
//!         // Validate, then mutate
//!         Ok(SmallVec::new())
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Event trait and serialization helpers
pub mod event;

/// Reducer module - The core trait for business logic
///
/// Reducers are functions `(State, Action, Environment) → Result<Events, Error>`.
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::SmallVec;

    /// Events returned from a single reduction.
    ///
    /// Most actions produce one or two facts, so these stay inline.
    pub type Events<E> = SmallVec<[E; 4]>;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Event`: Facts emitted when an action is accepted
    /// - `Error`: Why an action was rejected
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Contract
    ///
    /// A reducer must validate before it mutates. When `reduce` returns
    /// `Err`, `state` is left exactly as it was passed in.
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The event type emitted for accepted actions
        type Event;

        /// The error type for rejected actions
        type Error;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and events
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Errors
        ///
        /// Returns `Self::Error` if the action is not valid for the current
        /// state. The state is not modified in that case.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> Result<Events<Self::Event>, Self::Error>;
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use encore_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let before = clock.now();
    /// assert!(clock.now() >= before);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
