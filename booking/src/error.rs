//! Errors raised at the step machine boundary.
//!
//! A renderer that only submits the actions a screen offers never sees these;
//! they exist so contract violations surface instead of being ignored.

use crate::action::ActionKind;
use crate::types::Step;
use thiserror::Error;

/// Why the step machine refused an action
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// The action is not valid on the current step, or its precondition
    /// does not hold (e.g. viewing event details with nothing booked)
    #[error("Action '{action}' is not valid on step '{step}'")]
    InvalidTransition {
        /// Step the session was on
        step: Step,
        /// Action that was attempted
        action: ActionKind,
    },

    /// The action names something the catalog does not contain, or lacks
    /// data the step requires
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// A step identifier outside the known set
    #[error("Unknown step: {0}")]
    UnknownStep(String),

    /// A session whose fields contradict each other
    #[error("Corrupt session: {0}")]
    CorruptSession(String),
}
