//! Event trait and related types.
//!
//! Events are facts about actions the reducer accepted. They are observed by
//! renderers and loggers and are never fed back into the reducer.
//!
//! # Example
//!
//! ```
//! use encore_core::event::Event;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Clone, Debug, Serialize, Deserialize)]
//! enum SeatEvent {
//!     SeatHeld { seat: String },
//!     SeatReleased { seat: String },
//! }
//!
//! impl Event for SeatEvent {
//!     fn event_type(&self) -> &'static str {
//!         match self {
//!             SeatEvent::SeatHeld { .. } => "SeatHeld.v1",
//!             SeatEvent::SeatReleased { .. } => "SeatReleased.v1",
//!         }
//!     }
//! }
//! ```

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Error types for event operations.
#[derive(Error, Debug)]
pub enum EventError {
    /// Failed to serialize event.
    #[error("Failed to serialize event: {0}")]
    SerializationError(String),
}

/// A fact emitted by a reducer.
///
/// # Event Naming Convention
///
/// The `event_type()` method should return a stable string identifier that includes
/// a version number, e.g. `"ShowBooked.v1"`.
///
/// # Thread Safety
///
/// Events must be `Send + Sync + 'static` so the runtime can broadcast them
/// to observers on other tasks.
pub trait Event: Send + Sync + 'static {
    /// Returns the event type identifier for this event.
    fn event_type(&self) -> &'static str;

    /// Serialize this event to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `EventError::SerializationError` if the event cannot be serialized.
    fn to_json(&self) -> Result<serde_json::Value, EventError>
    where
        Self: Serialize,
    {
        serde_json::to_value(self).map_err(|e| EventError::SerializationError(e.to_string()))
    }
}

/// An event paired with its type name, ready for logging or transport.
#[derive(Clone, Debug)]
pub struct EventRecord {
    /// The event type identifier (e.g., "ShowBooked.v1").
    pub event_type: &'static str,

    /// The JSON-encoded event.
    pub payload: serde_json::Value,
}

impl EventRecord {
    /// Create a record from an `Event`.
    ///
    /// # Errors
    ///
    /// Returns `EventError::SerializationError` if the event cannot be serialized.
    pub fn from_event<E: Event + Serialize>(event: &E) -> Result<Self, EventError> {
        Ok(Self {
            event_type: event.event_type(),
            payload: event.to_json()?,
        })
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.event_type, self.payload)
    }
}
