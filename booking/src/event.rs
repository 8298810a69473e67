//! Facts emitted by accepted actions.

use crate::types::{Booking, PerkSelection, ShowFilter, Step};
use encore_core::event::Event;
use serde::{Deserialize, Serialize};

/// What an accepted action changed
///
/// Domain facts come first; `StepChanged` is last and only present when the
/// step actually moved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowEvent {
    /// The session moved to another screen
    StepChanged {
        /// Previous step
        from: Step,
        /// New step
        to: Step,
    },
    /// A membership plan was chosen
    MembershipSelected {
        /// Plan name
        plan: String,
        /// Shows included with the plan
        shows_allowed: u32,
    },
    /// The home theater was set
    HomeTheaterConfirmed {
        /// Theater name
        theater: String,
    },
    /// The discovery filter was chosen
    ShowsFiltered {
        /// Active filter
        filter: ShowFilter,
    },
    /// A show was appended to the member's bookings
    ShowBooked {
        /// The new booking
        booking: Booking,
    },
    /// The perk selection was replaced
    PerksUpdated {
        /// New selection
        perks: PerkSelection,
    },
    /// The session was discarded and started over
    SessionReset,
}

impl Event for FlowEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::StepChanged { .. } => "StepChanged.v1",
            Self::MembershipSelected { .. } => "MembershipSelected.v1",
            Self::HomeTheaterConfirmed { .. } => "HomeTheaterConfirmed.v1",
            Self::ShowsFiltered { .. } => "ShowsFiltered.v1",
            Self::ShowBooked { .. } => "ShowBooked.v1",
            Self::PerksUpdated { .. } => "PerksUpdated.v1",
            Self::SessionReset => "SessionReset.v1",
        }
    }
}
