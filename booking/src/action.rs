//! The action vocabulary and the transition table.

use crate::types::{PerkSelection, ShowFilter, Step};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A discrete user action, with its payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowAction {
    /// Welcome: "New User"
    StartAsNewMember,
    /// Welcome: "Existing User"
    ContinueAsExistingMember,
    /// Membership: choose a plan
    SelectPlan {
        /// Plan name from the catalog
        plan: String,
    },
    /// Theater selection: confirm the home theater
    ConfirmHomeTheater {
        /// Theater name from the catalog
        theater: String,
    },
    /// Dashboard: open the event home for the selected show
    ViewEventDetails,
    /// Dashboard: browse shows
    FindShows {
        /// Home theater or other theaters
        filter: ShowFilter,
    },
    /// Dashboard: discard the session and start over
    ResetSession,
    /// Discovery: book a listed show
    BookShow {
        /// Show title
        title: String,
        /// Theater tag as listed; `None` for home-theater listings
        theater: Option<String>,
    },
    /// Discovery: return to the dashboard
    BackToDashboard,
    /// Perk selection: confirm the booking with these perks
    ConfirmPerks {
        /// Chosen perks
        perks: PerkSelection,
    },
    /// Booking confirmation: continue to the event home
    GoToEventHome,
    /// Event home: replace the perk selection
    UpdatePerks {
        /// New perks
        perks: PerkSelection,
    },
    /// Event home: return to the dashboard
    GoToAccount,
}

impl FlowAction {
    /// The payload-free identity of this action
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::StartAsNewMember => ActionKind::StartAsNewMember,
            Self::ContinueAsExistingMember => ActionKind::ContinueAsExistingMember,
            Self::SelectPlan { .. } => ActionKind::SelectPlan,
            Self::ConfirmHomeTheater { .. } => ActionKind::ConfirmHomeTheater,
            Self::ViewEventDetails => ActionKind::ViewEventDetails,
            Self::FindShows { .. } => ActionKind::FindShows,
            Self::ResetSession => ActionKind::ResetSession,
            Self::BookShow { .. } => ActionKind::BookShow,
            Self::BackToDashboard => ActionKind::BackToDashboard,
            Self::ConfirmPerks { .. } => ActionKind::ConfirmPerks,
            Self::GoToEventHome => ActionKind::GoToEventHome,
            Self::UpdatePerks { .. } => ActionKind::UpdatePerks,
            Self::GoToAccount => ActionKind::GoToAccount,
        }
    }
}

/// Action identity without payload, used by the transition table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// See [`FlowAction::StartAsNewMember`]
    StartAsNewMember,
    /// See [`FlowAction::ContinueAsExistingMember`]
    ContinueAsExistingMember,
    /// See [`FlowAction::SelectPlan`]
    SelectPlan,
    /// See [`FlowAction::ConfirmHomeTheater`]
    ConfirmHomeTheater,
    /// See [`FlowAction::ViewEventDetails`]
    ViewEventDetails,
    /// See [`FlowAction::FindShows`]
    FindShows,
    /// See [`FlowAction::ResetSession`]
    ResetSession,
    /// See [`FlowAction::BookShow`]
    BookShow,
    /// See [`FlowAction::BackToDashboard`]
    BackToDashboard,
    /// See [`FlowAction::ConfirmPerks`]
    ConfirmPerks,
    /// See [`FlowAction::GoToEventHome`]
    GoToEventHome,
    /// See [`FlowAction::UpdatePerks`]
    UpdatePerks,
    /// See [`FlowAction::GoToAccount`]
    GoToAccount,
}

impl ActionKind {
    /// Every action kind
    pub const ALL: [Self; 13] = [
        Self::StartAsNewMember,
        Self::ContinueAsExistingMember,
        Self::SelectPlan,
        Self::ConfirmHomeTheater,
        Self::ViewEventDetails,
        Self::FindShows,
        Self::ResetSession,
        Self::BookShow,
        Self::BackToDashboard,
        Self::ConfirmPerks,
        Self::GoToEventHome,
        Self::UpdatePerks,
        Self::GoToAccount,
    ];

    /// Stable identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StartAsNewMember => "start_as_new_member",
            Self::ContinueAsExistingMember => "continue_as_existing_member",
            Self::SelectPlan => "select_plan",
            Self::ConfirmHomeTheater => "confirm_home_theater",
            Self::ViewEventDetails => "view_event_details",
            Self::FindShows => "find_shows",
            Self::ResetSession => "reset_session",
            Self::BookShow => "book_show",
            Self::BackToDashboard => "back_to_dashboard",
            Self::ConfirmPerks => "confirm_perks",
            Self::GoToEventHome => "go_to_event_home",
            Self::UpdatePerks => "update_perks",
            Self::GoToAccount => "go_to_account",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The transition table: where `kind` leads from `step`
///
/// Total over every `(Step, ActionKind)` pair; `None` means the action is
/// not offered on that step. Preconditions that depend on session data
/// (such as having a booking) are checked by the step machine.
#[must_use]
pub const fn transition(step: Step, kind: ActionKind) -> Option<Step> {
    use ActionKind as A;
    use Step as S;

    match (step, kind) {
        (S::Welcome, A::StartAsNewMember) => Some(S::Membership),
        (S::Welcome, A::ContinueAsExistingMember)
        | (S::TheaterSelection, A::ConfirmHomeTheater)
        | (S::ShowDiscovery, A::BackToDashboard)
        | (S::EventHome, A::GoToAccount) => Some(S::AccountDashboard),
        (S::Membership, A::SelectPlan) => Some(S::TheaterSelection),
        (S::AccountDashboard, A::ViewEventDetails)
        | (S::BookingConfirmation, A::GoToEventHome)
        | (S::EventHome, A::UpdatePerks) => Some(S::EventHome),
        (S::AccountDashboard, A::FindShows) => Some(S::ShowDiscovery),
        (S::AccountDashboard, A::ResetSession) => Some(S::Welcome),
        (S::ShowDiscovery, A::BookShow) => Some(S::PerkSelection),
        (S::PerkSelection, A::ConfirmPerks) => Some(S::BookingConfirmation),
        _ => None,
    }
}

/// Action kinds the table allows on `step`
pub fn actions_on(step: Step) -> impl Iterator<Item = ActionKind> {
    ActionKind::ALL
        .into_iter()
        .filter(move |kind| transition(step, *kind).is_some())
}
