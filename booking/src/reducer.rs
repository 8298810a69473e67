//! The step machine: validates an action against the session and applies it.

use crate::action::{FlowAction, transition};
use crate::catalog::{Catalog, listings};
use crate::error::FlowError;
use crate::event::FlowEvent;
use crate::session::{Session, reset_session};
use crate::types::Booking;
use encore_core::environment::Clock;
use encore_core::reducer::{Events, Reducer};
use encore_core::{SmallVec, smallvec};
use std::sync::Arc;

/// Dependencies the step machine reads
#[derive(Clone)]
pub struct FlowEnvironment {
    /// Plans, theaters and schedules
    pub catalog: Arc<dyn Catalog>,
    /// Timestamps for bookings
    pub clock: Arc<dyn Clock>,
}

impl FlowEnvironment {
    /// Creates a new flow environment
    #[must_use]
    pub fn new(catalog: Arc<dyn Catalog>, clock: Arc<dyn Clock>) -> Self {
        Self { catalog, clock }
    }
}

/// Result of [`StepMachine::apply`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    /// The session after the action
    pub session: Session,
    /// What changed, in order
    pub events: Events<FlowEvent>,
}

/// Reducer for the booking flow
///
/// Every action is looked up in the transition table first; anything the
/// table does not allow on the current step is rejected before the payload
/// is even inspected. Payload checks run before the first write, so a
/// rejected action never leaves a partial update behind.
#[derive(Clone, Copy, Debug, Default)]
pub struct StepMachine;

impl StepMachine {
    /// Creates a new step machine
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Apply `action` without touching `session`
    ///
    /// # Errors
    ///
    /// Returns the [`FlowError`] the action was rejected with.
    pub fn apply(
        &self,
        session: &Session,
        action: FlowAction,
        env: &FlowEnvironment,
    ) -> Result<Transition, FlowError> {
        let mut next = session.clone();
        let events = self.reduce(&mut next, action, env)?;
        Ok(Transition {
            session: next,
            events,
        })
    }

    fn book_show(
        state: &Session,
        title: &str,
        theater: Option<&str>,
        env: &FlowEnvironment,
    ) -> Result<Booking, FlowError> {
        let filter = state.show_filter.ok_or_else(|| {
            FlowError::InvalidPayload("no show filter is active".to_string())
        })?;

        let listing = listings(env.catalog.as_ref(), filter, state.home_theater())
            .into_iter()
            .find(|listing| listing.show.title == title && listing.theater.as_deref() == theater)
            .ok_or_else(|| {
                FlowError::InvalidPayload(format!("'{title}' is not listed for {filter} theaters"))
            })?;

        Ok(Booking::from_listing(listing, env.clock.now()))
    }
}

impl Reducer for StepMachine {
    type State = Session;
    type Action = FlowAction;
    type Event = FlowEvent;
    type Error = FlowError;
    type Environment = FlowEnvironment;

    fn reduce(
        &self,
        state: &mut Session,
        action: FlowAction,
        env: &FlowEnvironment,
    ) -> Result<Events<FlowEvent>, FlowError> {
        let from = state.step;
        let kind = action.kind();
        let to = transition(from, kind).ok_or(FlowError::InvalidTransition {
            step: from,
            action: kind,
        })?;

        let mut events: Events<FlowEvent> = SmallVec::new();

        match action {
            FlowAction::StartAsNewMember
            | FlowAction::ContinueAsExistingMember
            | FlowAction::BackToDashboard
            | FlowAction::GoToEventHome
            | FlowAction::GoToAccount => {},

            FlowAction::SelectPlan { plan } => {
                let shows_allowed = env
                    .catalog
                    .plan(&plan)
                    .map(|p| p.shows_allowed)
                    .ok_or_else(|| FlowError::InvalidPayload(format!("unknown plan '{plan}'")))?;
                state.membership = Some(plan.clone());
                state.shows_remaining = shows_allowed;
                events.push(FlowEvent::MembershipSelected {
                    plan,
                    shows_allowed,
                });
            },

            FlowAction::ConfirmHomeTheater { theater } => {
                if env.catalog.theater(&theater).is_none() {
                    return Err(FlowError::InvalidPayload(format!(
                        "unknown theater '{theater}'"
                    )));
                }
                state.home_theater = Some(theater.clone());
                events.push(FlowEvent::HomeTheaterConfirmed { theater });
            },

            FlowAction::ViewEventDetails => {
                if state.booked_shows.is_empty() {
                    return Err(FlowError::InvalidTransition {
                        step: from,
                        action: kind,
                    });
                }
            },

            FlowAction::FindShows { filter } => {
                state.show_filter = Some(filter);
                events.push(FlowEvent::ShowsFiltered { filter });
            },

            FlowAction::ResetSession => {
                reset_session(state);
                events.push(FlowEvent::SessionReset);
            },

            FlowAction::BookShow { title, theater } => {
                let booking = Self::book_show(state, &title, theater.as_deref(), env)?;
                state.booked_shows.push(booking.clone());
                state.selected_show = Some(booking.clone());
                events.push(FlowEvent::ShowBooked { booking });
            },

            FlowAction::ConfirmPerks { perks } | FlowAction::UpdatePerks { perks } => {
                state.perks = perks;
                events.push(FlowEvent::PerksUpdated { perks });
            },
        }

        state.step = to;
        if from != to {
            events.push(FlowEvent::StepChanged { from, to });
        }

        tracing::debug!(
            from = %from,
            to = %to,
            action = %kind,
            events = events.len(),
            "Step machine accepted action"
        );

        Ok(events)
    }
}

/// The flow from a fresh session to a show's event home
#[doc(hidden)]
#[must_use]
pub fn sample_journey() -> SmallVec<[FlowAction; 8]> {
    use crate::types::{PerkSelection, ShowFilter};

    smallvec![
        FlowAction::StartAsNewMember,
        FlowAction::SelectPlan {
            plan: "Base Membership".to_string(),
        },
        FlowAction::ConfirmHomeTheater {
            theater: "Guthrie Theater".to_string(),
        },
        FlowAction::FindShows {
            filter: ShowFilter::Home,
        },
        FlowAction::BookShow {
            title: "Hamlet".to_string(),
            theater: None,
        },
        FlowAction::ConfirmPerks {
            perks: PerkSelection {
                snack: true,
                drink: false,
                parking: true,
            },
        },
        FlowAction::GoToEventHome,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::catalog::StaticCatalog;
    use crate::types::{PerkKind, PerkSelection, ShowFilter, Step};
    use encore_core::event::Event;
    use encore_testing::{ReducerTest, assertions, test_clock};

    fn env() -> FlowEnvironment {
        FlowEnvironment::new(
            Arc::new(StaticCatalog::builtin().unwrap()),
            Arc::new(test_clock()),
        )
    }

    fn at(step: Step) -> Session {
        let mut session = Session::new();
        session.step = step;
        session
    }

    fn member_at(step: Step) -> Session {
        let mut session = at(step);
        session.membership = Some("Base Membership".to_string());
        session.shows_remaining = 3;
        session.home_theater = Some("Guthrie Theater".to_string());
        session
    }

    fn drive(actions: impl IntoIterator<Item = FlowAction>) -> Session {
        let env = env();
        actions
            .into_iter()
            .fold(Session::new(), |session, action| {
                StepMachine::new()
                    .apply(&session, action, &env)
                    .unwrap()
                    .session
            })
    }

    #[test]
    fn new_user_goes_to_membership() {
        ReducerTest::new(StepMachine::new())
            .with_env(env())
            .given_state(Session::new())
            .when_action(FlowAction::StartAsNewMember)
            .then_state(|s| assert_eq!(s.step(), Step::Membership))
            .then_events(|events| {
                assertions::assert_event_types(events, &["StepChanged.v1"]);
            })
            .run();
    }

    #[test]
    fn existing_user_goes_to_dashboard() {
        ReducerTest::new(StepMachine::new())
            .with_env(env())
            .given_state(Session::new())
            .when_action(FlowAction::ContinueAsExistingMember)
            .then_state(|s| {
                assert_eq!(s.step(), Step::AccountDashboard);
                assert_eq!(s.membership(), None);
                assert_eq!(s.home_theater(), None);
            })
            .run();
    }

    #[test]
    fn selecting_base_plan_grants_three_shows() {
        ReducerTest::new(StepMachine::new())
            .with_env(env())
            .given_state(at(Step::Membership))
            .when_action(FlowAction::SelectPlan {
                plan: "Base Membership".to_string(),
            })
            .then_state(|s| {
                assert_eq!(s.step(), Step::TheaterSelection);
                assert_eq!(s.membership(), Some("Base Membership"));
                assert_eq!(s.shows_remaining(), 3);
            })
            .then_events(|events| {
                assertions::assert_event_types(events, &["MembershipSelected.v1", "StepChanged.v1"]);
            })
            .run();
    }

    #[test]
    fn selecting_premium_plan_grants_six_shows() {
        ReducerTest::new(StepMachine::new())
            .with_env(env())
            .given_state(at(Step::Membership))
            .when_action(FlowAction::SelectPlan {
                plan: "Premium Membership".to_string(),
            })
            .then_state(|s| assert_eq!(s.shows_remaining(), 6))
            .run();
    }

    #[test]
    fn unknown_plan_is_rejected() {
        ReducerTest::new(StepMachine::new())
            .with_env(env())
            .given_state(at(Step::Membership))
            .when_action(FlowAction::SelectPlan {
                plan: "Gold Membership".to_string(),
            })
            .then_error(|e| assert!(matches!(e, FlowError::InvalidPayload(_))))
            .run();
    }

    #[test]
    fn confirming_theater_sets_home() {
        ReducerTest::new(StepMachine::new())
            .with_env(env())
            .given_state(at(Step::TheaterSelection))
            .when_action(FlowAction::ConfirmHomeTheater {
                theater: "Steppenwolf Theatre".to_string(),
            })
            .then_state(|s| {
                assert_eq!(s.step(), Step::AccountDashboard);
                assert_eq!(s.home_theater(), Some("Steppenwolf Theatre"));
            })
            .run();
    }

    #[test]
    fn unknown_theater_is_rejected() {
        ReducerTest::new(StepMachine::new())
            .with_env(env())
            .given_state(at(Step::TheaterSelection))
            .when_action(FlowAction::ConfirmHomeTheater {
                theater: "Globe Theatre".to_string(),
            })
            .then_error(|e| assert!(matches!(e, FlowError::InvalidPayload(_))))
            .run();
    }

    #[test]
    fn event_details_require_a_booking() {
        ReducerTest::new(StepMachine::new())
            .with_env(env())
            .given_state(member_at(Step::AccountDashboard))
            .when_action(FlowAction::ViewEventDetails)
            .then_error(|e| {
                assert_eq!(
                    *e,
                    FlowError::InvalidTransition {
                        step: Step::AccountDashboard,
                        action: ActionKind::ViewEventDetails,
                    }
                );
            })
            .run();
    }

    #[test]
    fn find_shows_sets_filter() {
        ReducerTest::new(StepMachine::new())
            .with_env(env())
            .given_state(member_at(Step::AccountDashboard))
            .when_action(FlowAction::FindShows {
                filter: ShowFilter::Other,
            })
            .then_state(|s| {
                assert_eq!(s.step(), Step::ShowDiscovery);
                assert_eq!(s.show_filter(), Some(ShowFilter::Other));
            })
            .run();
    }

    #[test]
    fn booking_other_theater_keeps_tag() {
        let mut state = member_at(Step::ShowDiscovery);
        state.show_filter = Some(ShowFilter::Other);

        ReducerTest::new(StepMachine::new())
            .with_env(env())
            .given_state(state)
            .when_action(FlowAction::BookShow {
                title: "True West".to_string(),
                theater: Some("Steppenwolf Theatre".to_string()),
            })
            .then_state(|s| {
                assert_eq!(s.step(), Step::PerkSelection);
                assert_eq!(s.booked_shows().len(), 1);
                let booking = &s.booked_shows()[0];
                assert_eq!(booking.theater.as_deref(), Some("Steppenwolf Theatre"));
                assert_eq!(booking.booked_at, test_clock().now());
                assert_eq!(s.selected_show(), Some(booking));
            })
            .then_events(|events| {
                assertions::assert_event_types(events, &["ShowBooked.v1", "StepChanged.v1"]);
            })
            .run();
    }

    #[test]
    fn home_theater_show_is_not_offered_as_other() {
        let mut state = member_at(Step::ShowDiscovery);
        state.show_filter = Some(ShowFilter::Other);

        ReducerTest::new(StepMachine::new())
            .with_env(env())
            .given_state(state)
            .when_action(FlowAction::BookShow {
                title: "Hamlet".to_string(),
                theater: Some("Guthrie Theater".to_string()),
            })
            .then_error(|e| assert!(matches!(e, FlowError::InvalidPayload(_))))
            .run();
    }

    #[test]
    fn booking_without_filter_is_invalid_payload() {
        ReducerTest::new(StepMachine::new())
            .with_env(env())
            .given_state(member_at(Step::ShowDiscovery))
            .when_action(FlowAction::BookShow {
                title: "Hamlet".to_string(),
                theater: None,
            })
            .then_error(|e| {
                assert!(matches!(e, FlowError::InvalidPayload(msg) if msg.contains("filter")));
            })
            .run();
    }

    #[test]
    fn home_listing_without_home_theater_books_nothing() {
        let mut state = at(Step::ShowDiscovery);
        state.show_filter = Some(ShowFilter::Home);

        ReducerTest::new(StepMachine::new())
            .with_env(env())
            .given_state(state)
            .when_action(FlowAction::BookShow {
                title: "Hamlet".to_string(),
                theater: None,
            })
            .then_error(|e| assert!(matches!(e, FlowError::InvalidPayload(_))))
            .run();
    }

    #[test]
    fn back_to_dashboard_keeps_filter() {
        let mut state = member_at(Step::ShowDiscovery);
        state.show_filter = Some(ShowFilter::Home);

        ReducerTest::new(StepMachine::new())
            .with_env(env())
            .given_state(state)
            .when_action(FlowAction::BackToDashboard)
            .then_state(|s| {
                assert_eq!(s.step(), Step::AccountDashboard);
                assert!(s.booked_shows().is_empty());
            })
            .run();
    }

    #[test]
    fn update_perks_stays_on_event_home() {
        let perks = PerkSelection::from_kinds([PerkKind::Drink, PerkKind::Parking]);

        ReducerTest::new(StepMachine::new())
            .with_env(env())
            .given_state(member_at(Step::EventHome))
            .when_action(FlowAction::UpdatePerks { perks })
            .then_state(move |s| {
                assert_eq!(s.step(), Step::EventHome);
                assert_eq!(s.perks(), perks);
            })
            .then_events(|events| {
                assertions::assert_event_types(events, &["PerksUpdated.v1"]);
            })
            .run();
    }

    #[test]
    fn repeating_the_same_perk_update_changes_nothing() {
        let perks = PerkSelection::from_kinds([PerkKind::Snack, PerkKind::Parking]);
        let mut state = drive(sample_journey());
        state.perks = perks;
        let before = state.clone();

        ReducerTest::new(StepMachine::new())
            .with_env(env())
            .given_state(state)
            .when_action(FlowAction::UpdatePerks { perks })
            .then_state(move |s| {
                assert_eq!(s.perks(), perks);
                assert_eq!(*s, before);
            })
            .then_events(|events| {
                assertions::assert_events_count(events, 1);
                assertions::assert_event_types(events, &["PerksUpdated.v1"]);
            })
            .run();
    }

    #[test]
    fn dashboard_after_signup_shows_membership_status() {
        let session = drive(sample_journey()[..3].to_vec());

        assert_eq!(session.step(), Step::AccountDashboard);
        assert_eq!(session.home_theater(), Some("Guthrie Theater"));
        assert_eq!(session.shows_remaining(), 3);
        assert!(session.booked_shows().is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut state = drive(sample_journey());
        state.step = Step::AccountDashboard;

        ReducerTest::new(StepMachine::new())
            .with_env(env())
            .given_state(state)
            .when_action(FlowAction::ResetSession)
            .then_state(|s| assert_eq!(*s, Session::new()))
            .then_events(|events| {
                assertions::assert_event_types(events, &["SessionReset.v1", "StepChanged.v1"]);
            })
            .run();
    }

    #[test]
    fn actions_off_the_table_are_rejected() {
        ReducerTest::new(StepMachine::new())
            .with_env(env())
            .given_state(Session::new())
            .when_action(FlowAction::GoToAccount)
            .then_error(|e| {
                assert_eq!(
                    *e,
                    FlowError::InvalidTransition {
                        step: Step::Welcome,
                        action: ActionKind::GoToAccount,
                    }
                );
            })
            .run();
    }

    #[test]
    fn guthrie_hamlet_journey() {
        let session = drive(sample_journey());

        assert_eq!(session.step(), Step::EventHome);
        assert_eq!(session.membership(), Some("Base Membership"));
        assert_eq!(session.shows_remaining(), 3);
        assert_eq!(session.home_theater(), Some("Guthrie Theater"));
        assert_eq!(session.booked_shows().len(), 1);

        let booking = &session.booked_shows()[0];
        assert_eq!(booking.title, "Hamlet");
        assert_eq!(booking.date.to_string(), "2025-03-10");
        assert_eq!(booking.time_label(), "7:00 PM");
        assert_eq!(booking.theater, None);
        assert_eq!(
            session.perks(),
            PerkSelection {
                snack: true,
                drink: false,
                parking: true
            }
        );
    }

    #[test]
    fn apply_leaves_input_untouched() {
        let env = env();
        let before = Session::new();
        let transition = StepMachine::new()
            .apply(&before, FlowAction::StartAsNewMember, &env)
            .unwrap();

        assert_eq!(before, Session::new());
        assert_eq!(transition.session.step(), Step::Membership);
        assert_eq!(transition.events[0].event_type(), "StepChanged.v1");
    }

    #[test]
    fn backward_navigation_keeps_bookings() {
        let mut actions: Vec<FlowAction> = sample_journey().into_vec();
        actions.extend([
            FlowAction::GoToAccount,
            FlowAction::FindShows {
                filter: ShowFilter::Other,
            },
            FlowAction::BackToDashboard,
            FlowAction::ViewEventDetails,
        ]);
        let session = drive(actions);

        assert_eq!(session.step(), Step::EventHome);
        assert_eq!(session.booked_shows().len(), 1);
        assert_eq!(session.show_filter(), Some(ShowFilter::Other));
    }
}
