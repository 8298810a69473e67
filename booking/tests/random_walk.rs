//! Property tests: random walks through the screens.
//!
//! Whatever sequence of offered choices a user makes, every choice is
//! accepted, lands on the step the table names, and leaves the session
//! consistent.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use encore_booking::{
    ActionKind, FlowAction, FlowEnvironment, PerkKind, PerkSelection, Screen, Session,
    ShowFilter, StaticCatalog, Step, StepMachine, transition,
};
use encore_core::reducer::Reducer;
use encore_testing::test_clock;
use proptest::prelude::*;
use std::sync::Arc;

fn environment() -> FlowEnvironment {
    FlowEnvironment::new(
        Arc::new(StaticCatalog::builtin().expect("builtin catalog")),
        Arc::new(test_clock()),
    )
}

fn perks_from_bits(bits: u8) -> PerkSelection {
    PerkSelection::default()
        .with(PerkKind::Snack, bits & 0b001 != 0)
        .with(PerkKind::Drink, bits & 0b010 != 0)
        .with(PerkKind::Parking, bits & 0b100 != 0)
}

fn any_action() -> impl Strategy<Value = FlowAction> {
    let plan = prop_oneof![
        Just("Base Membership".to_string()),
        Just("Premium Membership".to_string()),
        Just("Gold Membership".to_string()),
    ];
    let theater = prop_oneof![
        Just("Guthrie Theater".to_string()),
        Just("Berkeley Rep".to_string()),
        Just("Globe Theatre".to_string()),
    ];
    let filter = prop_oneof![Just(ShowFilter::Home), Just(ShowFilter::Other)];
    let title = prop_oneof![
        Just("Hamlet".to_string()),
        Just("True West".to_string()),
        Just("Cats".to_string()),
    ];

    prop_oneof![
        Just(FlowAction::StartAsNewMember),
        Just(FlowAction::ContinueAsExistingMember),
        plan.prop_map(|plan| FlowAction::SelectPlan { plan }),
        theater
            .clone()
            .prop_map(|theater| FlowAction::ConfirmHomeTheater { theater }),
        Just(FlowAction::ViewEventDetails),
        filter.prop_map(|filter| FlowAction::FindShows { filter }),
        Just(FlowAction::ResetSession),
        (title, proptest::option::of(theater))
            .prop_map(|(title, theater)| FlowAction::BookShow { title, theater }),
        Just(FlowAction::BackToDashboard),
        any::<u8>().prop_map(|bits| FlowAction::ConfirmPerks {
            perks: perks_from_bits(bits)
        }),
        Just(FlowAction::GoToEventHome),
        any::<u8>().prop_map(|bits| FlowAction::UpdatePerks {
            perks: perks_from_bits(bits)
        }),
        Just(FlowAction::GoToAccount),
    ]
}

proptest! {
    #[test]
    fn offered_choices_always_succeed(picks in prop::collection::vec((any::<usize>(), any::<u8>()), 0..80)) {
        let env = environment();
        let machine = StepMachine::new();
        let mut session = Session::new();

        for (pick, bits) in picks {
            let screen = Screen::render(&session, env.catalog.as_ref());
            prop_assert!(!screen.choices.is_empty(), "{} offers nothing", session.step());

            let choice = &screen.choices[pick % screen.choices.len()];
            let action = if choice.asks_for_perks {
                choice.action_with_perks(perks_from_bits(bits))
            } else {
                choice.action.clone()
            };
            let kind = action.kind();
            let expected = transition(session.step(), kind);

            let next = machine.apply(&session, action, &env);
            prop_assert!(next.is_ok(), "{kind} on {} failed: {next:?}", session.step());
            let next = next.unwrap().session;

            prop_assert_eq!(Some(next.step()), expected);
            prop_assert!(next.check_invariants(env.catalog.as_ref()).is_ok());

            match kind {
                ActionKind::ResetSession => prop_assert_eq!(&next, &Session::new()),
                ActionKind::BookShow => {
                    prop_assert_eq!(next.booked_shows().len(), session.booked_shows().len() + 1);
                    prop_assert_eq!(next.booked_shows().last(), next.selected_show());
                },
                _ => {
                    prop_assert_eq!(next.booked_shows(), session.booked_shows());
                },
            }
            if kind != ActionKind::SelectPlan && kind != ActionKind::ResetSession {
                prop_assert_eq!(next.shows_remaining(), session.shows_remaining());
            }

            session = next;
        }
    }

    #[test]
    fn rejected_actions_change_nothing(
        prefix in prop::collection::vec(any_action(), 0..20),
        action in any_action(),
    ) {
        let env = environment();
        let machine = StepMachine::new();

        let session = prefix.into_iter().fold(Session::new(), |session, action| {
            machine.apply(&session, action, &env).map_or(session, |t| t.session)
        });
        prop_assert!(session.check_invariants(env.catalog.as_ref()).is_ok());

        let mut state = session.clone();
        match machine.reduce(&mut state, action.clone(), &env) {
            Ok(_) => {
                prop_assert_eq!(Some(state.step()), transition(session.step(), action.kind()));
            },
            Err(_) => prop_assert_eq!(&state, &session),
        }
    }

    #[test]
    fn off_table_actions_are_invalid_transitions(action in any_action()) {
        let env = environment();
        for step in Step::ALL {
            if transition(step, action.kind()).is_some() {
                continue;
            }
            let session = Session::from_json(&format!(
                r#"{{"step": "{step}", "show_filter": "home", "selected_show": {{
                    "title": "Hamlet", "date": "2025-03-10", "time": "19:00:00",
                    "booked_at": "2025-03-01T12:00:00Z"
                }}}}"#
            ))
            .unwrap();
            let result = StepMachine::new().apply(&session, action.clone(), &env);
            prop_assert!(
                matches!(result, Err(encore_booking::FlowError::InvalidTransition { .. })),
                "{} on {step} gave {result:?}",
                action.kind()
            );
        }
    }
}
