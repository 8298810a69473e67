//! # Encore Booking
//!
//! Theater membership booking flow, modelled as a step-based session state
//! machine.
//!
//! A user moves through eight screens: welcome, membership signup, home
//! theater selection, account dashboard, show discovery, perk selection,
//! booking confirmation and event home. Each screen offers a fixed set of
//! [`FlowAction`]s; the [`StepMachine`] validates an action against the
//! current [`Session`] and either applies it as a unit or rejects it with a
//! [`FlowError`].
//!
//! ## Example
//!
//! ```
//! use encore_booking::{FlowAction, FlowEnvironment, Session, StaticCatalog, Step, StepMachine};
//! use encore_core::environment::SystemClock;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let env = FlowEnvironment::new(Arc::new(StaticCatalog::builtin()?), Arc::new(SystemClock));
//! let next = StepMachine::new().apply(&Session::new(), FlowAction::StartAsNewMember, &env)?;
//! assert_eq!(next.session.step(), Step::Membership);
//! # Ok(())
//! # }
//! ```
//!
//! For an interactive loop, wrap the machine in an
//! [`encore_runtime::Store`] (see [`BookingStore`]).

pub mod action;
pub mod catalog;
pub mod config;
pub mod error;
pub mod event;
pub mod reducer;
pub mod screen;
pub mod session;
pub mod ticket;
pub mod types;

pub use action::{ActionKind, FlowAction, actions_on, transition};
pub use catalog::{Catalog, CatalogError, StaticCatalog, listings};
pub use config::Config;
pub use error::FlowError;
pub use event::FlowEvent;
pub use reducer::{FlowEnvironment, StepMachine, Transition};

#[doc(hidden)]
pub use reducer::sample_journey;
pub use screen::{Choice, Screen};
pub use session::{Session, reset_session};
pub use types::{
    Booking, Listing, MembershipPlan, PerkKind, PerkSelection, SessionId, Show, ShowFilter, Step,
    TaggedShow, Theater,
};

/// A store driving one booking session
pub type BookingStore = encore_runtime::Store<Session, FlowAction, FlowEnvironment, StepMachine>;

/// Independent booking sessions keyed by [`SessionId`]
pub type BookingRegistry =
    encore_runtime::SessionRegistry<SessionId, Session, FlowAction, FlowEnvironment, StepMachine>;
