//! The per-user session record.

use crate::catalog::Catalog;
use crate::error::FlowError;
use crate::types::{Booking, PerkSelection, ShowFilter, Step};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Everything the flow knows about one user
///
/// Fields are only changed by the step machine. Outside the crate the session
/// is read through accessors, or round-tripped through JSON for inspection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub(crate) step: Step,
    #[serde(default)]
    pub(crate) membership: Option<String>,
    #[serde(default)]
    pub(crate) shows_remaining: u32,
    #[serde(default)]
    pub(crate) home_theater: Option<String>,
    #[serde(default)]
    pub(crate) booked_shows: Vec<Booking>,
    #[serde(default)]
    pub(crate) show_filter: Option<ShowFilter>,
    #[serde(default)]
    pub(crate) perks: PerkSelection,
    #[serde(default)]
    pub(crate) selected_show: Option<Booking>,
}

impl Session {
    /// A fresh session on the welcome screen
    #[must_use]
    pub const fn new() -> Self {
        Self {
            step: Step::Welcome,
            membership: None,
            shows_remaining: 0,
            home_theater: None,
            booked_shows: Vec::new(),
            show_filter: None,
            perks: PerkSelection {
                snack: false,
                drink: false,
                parking: false,
            },
            selected_show: None,
        }
    }

    /// The screen the session is on
    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    /// Chosen plan name
    #[must_use]
    pub fn membership(&self) -> Option<&str> {
        self.membership.as_deref()
    }

    /// Shows granted by the plan
    #[must_use]
    pub const fn shows_remaining(&self) -> u32 {
        self.shows_remaining
    }

    /// Home theater name
    #[must_use]
    pub fn home_theater(&self) -> Option<&str> {
        self.home_theater.as_deref()
    }

    /// Bookings, oldest first
    #[must_use]
    pub fn booked_shows(&self) -> &[Booking] {
        &self.booked_shows
    }

    /// Active discovery filter
    #[must_use]
    pub const fn show_filter(&self) -> Option<ShowFilter> {
        self.show_filter
    }

    /// Current perk choices
    #[must_use]
    pub const fn perks(&self) -> PerkSelection {
        self.perks
    }

    /// The show most recently booked
    #[must_use]
    pub const fn selected_show(&self) -> Option<&Booking> {
        self.selected_show.as_ref()
    }

    /// Serialize for display or inspection
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::CorruptSession`] if serialization fails.
    pub fn to_json(&self) -> Result<String, FlowError> {
        serde_json::to_string_pretty(self).map_err(|e| FlowError::CorruptSession(e.to_string()))
    }

    /// Parse a session produced by [`Session::to_json`]
    ///
    /// The step identifier is checked first so an unrecognized one is
    /// reported as such rather than as a generic shape error.
    ///
    /// # Errors
    ///
    /// - [`FlowError::UnknownStep`] if `step` is not a known identifier
    /// - [`FlowError::CorruptSession`] if the document is malformed or its
    ///   fields contradict each other
    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| FlowError::CorruptSession(e.to_string()))?;

        let step = value
            .get("step")
            .ok_or_else(|| FlowError::CorruptSession("missing step".to_string()))?
            .as_str()
            .ok_or_else(|| FlowError::CorruptSession("step is not a string".to_string()))?;
        Step::from_str(step)?;

        let session: Self =
            serde_json::from_value(value).map_err(|e| FlowError::CorruptSession(e.to_string()))?;
        session.check_shape()?;
        Ok(session)
    }

    /// Verify the session is consistent with itself and with `catalog`
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::CorruptSession`] naming the first violated rule.
    pub fn check_invariants(&self, catalog: &dyn Catalog) -> Result<(), FlowError> {
        self.check_shape()?;

        if let Some(home) = self.home_theater() {
            if catalog.theater(home).is_none() {
                return Err(FlowError::CorruptSession(format!(
                    "home theater '{home}' is not in the catalog"
                )));
            }
        }
        if let Some(plan) = self.membership() {
            if catalog.plan(plan).is_none() {
                return Err(FlowError::CorruptSession(format!(
                    "membership '{plan}' is not in the catalog"
                )));
            }
        }
        Ok(())
    }

    fn check_shape(&self) -> Result<(), FlowError> {
        if self.step == Step::ShowDiscovery && self.show_filter.is_none() {
            return Err(FlowError::CorruptSession(
                "show_discovery without a show filter".to_string(),
            ));
        }
        if matches!(self.step, Step::PerkSelection | Step::BookingConfirmation)
            && self.selected_show.is_none()
        {
            return Err(FlowError::CorruptSession(format!(
                "{} without a selected show",
                self.step
            )));
        }
        if self.shows_remaining > 0 && self.membership.is_none() {
            return Err(FlowError::CorruptSession(
                "shows remaining without a membership".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Discard everything and return to the welcome screen
pub fn reset_session(session: &mut Session) {
    *session = Session::new();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use serde_json::json;

    #[test]
    fn new_session_is_on_welcome_with_defaults() {
        let session = Session::new();
        assert_eq!(session.step(), Step::Welcome);
        assert_eq!(session.membership(), None);
        assert_eq!(session.shows_remaining(), 0);
        assert!(session.booked_shows().is_empty());
        assert!(session.perks().is_empty());
        assert_eq!(session, Session::default());
    }

    #[test]
    fn reset_restores_defaults() {
        let mut session = Session::new();
        session.step = Step::AccountDashboard;
        session.membership = Some("Base Membership".to_string());
        session.shows_remaining = 3;
        session.home_theater = Some("Guthrie Theater".to_string());

        reset_session(&mut session);
        assert_eq!(session, Session::new());
    }

    #[test]
    fn json_uses_step_identifiers() {
        let mut session = Session::new();
        session.step = Step::TheaterSelection;
        let json = session.to_json().unwrap();
        assert!(json.contains(r#""step": "theater_selection""#));
        assert_eq!(Session::from_json(&json).unwrap(), session);
    }

    #[test]
    fn unknown_step_in_json() {
        let err = Session::from_json(r#"{"step": "checkout"}"#).unwrap_err();
        assert_eq!(err, FlowError::UnknownStep("checkout".to_string()));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let session = Session::from_json(r#"{"step": "account_dashboard"}"#).unwrap();
        assert_eq!(session.step(), Step::AccountDashboard);
        assert!(session.perks().is_empty());
    }

    #[test]
    fn discovery_without_filter_is_corrupt() {
        let err = Session::from_json(r#"{"step": "show_discovery"}"#).unwrap_err();
        assert!(matches!(err, FlowError::CorruptSession(_)));
    }

    #[test]
    fn shows_remaining_requires_membership() {
        let json = json!({"step": "account_dashboard", "shows_remaining": 3}).to_string();
        assert!(matches!(
            Session::from_json(&json),
            Err(FlowError::CorruptSession(_))
        ));
    }

    #[test]
    fn unknown_home_theater_violates_invariants() {
        let catalog = StaticCatalog::builtin().unwrap();
        let json = json!({"step": "account_dashboard", "home_theater": "Globe Theatre"}).to_string();
        let session = Session::from_json(&json).unwrap();
        let err = session.check_invariants(&catalog).unwrap_err();
        assert!(matches!(err, FlowError::CorruptSession(msg) if msg.contains("Globe Theatre")));
    }
}
