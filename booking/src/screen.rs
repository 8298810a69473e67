//! What the renderer shows for each step.
//!
//! A [`Screen`] is derived from the session and the catalog alone. Its
//! choices are the only actions a renderer should submit, which keeps a
//! well-behaved renderer clear of [`FlowError`](crate::FlowError)s.

use crate::action::FlowAction;
use crate::catalog::{Catalog, listings};
use crate::session::Session;
use crate::ticket::{perk_codes, ticket_payload};
use crate::types::{Booking, PerkKind, PerkSelection, ShowFilter, Step};
use std::fmt;

/// A button on a screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choice {
    /// Button text
    pub label: String,
    /// Action submitted when chosen
    pub action: FlowAction,
    /// The renderer must collect a perk set before submitting
    pub asks_for_perks: bool,
}

impl Choice {
    fn new(label: impl Into<String>, action: FlowAction) -> Self {
        Self {
            label: label.into(),
            action,
            asks_for_perks: false,
        }
    }

    fn with_perk_prompt(label: impl Into<String>, action: FlowAction) -> Self {
        Self {
            asks_for_perks: true,
            ..Self::new(label, action)
        }
    }

    /// The action to submit, carrying `perks` if this choice asks for them
    #[must_use]
    pub fn action_with_perks(&self, perks: PerkSelection) -> FlowAction {
        match &self.action {
            FlowAction::ConfirmPerks { .. } => FlowAction::ConfirmPerks { perks },
            FlowAction::UpdatePerks { .. } => FlowAction::UpdatePerks { perks },
            other => other.clone(),
        }
    }
}

/// Renderable description of the current step
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Screen {
    /// Step this screen belongs to
    pub step: Step,
    /// Heading
    pub title: String,
    /// Body text, one entry per line
    pub lines: Vec<String>,
    /// Offered actions, in display order
    pub choices: Vec<Choice>,
}

impl Screen {
    /// Build the screen for the session's current step
    #[must_use]
    pub fn render(session: &Session, catalog: &dyn Catalog) -> Self {
        match session.step() {
            Step::Welcome => welcome(),
            Step::Membership => membership(catalog),
            Step::TheaterSelection => theater_selection(catalog),
            Step::AccountDashboard => dashboard(session),
            Step::ShowDiscovery => discovery(session, catalog),
            Step::PerkSelection => perk_selection(session),
            Step::BookingConfirmation => booking_confirmation(session),
            Step::EventHome => event_home(session),
        }
    }

    fn new(step: Step, title: impl Into<String>) -> Self {
        Self {
            step,
            title: title.into(),
            lines: Vec::new(),
            choices: Vec::new(),
        }
    }

    fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    fn choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.title)?;
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        writeln!(f)?;
        for (index, choice) in self.choices.iter().enumerate() {
            writeln!(f, "  {}) {}", index + 1, choice.label)?;
        }
        Ok(())
    }
}

fn welcome() -> Screen {
    Screen::new(Step::Welcome, "Welcome to the Theater Membership Prototype")
        .line("Are you a new user or an existing member?")
        .choice(Choice::new("New User", FlowAction::StartAsNewMember))
        .choice(Choice::new(
            "Existing User",
            FlowAction::ContinueAsExistingMember,
        ))
}

fn membership(catalog: &dyn Catalog) -> Screen {
    let mut screen = Screen::new(Step::Membership, "Theater Membership Signup");
    for plan in catalog.membership_plans() {
        screen = screen
            .line(format!("{} - {}", plan.name, plan.price))
            .line(format!("  Includes: {} shows", plan.shows_allowed));
        for perk in &plan.perks {
            screen = screen.line(format!("  + {perk}"));
        }
        screen = screen.choice(Choice::new(
            format!("Choose {}", plan.name),
            FlowAction::SelectPlan {
                plan: plan.name.clone(),
            },
        ));
    }
    screen
}

fn theater_selection(catalog: &dyn Catalog) -> Screen {
    let mut screen = Screen::new(Step::TheaterSelection, "Select Your Home Theater")
        .line("Choose one theater as your home base for membership perks.");
    for theater in catalog.theaters() {
        screen = screen
            .line(format!("{} ({})", theater.name, theater.location))
            .line(format!("  {}", theater.description))
            .choice(Choice::new(
                format!("Confirm {}", theater.name),
                FlowAction::ConfirmHomeTheater {
                    theater: theater.name.clone(),
                },
            ));
    }
    screen
}

fn booking_line(booking: &Booking, home_theater: Option<&str>) -> String {
    format!(
        "{} - {} at {} @ {}",
        booking.title,
        booking.date,
        booking.time_label(),
        booking.venue(home_theater).unwrap_or("Unknown Theater")
    )
}

fn dashboard(session: &Session) -> Screen {
    let mut screen = Screen::new(Step::AccountDashboard, "My Account Dashboard").line("Upcoming Events:");

    if session.booked_shows().is_empty() {
        screen = screen.line("  No events booked yet.");
    } else {
        for booking in session.booked_shows() {
            screen = screen.line(format!("  {}", booking_line(booking, session.home_theater())));
        }
        screen = screen.choice(Choice::new("View Event Details", FlowAction::ViewEventDetails));
    }

    screen
        .line(format!(
            "Home Theater: {}",
            session.home_theater().unwrap_or("Not Selected")
        ))
        .line(format!("Shows Remaining: {}", session.shows_remaining()))
        .choice(Choice::new(
            "Find Shows at Home Theater",
            FlowAction::FindShows {
                filter: ShowFilter::Home,
            },
        ))
        .choice(Choice::new(
            "Find Shows at Other Theaters",
            FlowAction::FindShows {
                filter: ShowFilter::Other,
            },
        ))
        .choice(Choice::new("Reset & Start Over", FlowAction::ResetSession))
}

fn discovery(session: &Session, catalog: &dyn Catalog) -> Screen {
    let home = session.home_theater();
    let title = match (session.show_filter(), home) {
        (Some(ShowFilter::Home), Some(home)) => format!("Shows at {home}"),
        (Some(ShowFilter::Home), None) => "Shows at Your Home Theater".to_string(),
        (Some(ShowFilter::Other), _) => "Shows at Other Theaters".to_string(),
        (None, _) => "Shows".to_string(),
    };
    let mut screen = Screen::new(Step::ShowDiscovery, title);

    let rows = session
        .show_filter()
        .map(|filter| listings(catalog, filter, home))
        .unwrap_or_default();
    if rows.is_empty() {
        screen = screen.line("No shows available.");
    }
    for listing in rows {
        let venue = listing
            .theater
            .as_deref()
            .or(home)
            .unwrap_or("Unknown Theater");
        screen = screen
            .line(format!(
                "{} - {} at {} @ {venue}",
                listing.show.title,
                listing.show.date,
                listing.show.time_label()
            ))
            .choice(Choice::new(
                format!("Book '{}'", listing.show.title),
                FlowAction::BookShow {
                    title: listing.show.title.clone(),
                    theater: listing.theater.clone(),
                },
            ));
    }

    screen.choice(Choice::new("Back to Dashboard", FlowAction::BackToDashboard))
}

fn perk_selection(session: &Session) -> Screen {
    let mut screen = Screen::new(Step::PerkSelection, "Add Perks");
    if let Some(booking) = session.selected_show() {
        screen = screen.line(booking_line(booking, session.home_theater()));
    }
    for kind in PerkKind::ALL {
        screen = screen.line(format!("  [{}] {}", perk_key(kind), kind.label()));
    }
    screen.choice(Choice::with_perk_prompt(
        "Confirm Booking",
        FlowAction::ConfirmPerks {
            perks: session.perks(),
        },
    ))
}

fn booking_confirmation(session: &Session) -> Screen {
    let mut screen =
        Screen::new(Step::BookingConfirmation, "Booking Confirmation").line("Your booking is confirmed!");
    if let Some(booking) = session.selected_show() {
        screen = screen.line(booking_line(booking, session.home_theater()));
    }
    screen.choice(Choice::new("Go to Event Home", FlowAction::GoToEventHome))
}

fn event_home(session: &Session) -> Screen {
    let mut screen = Screen::new(Step::EventHome, "Event Home Page");

    if let Some(booking) = session.selected_show() {
        screen = screen
            .line(booking.title.clone())
            .line(format!("Date: {} | Time: {}", booking.date, booking.time_label()))
            .line(format!(
                "Venue: {}",
                booking
                    .venue(session.home_theater())
                    .unwrap_or("Unknown Theater")
            ))
            .line(format!("Ticket: {}", ticket_payload(booking)));
    }

    let perks = session.perks();
    screen = screen.line("Your Perks:");
    let codes = perk_codes(&perks);
    if codes.is_empty() {
        screen = screen.line("  No perks selected.");
    }
    for code in codes {
        screen = screen.line(format!("  {code} voucher"));
    }

    screen = screen.line("Modify Your Perks:");
    for kind in PerkKind::ALL {
        let mark = if perks.contains(kind) { "x" } else { " " };
        screen = screen.line(format!(
            "  [{mark}] {} {} ({})",
            perk_key(kind),
            kind.label(),
            kind.price_label()
        ));
    }

    screen
        .choice(Choice::with_perk_prompt(
            "Update Perks",
            FlowAction::UpdatePerks { perks },
        ))
        .choice(Choice::new("Go to My Account", FlowAction::GoToAccount))
}

/// The word a renderer accepts for `kind` in a perk list
const fn perk_key(kind: PerkKind) -> &'static str {
    match kind {
        PerkKind::Snack => "snack",
        PerkKind::Drink => "drink",
        PerkKind::Parking => "parking",
    }
}
