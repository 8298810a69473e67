//! Domain types for the booking flow.
//!
//! Reference data (plans, theaters, shows) is immutable once loaded. The only
//! values the flow creates are [`Booking`]s and [`PerkSelection`]s.

use crate::error::FlowError;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a user session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random `SessionId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Steps
// ============================================================================

/// The screens a session can be on
///
/// The set is closed: an identifier outside it can only enter the system as
/// text, and parsing it fails with [`FlowError::UnknownStep`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Landing screen: new or existing member
    Welcome,
    /// Membership plan signup
    Membership,
    /// Home theater choice
    TheaterSelection,
    /// Upcoming events, browsing, membership status
    AccountDashboard,
    /// Show listing for the active filter
    ShowDiscovery,
    /// Add-ons for the show just booked
    PerkSelection,
    /// Booking confirmed
    BookingConfirmation,
    /// Ticket and perk codes for the selected show
    EventHome,
}

impl Step {
    /// Every step, in flow order
    pub const ALL: [Self; 8] = [
        Self::Welcome,
        Self::Membership,
        Self::TheaterSelection,
        Self::AccountDashboard,
        Self::ShowDiscovery,
        Self::PerkSelection,
        Self::BookingConfirmation,
        Self::EventHome,
    ];

    /// The step's stable identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Membership => "membership",
            Self::TheaterSelection => "theater_selection",
            Self::AccountDashboard => "account_dashboard",
            Self::ShowDiscovery => "show_discovery",
            Self::PerkSelection => "perk_selection",
            Self::BookingConfirmation => "booking_confirmation",
            Self::EventHome => "event_home",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| FlowError::UnknownStep(s.to_string()))
    }
}

/// Which shows the discovery step lists
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowFilter {
    /// Shows at the member's home theater
    Home,
    /// Shows at every other theater, tagged with their venue
    Other,
}

impl fmt::Display for ShowFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("home"),
            Self::Other => f.write_str("other"),
        }
    }
}

// ============================================================================
// Perks
// ============================================================================

/// Add-ons a member can attach to a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerkKind {
    /// Popcorn
    Snack,
    /// A drink
    Drink,
    /// Parking pass
    Parking,
}

impl PerkKind {
    /// Every perk kind, in display order
    pub const ALL: [Self; 3] = [Self::Snack, Self::Drink, Self::Parking];

    /// Name shown to the member
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Snack => "Popcorn",
            Self::Drink => "Drink",
            Self::Parking => "Parking",
        }
    }

    /// Add-on price shown when modifying perks
    #[must_use]
    pub const fn price_label(self) -> &'static str {
        match self {
            Self::Snack => "$5",
            Self::Drink => "$4",
            Self::Parking => "$10",
        }
    }
}

impl FromStr for PerkKind {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snack" | "popcorn" => Ok(Self::Snack),
            "drink" => Ok(Self::Drink),
            "parking" => Ok(Self::Parking),
            other => Err(FlowError::InvalidPayload(format!("unknown perk '{other}'"))),
        }
    }
}

/// The member's perk choices
///
/// Exactly the three known kinds; keys missing from serialized input read as
/// `false`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PerkSelection {
    /// Popcorn
    pub snack: bool,
    /// Drink
    pub drink: bool,
    /// Parking
    pub parking: bool,
}

impl PerkSelection {
    /// Builds a selection with the given kinds set
    pub fn from_kinds(kinds: impl IntoIterator<Item = PerkKind>) -> Self {
        kinds
            .into_iter()
            .fold(Self::default(), |selection, kind| selection.with(kind, true))
    }

    /// Whether `kind` is selected
    #[must_use]
    pub const fn contains(&self, kind: PerkKind) -> bool {
        match kind {
            PerkKind::Snack => self.snack,
            PerkKind::Drink => self.drink,
            PerkKind::Parking => self.parking,
        }
    }

    /// Returns a copy with `kind` set to `enabled`
    #[must_use]
    pub const fn with(mut self, kind: PerkKind, enabled: bool) -> Self {
        match kind {
            PerkKind::Snack => self.snack = enabled,
            PerkKind::Drink => self.drink = enabled,
            PerkKind::Parking => self.parking = enabled,
        }
        self
    }

    /// Selected kinds, in display order
    pub fn selected(&self) -> impl Iterator<Item = PerkKind> + '_ {
        PerkKind::ALL.into_iter().filter(|kind| self.contains(*kind))
    }

    /// Whether nothing is selected
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.snack || self.drink || self.parking)
    }
}

impl FromStr for PerkSelection {
    type Err = FlowError;

    /// Parses a comma-separated list such as `"snack, parking"`.
    /// An empty string selects nothing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(PerkKind::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::from_kinds)
    }
}

// ============================================================================
// Reference data
// ============================================================================

/// A membership plan offered at signup
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipPlan {
    /// Plan name, unique within the catalog
    pub name: String,
    /// Price label, e.g. `$99/year`
    pub price: String,
    /// Shows included per season
    pub shows_allowed: u32,
    /// Benefits, in display order
    pub perks: Vec<String>,
}

/// A theater a member can call home
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theater {
    /// Theater name, unique within the catalog
    pub name: String,
    /// City and state
    pub location: String,
    /// One-line description
    pub description: String,
}

/// A scheduled performance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Show {
    /// Show title
    pub title: String,
    /// Performance date
    pub date: NaiveDate,
    /// Curtain time
    pub time: NaiveTime,
}

impl Show {
    /// Curtain time as shown to members, e.g. `7:00 PM`
    #[must_use]
    pub fn time_label(&self) -> String {
        format_time(self.time)
    }
}

/// A show paired with the theater that stages it
///
/// Built fresh for each listing; catalog shows are never tagged in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedShow {
    /// Owning theater name
    pub theater: String,
    /// The show
    pub show: Show,
}

/// One bookable row on the discovery screen
///
/// `theater` is present only for the "other theaters" listing; home listings
/// imply the member's home theater.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Listing {
    /// The show
    pub show: Show,
    /// Theater tag, if not the home theater
    pub theater: Option<String>,
}

/// A confirmed reservation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Show title
    pub title: String,
    /// Performance date
    pub date: NaiveDate,
    /// Curtain time
    pub time: NaiveTime,
    /// Venue tag, present when booked from another theater's listing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theater: Option<String>,
    /// When the booking was made
    pub booked_at: DateTime<Utc>,
}

impl Booking {
    /// Records a booking for a discovery listing
    #[must_use]
    pub fn from_listing(listing: Listing, booked_at: DateTime<Utc>) -> Self {
        Self {
            title: listing.show.title,
            date: listing.show.date,
            time: listing.show.time,
            theater: listing.theater,
            booked_at,
        }
    }

    /// Where the show plays: the tag if present, otherwise the home theater
    #[must_use]
    pub fn venue<'a>(&'a self, home_theater: Option<&'a str>) -> Option<&'a str> {
        self.theater.as_deref().or(home_theater)
    }

    /// Curtain time as shown to members, e.g. `7:00 PM`
    #[must_use]
    pub fn time_label(&self) -> String {
        format_time(self.time)
    }
}

fn format_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}
