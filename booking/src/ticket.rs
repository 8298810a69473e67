//! Text payloads for entry tickets and perk vouchers.
//!
//! These strings are what a scanner would read; turning them into images is
//! left to whatever renders them.

use crate::types::{Booking, PerkKind, PerkSelection};

/// Entry ticket text, e.g. `Ticket for Hamlet at 7:00 PM on 2025-03-10`
#[must_use]
pub fn ticket_payload(booking: &Booking) -> String {
    format!(
        "Ticket for {} at {} on {}",
        booking.title,
        booking.time_label(),
        booking.date
    )
}

/// One voucher per selected perk, in display order
#[must_use]
pub fn perk_codes(perks: &PerkSelection) -> Vec<&'static str> {
    perks.selected().map(PerkKind::label).collect()
}
