//! Bookable dates and time slots

use jiff::{ToSpan, civil::Date};

/// Slots offered on every bookable day.
pub const TIME_SLOTS: [&str; 5] = [
    "09:00 AM - 11:00 AM",
    "11:00 AM - 01:00 PM",
    "01:00 PM - 03:00 PM",
    "03:00 PM - 05:00 PM",
    "05:00 PM - 07:00 PM",
];

/// How many days ahead, including today, can be booked.
pub const BOOKING_WINDOW_DAYS: i64 = 7;

/// Bookable dates starting today.
#[must_use]
pub fn available_dates(today: Date) -> Vec<Date> {
    (0..BOOKING_WINDOW_DAYS)
        .filter_map(|offset| today.checked_add(offset.days()).ok())
        .collect()
}

/// Whether `slot` is one of [`TIME_SLOTS`].
#[must_use]
pub fn is_known_slot(slot: &str) -> bool {
    TIME_SLOTS.contains(&slot)
}
