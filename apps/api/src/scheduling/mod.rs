// Interview scheduling: slot allocation, calendar booking, schedule listing.
// All calendar calls go through the CalendarService trait.

pub mod booking;
pub mod handlers;
pub mod listing;
pub mod slots;
