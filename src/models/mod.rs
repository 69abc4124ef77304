mod api;
mod booking;
mod schedule;
mod timeslot;

pub use api::*;
pub use booking::*;
pub use schedule::*;
pub use timeslot::*;
