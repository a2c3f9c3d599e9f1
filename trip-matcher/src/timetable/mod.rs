//! Timetable instantiation.
//!
//! Journey templates carry a local departure clock time and a chain of
//! timing links. For a given day, each template whose service period and
//! operating profile admit that day becomes a [`ScheduledJourney`] with
//! zone-aware stop times.
//!
//! [`ScheduledJourney`]: crate::domain::ScheduledJourney

mod instantiate;
mod template;

pub use instantiate::{TIMETABLE_ZONE, instantiate_day, instantiate_journey};
pub use template::{JourneyTemplate, LinkStop, ServiceTemplate, TimetableDocument, TimingLink};
