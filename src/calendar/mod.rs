pub mod event;
pub mod ics;

pub use event::{Attendee, ConferenceData, CreateConferenceRequest, EventDescriptor, EventTimeError, StoredEvent};
pub use ics::{format_to_ical_date, render_invitation_calendar_body};
