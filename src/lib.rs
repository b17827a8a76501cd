pub mod actions;
pub mod calendar;
pub mod config;
pub mod google;
pub mod mail;
pub mod validation;

pub use actions::{ActionContext, ActionError, ActionName, dispatch};
pub use calendar::{EventDescriptor, format_to_ical_date, render_invitation_calendar_body};
pub use config::Config;
pub use mail::{ComposedMessage, InvitationOutcome, InvitationRequest, compose_invitation, send_invitation};
