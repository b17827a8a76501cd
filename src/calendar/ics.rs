//! iCalendar (`.ics`) rendering for invitation attachments.
//!
//! Output lines are joined with a bare `\n`; the mail layer base64-encodes the
//! whole body so line endings never reach the wire unencoded.

use thiserror::Error;

use super::event::{EventDescriptor, EventTimeError, parse_event_time};

#[derive(Debug, Error, PartialEq)]
pub enum IcsError {
    #[error("Cannot create ICS file without calendar event")]
    MissingEvent,
    #[error(transparent)]
    InvalidTime(#[from] EventTimeError),
}

/// Converts an event timestamp to the compact UTC form `YYYYMMDDThhmmssZ`.
pub fn format_to_ical_date(value: &str) -> Result<String, EventTimeError> {
    let utc = parse_event_time(value)?;
    Ok(utc.format("%Y%m%dT%H%M%SZ").to_string())
}

pub fn render_invitation_calendar_body(
    event: Option<&EventDescriptor>,
    organizer: &str,
) -> Result<String, IcsError> {
    let event = event.ok_or(IcsError::MissingEvent)?;

    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "CALSCALE:GREGORIAN".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("SUMMARY:{}", text_value(&event.summary)),
        format!("DESCRIPTION:{}", text_value(event.description.as_deref().unwrap_or_default())),
        format!("LOCATION:{}", text_value(event.location.as_deref().unwrap_or_default())),
        format!("DTSTART:{}", format_to_ical_date(&event.start_date_time)?),
        format!("DTEND:{}", format_to_ical_date(&event.end_date_time)?),
        format!("ORGANIZER;CN={organizer}:MAILTO:{organizer}"),
    ];

    lines.extend(event.attendees.iter().map(|attendee| {
        format!(
            "ATTENDEE;CN={email};RSVP=TRUE;PARTSTAT=NEEDS-ACTION:MAILTO:{email}",
            email = attendee.email
        )
    }));

    lines.push("END:VEVENT".to_string());
    lines.push("END:VCALENDAR".to_string());

    Ok(lines.join("\n"))
}

/// Line breaks become the TEXT escape `\n` so a value stays on its property line.
fn text_value(value: &str) -> String {
    value.replace("\r\n", "\\n").replace(['\r', '\n'], "\\n")
}
