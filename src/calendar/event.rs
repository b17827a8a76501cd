use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EventTimeError {
    #[error("Invalid date-time '{0}': expected RFC3339 (e.g. 2023-12-31T10:00:00.000Z)")]
    Unparseable(String),
}

/// Event fields as accepted by the actions and as read back from the calendar.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDescriptor {
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start_date_time: String,
    pub end_date_time: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<Attendee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference_data: Option<ConferenceData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub email: String,
    #[serde(default = "default_response_status")]
    pub response_status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceData {
    pub create_request: CreateConferenceRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConferenceRequest {
    pub request_id: String,
}

/// An event as held by the remote calendar, keyed by its provider-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEvent {
    pub event_id: Option<String>,
    pub event: EventDescriptor,
}

fn default_response_status() -> String {
    "accepted".to_string()
}

impl Attendee {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            response_status: default_response_status(),
        }
    }
}

impl EventDescriptor {
    pub fn start(&self) -> Result<DateTime<Utc>, EventTimeError> {
        parse_event_time(&self.start_date_time)
    }

    pub fn end(&self) -> Result<DateTime<Utc>, EventTimeError> {
        parse_event_time(&self.end_date_time)
    }

    pub fn duration_minutes(&self) -> Result<i64, EventTimeError> {
        Ok((self.end()? - self.start()?).num_minutes())
    }
}

/// Parses an RFC3339 timestamp, or a bare `YYYY-MM-DD` date taken as UTC midnight.
pub fn parse_event_time(value: &str) -> Result<DateTime<Utc>, EventTimeError> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| EventTimeError::Unparseable(value.to_string()))
}
