//! RFC2822/MIME assembly of calendar invitations.
//!
//! The composed text is a `multipart/mixed` message with a fixed boundary:
//! a plain-text part carrying the caller's body and a `text/calendar`
//! attachment (`invite.ics`, base64) carrying the rendered event. The whole
//! message is then base64url-encoded without padding, which is what the mail
//! provider's raw-send endpoint expects.

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::calendar::EventDescriptor;
use crate::calendar::ics::{IcsError, render_invitation_calendar_body};

pub const BOUNDARY: &str = "boundary-separator";

/// Body line width for base64 parts (RFC 2045).
const BASE64_LINE_WIDTH: usize = 76;

#[derive(Debug, Error, PartialEq)]
pub enum ComposeError {
    #[error("Cannot create message without destination addresses")]
    NoRecipients,
    #[error(transparent)]
    Calendar(#[from] IcsError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationRequest {
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub event: Option<EventDescriptor>,
}

/// A transport-ready message. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedMessage {
    pub raw: String,
    pub sender: String,
    pub message_id: String,
}

pub fn join_recipients(to: &[String]) -> Result<String, ComposeError> {
    if to.is_empty() {
        return Err(ComposeError::NoRecipients);
    }
    Ok(to.join(", "))
}

/// `Ddd, DD Mon YYYY hh:mm:ss +0000`, always in UTC.
pub fn rfc2822_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S +0000").to_string()
}

pub fn encode_base64_url(message: &str) -> String {
    URL_SAFE_NO_PAD.encode(message.as_bytes())
}

pub fn compose_invitation(
    request: &InvitationRequest,
    sender: &str,
) -> Result<ComposedMessage, ComposeError> {
    compose_invitation_at(request, sender, Utc::now(), Uuid::new_v4())
}

pub fn compose_invitation_at(
    request: &InvitationRequest,
    sender: &str,
    now: DateTime<Utc>,
    message_uuid: Uuid,
) -> Result<ComposedMessage, ComposeError> {
    let message_id = format!("{}.{}", message_uuid, sender);
    let text = render_rfc2822(request, sender, now, &message_id)?;

    Ok(ComposedMessage {
        raw: encode_base64_url(&text),
        sender: sender.to_string(),
        message_id,
    })
}

pub fn render_rfc2822(
    request: &InvitationRequest,
    sender: &str,
    now: DateTime<Utc>,
    message_id: &str,
) -> Result<String, ComposeError> {
    let recipients = join_recipients(&request.to)?;
    let calendar_body = render_invitation_calendar_body(request.event.as_ref(), sender)?;
    let attachment = wrap_base64(&STANDARD.encode(calendar_body.as_bytes()));

    // Present by now: the calendar body could not have rendered without it.
    let (summary, start) = request
        .event
        .as_ref()
        .map(|e| (e.summary.as_str(), e.start_date_time.as_str()))
        .unwrap_or_default();

    let lines = [
        format!("From: {}", header_value(sender)),
        format!("To: {}", header_value(&recipients)),
        format!("Bcc: {}", header_value(sender)),
        format!("Date: {}", rfc2822_date(now)),
        format!(
            "Subject: {}",
            header_value(&format!("Invitation: {} @ {} ({})", summary, start, sender))
        ),
        format!("Message-ID: {}", header_value(message_id)),
        "MIME-Version: 1.0".to_string(),
        format!("Content-Type: multipart/mixed; boundary=\"{BOUNDARY}\""),
        String::new(),
        format!("--{BOUNDARY}"),
        "Content-Type: text/plain; charset=\"UTF-8\"".to_string(),
        String::new(),
        request.body.clone(),
        String::new(),
        format!("--{BOUNDARY}"),
        "Content-Type: text/calendar; charset=UTF-8; method=REQUEST".to_string(),
        "Content-Disposition: attachment; filename=\"invite.ics\"".to_string(),
        "Content-Transfer-Encoding: base64".to_string(),
        String::new(),
        attachment,
        format!("--{BOUNDARY}--"),
        String::new(),
    ];

    Ok(lines.join("\n"))
}

fn wrap_base64(encoded: &str) -> String {
    encoded
        .as_bytes()
        .chunks(BASE64_LINE_WIDTH)
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Header values must stay on one line.
fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
