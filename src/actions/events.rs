use serde::{Deserialize, Serialize};

use crate::calendar::{EventDescriptor, StoredEvent, event::parse_event_time};
use crate::google::{ListQuery, SendUpdates};
use crate::validation::is_email;

use super::{ActionContext, ActionError};

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const MAX_PAGE_SIZE: u32 = 2500;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsInput {
    pub count: Option<u32>,
    pub page_token: Option<String>,
    pub time_min: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsOutput {
    pub events: Vec<StoredEvent>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    #[serde(flatten)]
    pub event: EventDescriptor,
    #[serde(default)]
    pub send_updates: SendUpdates,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventOutput {
    pub event_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventInput {
    pub event_id: String,
    #[serde(flatten)]
    pub event: EventDescriptor,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventIdInput {
    pub event_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMutationOutput {
    pub event_id: String,
    pub success: bool,
}

impl ListEventsInput {
    fn into_query(self) -> Result<ListQuery, ActionError> {
        let max_results = self.count.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&max_results) {
            return Err(ActionError::InvalidInput(format!(
                "count must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, max_results
            )));
        }

        if let Some(time_min) = &self.time_min {
            parse_event_time(time_min)?;
        }

        Ok(ListQuery {
            max_results,
            page_token: self.page_token,
            time_min: self.time_min,
        })
    }
}

impl EventIdInput {
    fn require(self) -> Result<String, ActionError> {
        self.event_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ActionError::InvalidInput("eventId is required".to_string()))
    }
}

pub fn validate_event(event: &EventDescriptor) -> Result<(), ActionError> {
    if event.duration_minutes()? < 0 {
        return Err(ActionError::InvalidInput(
            "endDateTime must not be before startDateTime".to_string(),
        ));
    }

    if let Some(bad) = event.attendees.iter().find(|a| !is_email(&a.email)) {
        return Err(ActionError::InvalidInput(format!(
            "attendee email is not valid: '{}'",
            bad.email
        )));
    }

    if let Some(conference) = &event.conference_data
        && conference.create_request.request_id.trim().is_empty()
    {
        return Err(ActionError::InvalidInput(
            "conferenceData.createRequest.requestId must not be empty".to_string(),
        ));
    }

    Ok(())
}

pub async fn list_events(ctx: &ActionContext<'_>, input: ListEventsInput) -> Result<ListEventsOutput, ActionError> {
    let query = input.into_query()?;
    let client = ctx.clients.calendar_client().await?;

    let page = client.list_events(&ctx.config.calendar_id, &query).await?;

    Ok(ListEventsOutput {
        events: page.events,
        next_page_token: page.next_page_token,
    })
}

pub async fn create_event(ctx: &ActionContext<'_>, input: CreateEventInput) -> Result<CreateEventOutput, ActionError> {
    validate_event(&input.event)?;
    let client = ctx.clients.calendar_client().await?;

    let created = client
        .create_event(&ctx.config.calendar_id, &input.event, input.send_updates)
        .await?;

    Ok(CreateEventOutput { event_id: created.id })
}

pub async fn read_event(ctx: &ActionContext<'_>, input: EventIdInput) -> Result<StoredEvent, ActionError> {
    let event_id = input.require()?;
    let client = ctx.clients.calendar_client().await?;

    Ok(client.get_event(&ctx.config.calendar_id, &event_id).await?)
}

pub async fn update_event(ctx: &ActionContext<'_>, input: UpdateEventInput) -> Result<EventMutationOutput, ActionError> {
    let event_id = EventIdInput { event_id: Some(input.event_id) }.require()?;
    validate_event(&input.event)?;
    let client = ctx.clients.calendar_client().await?;

    client
        .update_event(&ctx.config.calendar_id, &event_id, &input.event)
        .await?;

    Ok(EventMutationOutput { event_id, success: true })
}

pub async fn delete_event(ctx: &ActionContext<'_>, input: EventIdInput) -> Result<EventMutationOutput, ActionError> {
    let event_id = input.require()?;
    let client = ctx.clients.calendar_client().await?;

    client.delete_event(&ctx.config.calendar_id, &event_id).await?;

    Ok(EventMutationOutput { event_id, success: true })
}
