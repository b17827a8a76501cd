use crate::calendar::{Attendee, ConferenceData, CreateConferenceRequest, EventDescriptor, StoredEvent};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ApiError, ensure_success};

pub const DEFAULT_CALENDAR_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Who the calendar service notifies when an event is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SendUpdates {
    All,
    ExternalOnly,
    #[default]
    None,
}

impl SendUpdates {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendUpdates::All => "all",
            SendUpdates::ExternalOnly => "externalOnly",
            SendUpdates::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub max_results: u32,
    pub page_token: Option<String>,
    pub time_min: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventPage {
    pub events: Vec<StoredEvent>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedEventInfo {
    pub id: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    start: Option<GoogleDateTime>,
    end: Option<GoogleDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attendees: Option<Vec<GoogleAttendee>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conference_data: Option<GoogleConferenceData>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleAttendee {
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleConferenceData {
    create_request: Option<GoogleCreateRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleCreateRequest {
    request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    items: Option<Vec<GoogleEvent>>,
    next_page_token: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarApi: Send + Sync {
    async fn list_events(&self, calendar_id: &str, query: &ListQuery) -> Result<EventPage, ApiError>;

    async fn get_event(&self, calendar_id: &str, event_id: &str) -> Result<StoredEvent, ApiError>;

    async fn create_event(
        &self,
        calendar_id: &str,
        event: &EventDescriptor,
        send_updates: SendUpdates,
    ) -> Result<CreatedEventInfo, ApiError>;

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &EventDescriptor,
    ) -> Result<(), ApiError>;

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), ApiError>;
}

pub struct GoogleCalendarClient {
    base_url: String,
    access_token: String,
    client: reqwest::Client,
}

impl GoogleCalendarClient {
    pub fn new(access_token: String) -> Self {
        Self {
            base_url: DEFAULT_CALENDAR_BASE_URL.to_string(),
            access_token,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!("{}/calendars/{}/events", self.base_url, urlencoding::encode(calendar_id))
    }

    fn event_url(&self, calendar_id: &str, event_id: &str) -> String {
        format!("{}/{}", self.events_url(calendar_id), urlencoding::encode(event_id))
    }

    fn convert_from_google_event(&self, ge: GoogleEvent) -> StoredEvent {
        let time_text = |t: Option<GoogleDateTime>| {
            t.and_then(|t| t.date_time.or(t.date)).unwrap_or_default()
        };

        let attendees = ge
            .attendees
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| {
                let email = a.email?;
                let mut attendee = Attendee::new(email);
                if let Some(status) = a.response_status {
                    attendee.response_status = status;
                }
                Some(attendee)
            })
            .collect();

        let conference_data = ge
            .conference_data
            .and_then(|c| c.create_request)
            .and_then(|r| r.request_id)
            .map(|request_id| ConferenceData {
                create_request: CreateConferenceRequest { request_id },
            });

        StoredEvent {
            event_id: ge.id,
            event: EventDescriptor {
                summary: ge.summary.unwrap_or_default(),
                description: ge.description,
                location: ge.location,
                start_date_time: time_text(ge.start),
                end_date_time: time_text(ge.end),
                attendees,
                conference_data,
            },
        }
    }

    fn convert_to_google_event(&self, event: &EventDescriptor) -> GoogleEvent {
        GoogleEvent {
            id: None,
            summary: Some(event.summary.clone()),
            description: event.description.clone(),
            location: event.location.clone(),
            start: Some(GoogleDateTime {
                date_time: Some(event.start_date_time.clone()),
                date: None,
            }),
            end: Some(GoogleDateTime {
                date_time: Some(event.end_date_time.clone()),
                date: None,
            }),
            attendees: (!event.attendees.is_empty()).then(|| {
                event
                    .attendees
                    .iter()
                    .map(|a| GoogleAttendee {
                        email: Some(a.email.clone()),
                        response_status: Some(a.response_status.clone()),
                    })
                    .collect()
            }),
            conference_data: event.conference_data.as_ref().map(|c| GoogleConferenceData {
                create_request: Some(GoogleCreateRequest {
                    request_id: Some(c.create_request.request_id.clone()),
                }),
            }),
        }
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    async fn list_events(&self, calendar_id: &str, query: &ListQuery) -> Result<EventPage, ApiError> {
        let url = self.events_url(calendar_id);

        let mut params = vec![("maxResults", query.max_results.to_string())];
        if let Some(token) = &query.page_token {
            params.push(("pageToken", token.clone()));
        }
        if let Some(time_min) = &query.time_min {
            params.push(("timeMin", time_min.clone()));
        }

        tracing::info!("Listing up to {} events from {}", query.max_results, calendar_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&params)
            .send()
            .await?;

        let response = ensure_success(response, "List events", calendar_id).await?;
        let event_list: EventListResponse = response.json().await?;

        let events: Vec<StoredEvent> = event_list
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|ge| self.convert_from_google_event(ge))
            .collect();

        tracing::info!("Listed {} events successfully", events.len());
        Ok(EventPage {
            events,
            next_page_token: event_list.next_page_token,
        })
    }

    async fn get_event(&self, calendar_id: &str, event_id: &str) -> Result<StoredEvent, ApiError> {
        let url = self.event_url(calendar_id, event_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let response = ensure_success(response, "Read event", event_id).await?;
        let google_event: GoogleEvent = response.json().await?;

        Ok(self.convert_from_google_event(google_event))
    }

    async fn create_event(
        &self,
        calendar_id: &str,
        event: &EventDescriptor,
        send_updates: SendUpdates,
    ) -> Result<CreatedEventInfo, ApiError> {
        let url = self.events_url(calendar_id);
        let google_event = self.convert_to_google_event(event);

        let mut params = vec![("sendUpdates", send_updates.as_str())];
        if event.conference_data.is_some() {
            params.push(("conferenceDataVersion", "1"));
        }

        tracing::info!("Creating event: {} on {}", event.summary, event.start_date_time);
        tracing::debug!("POST {} with payload: {:?}", url, google_event);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .query(&params)
            .json(&google_event)
            .send()
            .await?;

        let response = ensure_success(response, "Create event", calendar_id).await?;
        let created_event: GoogleEvent = response.json().await?;
        let id = created_event
            .id
            .ok_or_else(|| ApiError::ParseError("Missing event id in create response".to_string()))?;
        tracing::info!("Event created successfully with ID: {}", id);

        Ok(CreatedEventInfo { id })
    }

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &EventDescriptor,
    ) -> Result<(), ApiError> {
        let url = self.event_url(calendar_id, event_id);
        let google_event = self.convert_to_google_event(event);

        tracing::info!("Updating event {}: {}", event_id, event.summary);
        tracing::debug!("PUT {} with payload: {:?}", url, google_event);

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.access_token)
            .json(&google_event)
            .send()
            .await?;

        ensure_success(response, "Update event", event_id).await?;

        tracing::info!("Event {} updated successfully", event_id);
        Ok(())
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), ApiError> {
        let url = self.event_url(calendar_id, event_id);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        ensure_success(response, "Delete event", event_id).await?;

        tracing::info!("Event {} deleted", event_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_event() -> EventDescriptor {
        EventDescriptor {
            summary: "Planning".to_string(),
            description: Some("Quarterly planning".to_string()),
            location: None,
            start_date_time: "2023-12-31T10:00:00.000Z".to_string(),
            end_date_time: "2023-12-31T12:00:00.000Z".to_string(),
            attendees: vec![Attendee::new("a@x.com")],
            conference_data: None,
        }
    }

    fn client_for(server: &MockServer) -> GoogleCalendarClient {
        GoogleCalendarClient::new("token".to_string()).with_base_url(server.uri())
    }

    #[test]
    fn google_calendar_client_has_default_base_url() {
        let client = GoogleCalendarClient::new("token".to_string());

        assert_eq!(client.base_url, "https://www.googleapis.com/calendar/v3");
    }

    #[test]
    fn custom_base_url_drops_trailing_slash() {
        let client = GoogleCalendarClient::new("token".to_string())
            .with_base_url("http://localhost:8080/".to_string());

        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn calendar_ids_are_percent_encoded() {
        let client = GoogleCalendarClient::new("token".to_string());

        assert_eq!(
            client.event_url("team@group.calendar.google.com", "ev 1"),
            "https://www.googleapis.com/calendar/v3/calendars/team%40group.calendar.google.com/events/ev%201"
        );
    }

    #[test]
    fn send_updates_serializes_like_the_api() {
        assert_eq!(SendUpdates::ExternalOnly.as_str(), "externalOnly");
        assert_eq!(serde_json::to_value(SendUpdates::All).unwrap(), json!("all"));
        assert_eq!(SendUpdates::default(), SendUpdates::None);
    }

    #[tokio::test]
    async fn list_events_returns_page_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(header("authorization", "Bearer token"))
            .and(query_param("maxResults", "5"))
            .and(query_param("timeMin", "2023-12-01T00:00:00Z"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {
                        "id": "ev1",
                        "summary": "Lunch",
                        "start": {"dateTime": "2023-12-31T10:00:00Z"},
                        "end": {"dateTime": "2023-12-31T11:00:00Z"},
                        "attendees": [{"email": "a@x.com", "responseStatus": "needsAction"}]
                    },
                    {
                        "id": "ev2",
                        "start": {"date": "2024-01-01"},
                        "end": {"date": "2024-01-02"}
                    }
                ],
                "nextPageToken": "page-2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = ListQuery {
            max_results: 5,
            page_token: None,
            time_min: Some("2023-12-01T00:00:00Z".to_string()),
        };
        let page = client_for(&server).list_events("primary", &query).await.unwrap();

        assert_eq!(page.next_page_token.as_deref(), Some("page-2"));
        assert_eq!(page.events.len(), 2);
        assert_eq!(page.events[0].event_id.as_deref(), Some("ev1"));
        assert_eq!(page.events[0].event.attendees[0].response_status, "needsAction");
        assert_eq!(page.events[1].event.summary, "");
        assert_eq!(page.events[1].event.start_date_time, "2024-01-01");
    }

    #[tokio::test]
    async fn create_event_posts_payload_and_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .and(query_param("sendUpdates", "all"))
            .and(body_partial_json(json!({
                "summary": "Planning",
                "start": {"dateTime": "2023-12-31T10:00:00.000Z"},
                "attendees": [{"email": "a@x.com", "responseStatus": "accepted"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "created-1",
                "htmlLink": "https://calendar.google.com/event?eid=abc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = client_for(&server)
            .create_event("primary", &sample_event(), SendUpdates::All)
            .await
            .unwrap();

        assert_eq!(created, CreatedEventInfo { id: "created-1".to_string() });
    }

    #[tokio::test]
    async fn create_event_with_conference_requests_meet_link() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .and(query_param("conferenceDataVersion", "1"))
            .and(body_partial_json(json!({
                "conferenceData": {"createRequest": {"requestId": "req-9"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "created-2"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut event = sample_event();
        event.conference_data = Some(ConferenceData {
            create_request: CreateConferenceRequest {
                request_id: "req-9".to_string(),
            },
        });

        let created = client_for(&server)
            .create_event("primary", &event, SendUpdates::None)
            .await
            .unwrap();

        assert_eq!(created.id, "created-2");
    }

    #[tokio::test]
    async fn get_event_missing_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = client_for(&server).get_event("primary", "gone").await;

        assert!(matches!(result, Err(ApiError::NotFound(id)) if id == "gone"));
    }

    #[tokio::test]
    async fn update_event_unauthorized_maps_to_authentication_failed() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/calendars/primary/events/ev1"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .update_event("primary", "ev1", &sample_event())
            .await;

        assert!(matches!(result, Err(ApiError::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn delete_event_succeeds_on_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/calendars/primary/events/ev1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).delete_event("primary", "ev1").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn server_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/calendars/primary/events/ev1"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
            .mount(&server)
            .await;

        let result = client_for(&server).delete_event("primary", "ev1").await;

        match result {
            Err(ApiError::RequestError(msg)) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("backend exploded"));
            }
            other => panic!("expected request error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn rate_limit_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let query = ListQuery {
            max_results: 100,
            page_token: None,
            time_min: None,
        };
        let result = client_for(&server).list_events("primary", &query).await;

        assert!(matches!(result, Err(ApiError::RateLimited)));
    }
}
