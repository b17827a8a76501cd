use crate::config::ApiConfig;
use async_trait::async_trait;

use super::auth::{AuthError, CALENDAR_SCOPES, MAIL_SCOPES, TokenSource};
use super::calendar_api::{CalendarApi, GoogleCalendarClient};
use super::gmail_api::{GmailClient, MailTransport};

/// Produces authorized API handles; one handle per action invocation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn calendar_client(&self) -> Result<Box<dyn CalendarApi>, AuthError>;

    async fn mail_transport(&self) -> Result<Box<dyn MailTransport>, AuthError>;
}

pub struct GoogleClientFactory<T> {
    tokens: T,
    api: ApiConfig,
}

impl<T: TokenSource> GoogleClientFactory<T> {
    pub fn new(tokens: T, api: ApiConfig) -> Self {
        Self { tokens, api }
    }
}

#[async_trait]
impl<T: TokenSource> ClientFactory for GoogleClientFactory<T> {
    async fn calendar_client(&self) -> Result<Box<dyn CalendarApi>, AuthError> {
        let token = self.tokens.access_token(CALENDAR_SCOPES).await?;
        let client = GoogleCalendarClient::new(token).with_base_url(self.api.calendar_base_url.clone());
        Ok(Box::new(client))
    }

    async fn mail_transport(&self) -> Result<Box<dyn MailTransport>, AuthError> {
        let token = self.tokens.access_token(MAIL_SCOPES).await?;
        let client = GmailClient::new(token).with_base_url(self.api.gmail_base_url.clone());
        Ok(Box::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::auth::MockTokenSource;
    use crate::google::calendar_api::ListQuery;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn calendar_client_uses_calendar_scope_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(header("authorization", "Bearer cal-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .expect(1)
            .mount(&server)
            .await;

        let mut tokens = MockTokenSource::new();
        tokens
            .expect_access_token()
            .withf(|scopes| scopes == CALENDAR_SCOPES)
            .times(1)
            .returning(|_| Ok("cal-token".to_string()));

        let api = ApiConfig {
            calendar_base_url: server.uri(),
            ..ApiConfig::default()
        };
        let factory = GoogleClientFactory::new(tokens, api);
        let client = factory.calendar_client().await.unwrap();

        let query = ListQuery {
            max_results: 10,
            page_token: None,
            time_min: None,
        };
        let page = client.list_events("primary", &query).await.unwrap();

        assert!(page.events.is_empty());
    }

    #[test]
    fn mail_transport_requests_mail_scopes() {
        let mut tokens = MockTokenSource::new();
        tokens
            .expect_access_token()
            .withf(|scopes| scopes == MAIL_SCOPES)
            .times(1)
            .returning(|_| Ok("mail-token".to_string()));

        let factory = GoogleClientFactory::new(tokens, ApiConfig::default());

        assert!(tokio_test::block_on(factory.mail_transport()).is_ok());
    }

    #[tokio::test]
    async fn token_failure_is_propagated() {
        let mut tokens = MockTokenSource::new();
        tokens
            .expect_access_token()
            .returning(|_| Err(AuthError::MissingAccessToken));

        let factory = GoogleClientFactory::new(tokens, ApiConfig::default());
        let result = factory.calendar_client().await;

        assert!(matches!(result, Err(AuthError::MissingAccessToken)));
    }
}
