pub mod auth;
pub mod calendar_api;
pub mod factory;
pub mod gmail_api;

use thiserror::Error;

pub use auth::{AuthError, ServiceAccountTokenSource, TokenSource, CALENDAR_SCOPES, MAIL_SCOPES};
pub use calendar_api::{CalendarApi, CreatedEventInfo, EventPage, GoogleCalendarClient, ListQuery, SendUpdates};
pub use factory::{ClientFactory, GoogleClientFactory};
pub use gmail_api::{DeliveryResult, GmailClient, MailTransport};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Maps a non-2xx Google API response onto `ApiError`, logging the failure.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    operation: &str,
    resource: &str,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    tracing::info!("{} response status: {}", operation, status);

    if status.is_success() {
        return Ok(response);
    }

    if status == 401 {
        tracing::error!("Authentication failed during {}", operation);
        return Err(ApiError::AuthenticationFailed);
    }

    if status == 404 {
        tracing::error!("{}: resource not found: {}", operation, resource);
        return Err(ApiError::NotFound(resource.to_string()));
    }

    if status == 429 {
        tracing::warn!("Rate limit exceeded during {}", operation);
        return Err(ApiError::RateLimited);
    }

    let body = response.text().await?;
    tracing::error!("{} failed. Status: {}, Body: {}", operation, status, body);
    Err(ApiError::RequestError(format!("Status {}: {}", status, body)))
}
