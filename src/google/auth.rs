use crate::config::{ApiConfig, GoogleConfig};
use async_trait::async_trait;
use thiserror::Error;
use yup_oauth2::{ServiceAccountAuthenticator, ServiceAccountKey};

pub const CALENDAR_SCOPES: &[&str] = &["https://www.googleapis.com/auth/calendar"];

pub const MAIL_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.send",
    "https://www.googleapis.com/auth/gmail.modify",
    "https://www.googleapis.com/auth/gmail.compose",
];

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid service account key: {0}")]
    InvalidKey(#[from] serde_json::Error),
    #[error("Failed to build authenticator: {0}")]
    AuthenticatorError(#[from] std::io::Error),
    #[error("OAuth error: {0}")]
    OAuthError(#[from] yup_oauth2::Error),
    #[error("Token response did not contain an access token")]
    MissingAccessToken,
}

/// Source of bearer tokens for the Google REST clients.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self, scopes: &[&'static str]) -> Result<String, AuthError>;
}

/// Service-account JWT flow impersonating the delegated sender.
pub struct ServiceAccountTokenSource {
    key: ServiceAccountKey,
    subject: String,
}

impl ServiceAccountTokenSource {
    pub fn from_config(google: &GoogleConfig, api: &ApiConfig) -> Result<Self, AuthError> {
        let key: ServiceAccountKey = serde_json::from_value(serde_json::json!({
            "type": "service_account",
            "client_email": google.client_email,
            "private_key": normalize_private_key(&google.private_key),
            "token_uri": api.token_uri,
        }))?;

        Ok(Self {
            key,
            subject: google.subject.clone(),
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self, scopes: &[&'static str]) -> Result<String, AuthError> {
        tracing::debug!("Requesting token for {} with scopes {:?}", self.subject, scopes);

        let auth = ServiceAccountAuthenticator::builder(self.key.clone())
            .subject(self.subject.clone())
            .build()
            .await?;

        let token = auth.token(scopes).await.map_err(|e| {
            tracing::error!("Token exchange failed for {}: {}", self.subject, e);
            e
        })?;

        token
            .token()
            .map(str::to_string)
            .ok_or(AuthError::MissingAccessToken)
    }
}

/// Keys pasted from the downloaded JSON often carry literal `\n` sequences.
pub fn normalize_private_key(key: &str) -> String {
    key.replace("\\n", "\n")
}
