use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::google::{ApiError, AuthError, ClientFactory};

use super::message::{ComposeError, InvitationRequest, compose_invitation};

#[derive(Debug, Error)]
pub enum InvitationError {
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
    #[error("Mail transport error: {0}")]
    Transport(#[from] ApiError),
}

/// `event_id` is the id the mail provider assigned to the delivered message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationOutcome {
    pub event_id: String,
    pub success: bool,
}

/// Composes the invitation as `sender` and hands it to the mail transport.
///
/// Composition runs before any token is requested, so malformed requests
/// never reach the network. Failures are returned unlogged; the action
/// dispatcher records them.
pub async fn send_invitation(
    clients: &dyn ClientFactory,
    sender: &str,
    request: &InvitationRequest,
) -> Result<InvitationOutcome, InvitationError> {
    let message = compose_invitation(request, sender)?;
    tracing::info!(
        "Composed invitation {} for {} recipient(s)",
        message.message_id,
        request.to.len()
    );

    let transport = clients.mail_transport().await?;
    let delivered = transport.send_raw(sender, &message).await?;

    Ok(InvitationOutcome {
        event_id: delivered.id,
        success: true,
    })
}
