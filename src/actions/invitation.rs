use crate::mail::{self, InvitationOutcome, InvitationRequest};
use crate::validation::is_email;

use super::{ActionContext, ActionError, events::validate_event};

pub async fn send_invitation(
    ctx: &ActionContext<'_>,
    request: InvitationRequest,
) -> Result<InvitationOutcome, ActionError> {
    if let Some(bad) = request.to.iter().find(|address| !is_email(address)) {
        return Err(ActionError::InvalidInput(format!(
            "recipient is not a valid email address: '{}'",
            bad
        )));
    }

    if let Some(event) = &request.event {
        validate_event(event)?;
    }

    Ok(mail::send_invitation(ctx.clients, &ctx.config.subject, &request).await?)
}
