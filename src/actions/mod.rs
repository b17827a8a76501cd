//! Named actions exposed to the host: input validation, dispatch, and the
//! normalized error every action failure is reported as.

pub mod events;
pub mod invitation;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

use crate::calendar::EventTimeError;
use crate::calendar::ics::IcsError;
use crate::config::GoogleConfig;
use crate::google::{ApiError, AuthError, ClientFactory};
use crate::mail::{ComposeError, InvitationError};

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unknown action: {0}")]
    UnknownAction(String),
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
    #[error("Transport failure: {0}")]
    Transport(#[from] ApiError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<EventTimeError> for ActionError {
    fn from(err: EventTimeError) -> Self {
        ActionError::InvalidInput(err.to_string())
    }
}

impl From<IcsError> for ActionError {
    fn from(err: IcsError) -> Self {
        ActionError::InvalidInput(err.to_string())
    }
}

impl From<ComposeError> for ActionError {
    fn from(err: ComposeError) -> Self {
        ActionError::InvalidInput(err.to_string())
    }
}

impl From<InvitationError> for ActionError {
    fn from(err: InvitationError) -> Self {
        match err {
            InvitationError::Compose(e) => e.into(),
            InvitationError::Auth(e) => e.into(),
            InvitationError::Transport(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionName {
    ListEvents,
    CreateEvent,
    ReadEvent,
    UpdateEvent,
    DeleteEvent,
    SendInvitation,
}

impl ActionName {
    pub const ALL: [&'static str; 10] = [
        "listEvents",
        "createEvent",
        "updateEvent",
        "deleteEvent",
        "sendInvitation",
        "eventList",
        "eventCreate",
        "eventRead",
        "eventUpdate",
        "eventDelete",
    ];
}

impl FromStr for ActionName {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "listEvents" | "eventList" => Ok(ActionName::ListEvents),
            "createEvent" | "eventCreate" => Ok(ActionName::CreateEvent),
            "eventRead" => Ok(ActionName::ReadEvent),
            "updateEvent" | "eventUpdate" => Ok(ActionName::UpdateEvent),
            "deleteEvent" | "eventDelete" => Ok(ActionName::DeleteEvent),
            "sendInvitation" => Ok(ActionName::SendInvitation),
            other => Err(ActionError::UnknownAction(other.to_string())),
        }
    }
}

/// Everything an action handler needs: configuration plus a way to obtain
/// authorized API handles.
pub struct ActionContext<'a> {
    pub config: &'a GoogleConfig,
    pub clients: &'a dyn ClientFactory,
}

pub async fn dispatch(ctx: &ActionContext<'_>, action: &str, input: Value) -> Result<Value, ActionError> {
    let name: ActionName = action.parse()?;
    tracing::info!("Running action {}", action);

    let result = run(ctx, name, input).await;

    if let Err(e) = &result {
        tracing::error!("Error while running {}: {}", action, e);
    }

    result
}

async fn run(ctx: &ActionContext<'_>, name: ActionName, input: Value) -> Result<Value, ActionError> {
    match name {
        ActionName::ListEvents => to_output(events::list_events(ctx, parse_input(input)?).await),
        ActionName::CreateEvent => to_output(events::create_event(ctx, parse_input(input)?).await),
        ActionName::ReadEvent => to_output(events::read_event(ctx, parse_input(input)?).await),
        ActionName::UpdateEvent => to_output(events::update_event(ctx, parse_input(input)?).await),
        ActionName::DeleteEvent => to_output(events::delete_event(ctx, parse_input(input)?).await),
        ActionName::SendInvitation => {
            to_output(invitation::send_invitation(ctx, parse_input(input)?).await)
        }
    }
}

fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T, ActionError> {
    // A missing input object means "all defaults" for the all-optional inputs.
    let input = if input.is_null() { Value::Object(Default::default()) } else { input };
    serde_json::from_value(input).map_err(|e| ActionError::InvalidInput(e.to_string()))
}

fn to_output<T: Serialize>(result: Result<T, ActionError>) -> Result<Value, ActionError> {
    Ok(serde_json::to_value(result?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::factory::MockClientFactory;
    use serde_json::json;

    fn google_config() -> GoogleConfig {
        GoogleConfig {
            calendar_id: "primary".to_string(),
            client_email: "svc@project.iam.gserviceaccount.com".to_string(),
            private_key: "key".to_string(),
            subject: "org@x.com".to_string(),
        }
    }

    #[test]
    fn every_listed_action_name_parses() {
        for name in ActionName::ALL {
            assert!(name.parse::<ActionName>().is_ok(), "{} should parse", name);
        }
    }

    #[test]
    fn entity_aliases_map_to_the_same_action() {
        assert_eq!("eventList".parse::<ActionName>().unwrap(), ActionName::ListEvents);
        assert_eq!("listEvents".parse::<ActionName>().unwrap(), ActionName::ListEvents);
        assert_eq!("eventRead".parse::<ActionName>().unwrap(), ActionName::ReadEvent);
    }

    #[tokio::test]
    async fn unknown_action_is_rejected() {
        let config = google_config();
        let clients = MockClientFactory::new();
        let ctx = ActionContext { config: &config, clients: &clients };

        let result = dispatch(&ctx, "archiveEvent", json!({})).await;

        assert!(matches!(result, Err(ActionError::UnknownAction(name)) if name == "archiveEvent"));
    }

    #[tokio::test]
    async fn malformed_input_is_invalid_input() {
        let config = google_config();
        let mut clients = MockClientFactory::new();
        clients.expect_calendar_client().never();
        let ctx = ActionContext { config: &config, clients: &clients };

        let result = dispatch(&ctx, "createEvent", json!({"summary": 42})).await;

        assert!(matches!(result, Err(ActionError::InvalidInput(_))));
    }

    #[test]
    fn compose_errors_become_invalid_input() {
        let err: ActionError = InvitationError::Compose(ComposeError::NoRecipients).into();

        match err {
            ActionError::InvalidInput(msg) => assert!(msg.contains("destination addresses")),
            other => panic!("expected invalid input, got {:?}", other),
        }
    }

    #[test]
    fn transport_errors_stay_transport_errors() {
        let err: ActionError = InvitationError::Transport(ApiError::RateLimited).into();

        assert!(matches!(err, ActionError::Transport(ApiError::RateLimited)));
    }
}
