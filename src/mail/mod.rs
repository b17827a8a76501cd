pub mod invitation;
pub mod message;

pub use invitation::{InvitationError, InvitationOutcome, send_invitation};
pub use message::{ComposeError, ComposedMessage, InvitationRequest, compose_invitation};
