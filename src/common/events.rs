use serde::{Deserialize, Serialize};

use super::types::{Message, UserId};
use crate::error::ChatError;

/// Events the server pushes up a session socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Authentication succeeded; the session is live.
    Ready { user_id: UserId },
    /// A message delivered live to this connection, either as recipient or
    /// as an echo to the sender's other devices.
    Message {
        #[serde(flatten)]
        message: Message,
    },
    /// Acknowledgement that this connection's own send was persisted.
    Sent {
        #[serde(flatten)]
        message: Message,
    },
    /// Backlog returned for a `history` command.
    History { messages: Vec<Message> },
    /// A command failed; `code` is one of auth|validation|persist|forbidden.
    Error { code: String, message: String },
}

impl ServerEvent {
    pub fn error(err: &ChatError) -> Self {
        ServerEvent::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}
