use serde::{Deserialize, Serialize};

use super::types::UserId;

/// Commands a client sends down its session socket, one JSON object per line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ClientCommand {
    /// Must be the first frame on a new socket.
    Auth { token: String },
    /// Send a message to another user. `booking_id` is opaque correlation
    /// metadata from the booking workflow; it is logged, never stored.
    Send {
        receiver_id: UserId,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        booking_id: Option<String>,
    },
    /// Fetch the ordered backlog for a conversation. Mirrors the web app's
    /// `/api/getMessages` body; the requester is the authenticated session
    /// user, not whatever `sender_id` claims.
    History {
        sender_id: UserId,
        receiver_id: UserId,
    },
}
