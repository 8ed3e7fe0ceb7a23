use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque user identifier issued by the authentication collaborator.
pub type UserId = String;

/// Unique per live socket, assigned by the session gateway at connect time.
pub type ConnectionId = Uuid;

/// Domain model representing one chat message.
///
/// Immutable once persisted; `id` and `created_at` are assigned by the
/// message store at insert time. Fields serialize camelCase to match the
/// web client's JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    /// Unix milliseconds; the authoritative ordering key within a conversation.
    pub created_at: i64,
}
