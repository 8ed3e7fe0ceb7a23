use std::sync::Arc;

use crate::common::{ConnectionId, Message, ServerEvent};
use crate::error::ChatError;
use crate::presence::PresenceRegistry;
use crate::storage::MessageStore;

/// Persist-then-fan-out path for inbound messages.
pub struct MessageRouter {
    store: Arc<MessageStore>,
    presence: PresenceRegistry,
}

impl MessageRouter {
    pub fn new(store: Arc<MessageStore>, presence: PresenceRegistry) -> Self {
        Self { store, presence }
    }

    /// Validate, persist, then push the message to every live connection of
    /// the receiver and to the sender's other devices.
    ///
    /// `origin` is the connection the message arrived on; it never receives
    /// the echo. Pushes are fire-and-forget per connection: a channel that
    /// closed between lookup and push is logged and skipped, never retried,
    /// and never fails the dispatch since the message is already durable.
    pub fn dispatch(
        &self,
        sender_id: &str,
        receiver_id: &str,
        content: &str,
        origin: Option<ConnectionId>,
    ) -> Result<Message, ChatError> {
        if content.trim().is_empty() {
            return Err(ChatError::Validation("content must not be empty".into()));
        }
        if sender_id == receiver_id {
            return Err(ChatError::Validation(
                "sender and receiver must be distinct".into(),
            ));
        }

        let message = self.store.append(sender_id, receiver_id, content)?;
        log::debug!(
            "persisted message {} from {} to {}",
            message.id,
            message.sender_id,
            message.receiver_id
        );

        let event = ServerEvent::Message {
            message: message.clone(),
        };
        self.push_to(receiver_id, &event, None);
        // Multi-device echo keeps the sender's other sessions consistent.
        self.push_to(sender_id, &event, origin);

        Ok(message)
    }

    fn push_to(&self, user_id: &str, event: &ServerEvent, skip: Option<ConnectionId>) {
        for (connection_id, sender) in self.presence.senders_for(user_id) {
            if Some(connection_id) == skip {
                continue;
            }
            if sender.send(event.clone()).is_err() {
                log::debug!("connection {connection_id} of {user_id} closed before delivery");
            }
        }
    }
}
