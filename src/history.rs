use std::sync::Arc;

use crate::common::Message;
use crate::error::ChatError;
use crate::storage::MessageStore;

/// Synchronous backlog fetch used when a chat screen loads.
pub struct HistoryApi {
    store: Arc<MessageStore>,
}

impl HistoryApi {
    pub fn new(store: Arc<MessageStore>) -> Self {
        Self { store }
    }

    /// Ordered history of the conversation between `sender_id` and
    /// `receiver_id`, readable only by one of the two parties.
    ///
    /// `requester_id` is the authenticated session user, not a field of the
    /// request body, so a client cannot read someone else's conversation by
    /// claiming their id.
    pub fn fetch_history(
        &self,
        requester_id: &str,
        sender_id: &str,
        receiver_id: &str,
    ) -> Result<Vec<Message>, ChatError> {
        if requester_id != sender_id && requester_id != receiver_id {
            return Err(ChatError::Forbidden(requester_id.to_string()));
        }
        self.store.history(sender_id, receiver_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_with_message() -> HistoryApi {
        let store = Arc::new(MessageStore::in_memory().unwrap());
        store.append("u1", "u2", "hello").unwrap();
        HistoryApi::new(store)
    }

    #[test]
    fn party_may_read_either_direction() {
        let api = api_with_message();
        assert_eq!(api.fetch_history("u1", "u1", "u2").unwrap().len(), 1);
        assert_eq!(api.fetch_history("u2", "u1", "u2").unwrap().len(), 1);
    }

    #[test]
    fn outsider_is_forbidden() {
        let api = api_with_message();
        match api.fetch_history("u3", "u1", "u2") {
            Err(ChatError::Forbidden(who)) => assert_eq!(who, "u3"),
            other => panic!("expected forbidden, got {other:?}"),
        }
    }
}
