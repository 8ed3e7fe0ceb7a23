use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::auth::TokenVerifier;
use crate::common::{ConnectionId, Message, ServerEvent, UserId};
use crate::error::ChatError;
use crate::presence::PresenceRegistry;
use crate::router::MessageRouter;

/// Accepts client sessions: verifies the identity token, binds a push
/// channel, and tracks the connection in the presence registry.
pub struct SessionGateway {
    verifier: Arc<dyn TokenVerifier>,
    presence: PresenceRegistry,
    router: Arc<MessageRouter>,
}

impl SessionGateway {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        presence: PresenceRegistry,
        router: Arc<MessageRouter>,
    ) -> Self {
        Self {
            verifier,
            presence,
            router,
        }
    }

    /// Authenticate a token and open a live connection.
    ///
    /// On `ChatError::Auth` the attempt is refused and no presence entry
    /// exists. Verification may block on the external auth collaborator.
    pub async fn connect(&self, token: &str) -> Result<ConnectionHandle, ChatError> {
        let user_id = self.verifier.verify(token).await?;
        let connection_id = Uuid::new_v4();

        let (sender, events) = mpsc::unbounded_channel();
        self.presence
            .register(user_id.clone(), connection_id, sender);
        log::info!("user {user_id} connected as {connection_id}");

        Ok(ConnectionHandle {
            user_id,
            connection_id,
            events,
            router: self.router.clone(),
            presence: self.presence.clone(),
        })
    }

    /// Idempotent teardown for a connection id; safe to call after the
    /// handle has already been dropped.
    pub fn disconnect(&self, connection_id: ConnectionId) {
        self.presence.unregister(connection_id);
    }
}

/// Bidirectional handle for one live session.
///
/// Dropping the handle unregisters the connection, so no stale id can be
/// returned to a router that then fails to use it.
pub struct ConnectionHandle {
    user_id: UserId,
    connection_id: ConnectionId,
    events: mpsc::UnboundedReceiver<ServerEvent>,
    router: Arc<MessageRouter>,
    presence: PresenceRegistry,
}

impl ConnectionHandle {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Route a message from this session. The originating connection is
    /// excluded from the sender echo.
    pub fn send_message(&self, receiver_id: &str, content: &str) -> Result<Message, ChatError> {
        self.router
            .dispatch(&self.user_id, receiver_id, content, Some(self.connection_id))
    }

    /// Next event pushed to this connection; `None` once the session is torn
    /// down and the channel is drained.
    pub async fn recv(&mut self) -> Option<ServerEvent> {
        self.events.recv().await
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        self.presence.unregister(self.connection_id);
        log::info!("user {} disconnected ({})", self.user_id, self.connection_id);
    }
}
