use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;

use crate::common::{ConnectionId, ServerEvent, UserId};

/// Sender half of a connection's push channel. The router clones these to
/// deliver events to specific live connections.
pub type ConnectionSender = mpsc::UnboundedSender<ServerEvent>;

#[derive(Default)]
struct RegistryInner {
    by_user: HashMap<UserId, HashMap<ConnectionId, ConnectionSender>>,
    by_conn: HashMap<ConnectionId, UserId>,
}

/// In-memory index of who is currently reachable for live delivery.
///
/// A user holds zero (offline), one, or many (multi-device) connections.
/// Nothing is persisted: after a restart everyone is offline until they
/// reconnect. All operations run under one mutex so a lookup never sees a
/// half-updated set.
#[derive(Clone, Default)]
pub struct PresenceRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register(&self, user_id: UserId, connection_id: ConnectionId, sender: ConnectionSender) {
        let mut inner = self.lock();
        inner.by_conn.insert(connection_id, user_id.clone());
        inner
            .by_user
            .entry(user_id)
            .or_default()
            .insert(connection_id, sender);
    }

    /// Remove a connection. Idempotent: unregistering an id that was never
    /// registered, or already removed, is a no-op.
    pub fn unregister(&self, connection_id: ConnectionId) {
        let mut inner = self.lock();
        let Some(user_id) = inner.by_conn.remove(&connection_id) else {
            return;
        };
        if let Some(connections) = inner.by_user.get_mut(&user_id) {
            connections.remove(&connection_id);
            if connections.is_empty() {
                inner.by_user.remove(&user_id);
            }
        }
    }

    /// Live connection ids for a user; empty when offline.
    pub fn connections_for(&self, user_id: &str) -> Vec<ConnectionId> {
        self.lock()
            .by_user
            .get(user_id)
            .map(|connections| connections.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Snapshot of a user's push channels for fan-out.
    pub fn senders_for(&self, user_id: &str) -> Vec<(ConnectionId, ConnectionSender)> {
        self.lock()
            .by_user
            .get(user_id)
            .map(|connections| {
                connections
                    .iter()
                    .map(|(id, sender)| (*id, sender.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sender() -> ConnectionSender {
        mpsc::unbounded_channel().0
    }

    #[test]
    fn register_then_unregister_leaves_user_offline() {
        let registry = PresenceRegistry::new();
        let conn = Uuid::new_v4();

        registry.register("u1".into(), conn, sender());
        assert_eq!(registry.connections_for("u1"), vec![conn]);

        registry.unregister(conn);
        assert!(registry.connections_for("u1").is_empty());
    }

    #[test]
    fn unregister_absent_connection_is_a_noop() {
        let registry = PresenceRegistry::new();
        registry.unregister(Uuid::new_v4());

        let conn = Uuid::new_v4();
        registry.register("u1".into(), conn, sender());
        registry.unregister(conn);
        // Double unregister after a close race.
        registry.unregister(conn);
        assert!(registry.connections_for("u1").is_empty());
    }

    #[test]
    fn user_may_hold_multiple_connections() {
        let registry = PresenceRegistry::new();
        let c1 = Uuid::new_v4();
        let c2 = Uuid::new_v4();

        registry.register("u1".into(), c1, sender());
        registry.register("u1".into(), c2, sender());

        let mut connections = registry.connections_for("u1");
        connections.sort();
        let mut expected = vec![c1, c2];
        expected.sort();
        assert_eq!(connections, expected);

        registry.unregister(c1);
        assert_eq!(registry.connections_for("u1"), vec![c2]);
    }

    #[test]
    fn senders_snapshot_matches_registered_connections() {
        let registry = PresenceRegistry::new();
        let conn = Uuid::new_v4();
        registry.register("u1".into(), conn, sender());

        let senders = registry.senders_for("u1");
        assert_eq!(senders.len(), 1);
        assert_eq!(senders[0].0, conn);
        assert!(registry.senders_for("u2").is_empty());
    }
}
