//! Real-time messaging core of a service-booking application.
//!
//! A customer and a service provider exchange messages while connected;
//! every message is durably recorded for later retrieval. The crate wires a
//! session gateway, an in-memory presence registry, a persist-then-fan-out
//! message router, a sqlite message store, and a history API behind a
//! line-delimited-JSON TCP server.

pub mod auth;
pub mod common;
pub mod config;
pub mod error;
pub mod history;
pub mod network;
pub mod presence;
pub mod router;
pub mod storage;

pub use auth::{StaticTokenVerifier, TokenVerifier};
pub use common::{ClientCommand, ConnectionId, Message, ServerEvent, UserId};
pub use error::ChatError;
pub use history::HistoryApi;
pub use network::{ChatServer, ConnectionHandle, SessionGateway};
pub use presence::PresenceRegistry;
pub use router::MessageRouter;
pub use storage::MessageStore;
