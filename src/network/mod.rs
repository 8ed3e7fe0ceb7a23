pub mod gateway;
pub mod server;

pub use gateway::{ConnectionHandle, SessionGateway};
pub use server::ChatServer;
