pub mod commands;
pub mod events;
pub mod types;

pub use commands::ClientCommand;
pub use events::ServerEvent;
pub use types::{ConnectionId, Message, UserId};
