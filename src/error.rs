use thiserror::Error;

/// Errors surfaced by the messaging core.
///
/// All four variants are reported synchronously to the immediate caller.
/// Delivery-push failures are the one exception: the message is already
/// durable at that point, so they are logged and swallowed by the router.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Bad or missing identity token at connect time. The connection is
    /// refused and no presence entry is created.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Empty content or self-addressed message, rejected before any
    /// persistence is attempted.
    #[error("invalid message: {0}")]
    Validation(String),

    /// Storage unavailable during append. The message was never sent and
    /// the caller may retry the user-visible send action.
    #[error("storage unavailable: {0}")]
    Persist(#[from] rusqlite::Error),

    /// History requested by a party not in the conversation.
    #[error("requester {0} is not a party to this conversation")]
    Forbidden(String),
}

impl ChatError {
    /// Stable code carried on wire-level `error` events.
    pub fn code(&self) -> &'static str {
        match self {
            ChatError::Auth(_) => "auth",
            ChatError::Validation(_) => "validation",
            ChatError::Persist(_) => "persist",
            ChatError::Forbidden(_) => "forbidden",
        }
    }
}
