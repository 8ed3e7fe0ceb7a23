use std::collections::HashMap;

use async_trait::async_trait;

use crate::common::UserId;
use crate::error::ChatError;

/// Seam to the external authentication collaborator: resolves an opaque
/// identity token to a user id. Verification may block on an external call,
/// which is why the trait is async.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<UserId, ChatError>;
}

/// Token map loaded from config; stands in for the real auth service in the
/// bundled binary and in tests.
pub struct StaticTokenVerifier {
    tokens: HashMap<String, UserId>,
}

impl StaticTokenVerifier {
    pub fn new(tokens: HashMap<String, UserId>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<UserId, ChatError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| ChatError::Auth("unknown identity token".into()))
    }
}
