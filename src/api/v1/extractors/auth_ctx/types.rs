/*
 * Responsibility
 * - The "authenticated context" type handlers see
 * - middleware verifies and stores it in request extensions, handlers only receive this type
 *
 * Notes
 * - Signature/expiry checks belong to services::auth::TokenGate
 */

use crate::services::auth::Claims;

/// Context attached to a request whose `token` cookie verified.
///
/// `claims` is the decoded payload, untouched. Which keys exist (`id`, `role`, ...)
/// is up to whoever issued the credential.
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub claims: Claims,
}

impl AuthCtx {
    pub fn new(claims: Claims) -> Self {
        Self { claims }
    }

    pub fn claim(&self, key: &str) -> Option<&serde_json::Value> {
        self.claims.get(key)
    }
}
