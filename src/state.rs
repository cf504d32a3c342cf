/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 * - Clone is cheap: everything inside sits behind an Arc
 */
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::TokenGate;

#[derive(Clone, Debug)]
pub struct AppState {
    pub gate: Arc<TokenGate>,
}

impl AppState {
    pub fn new(gate: Arc<TokenGate>) -> Self {
        Self { gate }
    }

    /// Build every process-level service from a validated config.
    pub fn from_config(config: &Config) -> Self {
        let gate = TokenGate::new(
            &config.jwt_secret,
            config.token_leeway_seconds,
            config.log_rejections,
        );

        Self::new(Arc::new(gate))
    }
}
