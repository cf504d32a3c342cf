/*
 * Responsibility
 * - v1 URL layout
 * - /health is public, the users routes sit behind the access middleware
 */
use axum::{Router, routing::get};

use crate::middleware::auth::access;
use crate::state::AppState;

use crate::api::v1::handlers::{health::health, users::get_user};

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new().route("/users/me", get(get_user));
    let protected = access::apply(protected, state);

    Router::new().route("/health", get(health)).merge(protected)
}
