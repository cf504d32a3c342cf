//! Credential cookie verification → AuthCtx in request extensions.
//!
//! The `token` cookie is checked by `TokenGate` (signature + validity window).
//! On success the decoded claims travel to handlers through `AuthCtx`; on any
//! failure the request stops here with a generic 401.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

/// Put the credential check in front of every route of `router`.
///
/// ```ignore
/// let protected = Router::new().route("/users/me", get(get_user));
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // from_fn cannot take a State extractor in axum 0.8, hand the state over explicitly
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let cookies = CookieJar::from_headers(req.headers());

    // TokenGate logs the failure kind itself
    let claims = state.gate.verify(&cookies)?;

    // middleware → extractor
    req.extensions_mut().insert(AuthCtx::new(claims));

    Ok(next.run(req).await)
}
