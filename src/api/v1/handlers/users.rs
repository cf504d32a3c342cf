/*
 * Responsibility
 * - GET /users/me: echo the claims of the verified credential
 * - Verification itself already happened in the access middleware
 */
use axum::Json;

use crate::api::v1::dto::users::UserFetchedResponse;
use crate::api::v1::extractors::AuthCtxExtractor;

pub async fn get_user(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<UserFetchedResponse> {
    tracing::debug!(id = ?ctx.claim("id"), "user fetched");

    Json(UserFetchedResponse::new(ctx.claims))
}
