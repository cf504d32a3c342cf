/*
 * Responsibility
 * - Response DTO for the user endpoint
 */
use serde::Serialize;

use crate::services::auth::Claims;

pub const USER_FETCHED: &str = "User fetched successfully";

#[derive(Debug, Serialize)]
pub struct UserFetchedResponse {
    pub message: &'static str,
    pub decoded: Claims,
}

impl UserFetchedResponse {
    pub fn new(decoded: Claims) -> Self {
        Self {
            message: USER_FETCHED,
            decoded,
        }
    }
}
