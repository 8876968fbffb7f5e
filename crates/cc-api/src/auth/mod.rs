//! Session token authentication.
//!
//! `AuthUser` is the request guard: it verifies the bearer token and then
//! loads the user document, so a token for a deleted account stops working
//! the moment the account is gone.

mod password;
mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenSigner};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use cc_models::User;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user extracted from the request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.user.id
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthenticated("Not authorized, no token"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthenticated("Not authorized, no token"))?;

        let claims = state.token_signer.verify(token)?;

        let user = state
            .users
            .get(&claims.sub)
            .await?
            .ok_or_else(|| ApiError::unauthenticated("Not authorized, user not found"))?;

        Ok(AuthUser { user })
    }
}
