//! Registration, login, and current-user handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use validator::Validate;

use cc_models::{Role, User};

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Please add a name"))]
    pub name: String,
    #[validate(email(message = "Please add a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: User,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::validation(flatten_validation_errors(&e)))?;

    let role = registration_role(request.role)?;
    let password_hash = hash_password(&request.password)?;
    let user = User::new(request.name.trim(), request.email.trim(), password_hash, role);

    match state.users.register(&user).await {
        Ok(()) => {}
        Err(e) if e.is_already_exists() => return Err(ApiError::DuplicateEmail),
        Err(e) => return Err(e.into()),
    }

    let token = state.token_signer.sign(&user.id, user.role)?;
    metrics::record_registration(user.role.as_str());
    info!(user_id = %user.id, role = %user.role, "User registered");

    Ok(Json(AuthResponse {
        success: true,
        token,
        user,
    }))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login
///
/// Unknown email and wrong password produce the same response, so the
/// endpoint cannot be used to probe which emails are registered.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = match state.users.find_by_email(&request.email).await? {
        Some(user) => user,
        None => {
            metrics::record_login(false);
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(&request.password, &user.password_hash)? {
        metrics::record_login(false);
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.token_signer.sign(&user.id, user.role)?;
    metrics::record_login(true);

    Ok(Json(AuthResponse {
        success: true,
        token,
        user,
    }))
}

/// GET /api/auth/me
pub async fn me(user: AuthUser) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "user": user.user }))
}

/// Admin accounts are provisioned out of band, never self-registered.
pub(crate) fn registration_role(requested: Option<Role>) -> ApiResult<Role> {
    match requested.unwrap_or_default() {
        Role::Admin => Err(ApiError::forbidden("Cannot register with this role")),
        role => Ok(role),
    }
}

pub(crate) fn flatten_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .collect();
    messages.sort();
    if messages.is_empty() {
        "Invalid request".to_string()
    } else {
        messages.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_validation() {
        let bad = RegisterRequest {
            name: "".to_string(),
            email: "not-an-email".to_string(),
            password: "123".to_string(),
            role: None,
        };
        let errors = bad.validate().unwrap_err();
        let message = flatten_validation_errors(&errors);
        assert!(message.contains("Please add a name"));
        assert!(message.contains("Please add a valid email"));
        assert!(message.contains("Password must be at least 6 characters"));
    }

    #[test]
    fn admin_self_registration_is_forbidden() {
        assert!(matches!(
            registration_role(Some(Role::Admin)),
            Err(ApiError::Forbidden(_))
        ));
        assert_eq!(registration_role(None).unwrap(), Role::Seeker);
        assert_eq!(
            registration_role(Some(Role::Recruiter)).unwrap(),
            Role::Recruiter
        );
    }

    #[test]
    fn valid_register_request_passes() {
        let ok = RegisterRequest {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret123".to_string(),
            role: Some(Role::Recruiter),
        };
        assert!(ok.validate().is_ok());
    }
}
