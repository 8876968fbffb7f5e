//! User profile handlers.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use cc_models::{Education, Experience};

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::policy::{ensure_owner_or_admin, ensure_self};
use crate::state::AppState;

/// Resume uploads are capped at 5 MB.
const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

/// Extensions accepted for resume uploads.
const ALLOWED_RESUME_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    ensure_owner_or_admin(&actor.user, &user_id)?;

    let user = state
        .users
        .get(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(json!({ "success": true, "user": user })))
}

/// Profile fields a user may change about themselves. Role, email, and
/// credentials are deliberately not here, so they can never be
/// mass-assigned through this route.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub skills: Option<Vec<String>>,
    pub education: Option<Vec<Education>>,
    pub experience: Option<Vec<Experience>>,
}

/// PUT /api/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    ensure_owner_or_admin(&actor.user, &user_id)?;

    let mut user = state
        .users
        .get(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if let Some(name) = request.name {
        if name.trim().is_empty() {
            return Err(ApiError::validation("Name cannot be empty"));
        }
        user.name = name.trim().to_string();
    }
    if let Some(bio) = request.bio {
        user.bio = Some(bio);
    }
    if let Some(location) = request.location {
        user.location = Some(location);
    }
    if let Some(phone) = request.phone {
        user.phone = Some(phone);
    }
    if let Some(skills) = request.skills {
        user.skills = skills;
    }
    if let Some(education) = request.education {
        user.education = education;
    }
    if let Some(experience) = request.experience {
        user.experience = experience;
    }
    user.updated_at = chrono::Utc::now();

    state.users.update(&user).await?;

    Ok(Json(json!({ "success": true, "user": user })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// PUT /api/users/:id/password
///
/// Credential changes are owner-only; even admins go through account
/// recovery rather than setting someone's password directly.
pub async fn change_password(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(user_id): Path<String>,
    Json(request): Json<ChangePasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    ensure_self(&actor.user, &user_id)?;

    if request.new_password.len() < 6 {
        return Err(ApiError::validation(
            "Password must be at least 6 characters",
        ));
    }

    if !verify_password(&request.current_password, &actor.user.password_hash)? {
        return Err(ApiError::validation("Current password is incorrect"));
    }

    let new_hash = hash_password(&request.new_password)?;
    state.users.set_password_hash(&user_id, &new_hash).await?;
    info!(user_id = %user_id, "Password changed");

    Ok(Json(json!({ "success": true, "message": "Password updated successfully" })))
}

/// POST /api/users/:id/resume
pub async fn upload_resume(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(user_id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<serde_json::Value>> {
    ensure_owner_or_admin(&actor.user, &user_id)?;

    state
        .users
        .get(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let field = loop {
        match multipart
            .next_field()
            .await
            .map_err(|e| ApiError::validation(format!("Invalid upload: {e}")))?
        {
            Some(field) if field.name() == Some("resume") => break field,
            Some(_) => continue,
            None => return Err(ApiError::validation("Please upload a file")),
        }
    };

    let file_name = field.file_name().unwrap_or_default().to_string();
    let extension = file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();

    if file_name.is_empty() || !ALLOWED_RESUME_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ApiError::validation(
            "Please upload a PDF or Word document",
        ));
    }

    let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid upload: {e}")))?;

    if data.len() > MAX_RESUME_BYTES {
        return Err(ApiError::validation("File size cannot exceed 5MB"));
    }
    if data.is_empty() {
        return Err(ApiError::validation("Please upload a file"));
    }

    let stored_name = format!("{}_{}.{}", user_id, Uuid::new_v4(), extension);
    let upload_dir = std::path::Path::new(&state.config.upload_dir);

    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to prepare upload dir: {e}")))?;
    tokio::fs::write(upload_dir.join(&stored_name), &data)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store upload: {e}")))?;

    let resume_path = format!("/uploads/{}", stored_name);
    state.users.set_resume(&user_id, &resume_path).await?;
    info!(user_id = %user_id, bytes = data.len(), "Resume uploaded");

    Ok(Json(json!({ "success": true, "resume": resume_path })))
}
