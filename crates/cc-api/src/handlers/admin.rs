//! Admin handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use cc_models::Role;
use cc_store::JobQuery;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::jobs::paginate;
use crate::policy::require_admin;
use crate::state::AppState;

/// Upper bound on documents pulled per collection for admin views and
/// stats. Counts above this are reported as the cap.
const ADMIN_FETCH_CAP: i32 = 1000;

#[derive(Debug, Deserialize)]
pub struct ListUsersParams {
    pub role: Option<Role>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    actor: AuthUser,
    Query(params): Query<ListUsersParams>,
) -> ApiResult<Json<serde_json::Value>> {
    require_admin(&actor.user)?;

    let users = state.users.list(params.role, ADMIN_FETCH_CAP).await?;

    let users: Vec<_> = users
        .into_iter()
        .filter(|user| {
            contains_ci(&user.name, &params.name) && contains_ci(&user.email, &params.email)
        })
        .collect();

    let (page_items, count, total_pages, current_page) =
        paginate(users, params.page, params.limit);

    Ok(Json(json!({
        "success": true,
        "count": count,
        "totalPages": total_pages,
        "currentPage": current_page,
        "data": page_items,
    })))
}

/// GET /api/admin/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    require_admin(&actor.user)?;

    let user = state
        .users
        .get(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(json!({ "success": true, "data": user })))
}

#[derive(Debug, Deserialize)]
pub struct AdminUpdateUserRequest {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
}

/// PUT /api/admin/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(user_id): Path<String>,
    Json(request): Json<AdminUpdateUserRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    require_admin(&actor.user)?;

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
    if let Some(role) = request.role {
        user.role = role;
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
    user.updated_at = chrono::Utc::now();

    state.users.update(&user).await?;
    info!(user_id = %user.id, "User updated by admin");

    Ok(Json(json!({ "success": true, "data": user })))
}

/// DELETE /api/admin/users/:id
///
/// Removes the user together with everything they own: posted jobs and the
/// applications to them for recruiters, submitted applications for seekers.
pub async fn delete_user(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    require_admin(&actor.user)?;

    if actor.user.id == user_id {
        return Err(ApiError::validation("Admins cannot delete their own account"));
    }

    let user = state
        .users
        .get(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    state.lifecycle.delete_user(&user).await?;
    info!(user_id = %user_id, actor = %actor.user.id, "User deleted by admin");

    Ok(Json(json!({ "success": true, "message": "User removed" })))
}

/// GET /api/admin/stats
pub async fn stats(
    State(state): State<AppState>,
    actor: AuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    require_admin(&actor.user)?;

    let users = state.users.list(None, ADMIN_FETCH_CAP).await?;
    let jobs = state
        .jobs
        .query(&JobQuery {
            job_type: None,
            is_featured: None,
            include_inactive: true,
            limit: ADMIN_FETCH_CAP,
        })
        .await?;
    let applications = state.applications.list_recent(ADMIN_FETCH_CAP).await?;

    let recruiters = users.iter().filter(|u| u.role == Role::Recruiter).count();
    let seekers = users.iter().filter(|u| u.role == Role::Seeker).count();
    let active_jobs = jobs.iter().filter(|j| j.is_active).count();

    let recent_jobs: Vec<_> = jobs.iter().take(5).collect();
    let recent_applications: Vec<_> = applications.iter().take(5).collect();

    Ok(Json(json!({
        "success": true,
        "data": {
            "totalUsers": users.len(),
            "totalRecruiters": recruiters,
            "totalSeekers": seekers,
            "totalJobs": jobs.len(),
            "activeJobs": active_jobs,
            "totalApplications": applications.len(),
            "recentJobs": recent_jobs,
            "recentApplications": recent_applications,
        },
    })))
}

fn contains_ci(haystack: &str, needle: &Option<String>) -> bool {
    match needle {
        Some(needle) if !needle.trim().is_empty() => haystack
            .to_lowercase()
            .contains(&needle.trim().to_lowercase()),
        _ => true,
    }
}
