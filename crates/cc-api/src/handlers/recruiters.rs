//! Recruiter dashboard handlers.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use cc_models::ApplicationStatus;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::policy::{ensure_owner_or_admin, require_recruiter};
use crate::state::AppState;

/// Aggregate stats for a recruiter's postings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruiterStats {
    pub total_jobs: usize,
    pub active_jobs: usize,
    pub total_applications: usize,
    /// Applications received in the last 7 days.
    pub new_applications: usize,
    pub view_count: u64,
    /// Applications per hundred job detail views.
    pub click_application_rate: f64,
}

/// GET /api/recruiters/jobs
pub async fn list_recruiter_jobs(
    State(state): State<AppState>,
    actor: AuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    require_recruiter(&actor.user)?;

    let jobs = state.jobs.list_by_owner(&actor.user.id).await?;

    let mut total_applications = 0usize;
    let mut new_applications = 0usize;
    let week_ago = Utc::now() - Duration::days(7);

    for job in &jobs {
        let applications = state.applications.list_by_job(&job.id).await?;
        total_applications += applications.len();
        new_applications += applications
            .iter()
            .filter(|a| a.created_at > week_ago)
            .count();
    }

    let view_count: u64 = jobs.iter().map(|j| j.view_count as u64).sum();
    let stats = RecruiterStats {
        total_jobs: jobs.len(),
        active_jobs: jobs.iter().filter(|j| j.is_active).count(),
        total_applications,
        new_applications,
        view_count,
        click_application_rate: if view_count > 0 {
            (total_applications as f64 / view_count as f64) * 100.0
        } else {
            0.0
        },
    };

    Ok(Json(json!({
        "success": true,
        "count": stats.total_jobs,
        "stats": stats,
        "jobs": jobs,
    })))
}

/// GET /api/recruiters/jobs/:job_id/applications
pub async fn list_job_applications(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    require_recruiter(&actor.user)?;

    let job = state
        .jobs
        .get(&job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    ensure_owner_or_admin(&actor.user, &job.posted_by)?;

    let applications = state.applications.list_by_job(&job_id).await?;

    Ok(Json(json!({
        "success": true,
        "count": applications.len(),
        "applications": applications,
    })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateApplicationRequest {
    pub status: ApplicationStatus,
    pub notes: Option<String>,
}

/// PUT /api/recruiters/applications/:id
///
/// Any status may move to any other status. The applicant is notified in
/// the same commit that records the change.
pub async fn update_application(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(application_id): Path<String>,
    Json(request): Json<UpdateApplicationRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    require_recruiter(&actor.user)?;

    let mut application = state
        .applications
        .get(&application_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    let job = state
        .jobs
        .get(&application.job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    ensure_owner_or_admin(&actor.user, &job.posted_by)?;

    application.status = request.status;
    if let Some(notes) = request.notes {
        application.notes = Some(notes);
    }
    application.updated_at = Utc::now();

    state
        .lifecycle
        .update_application_status(&application, &job)
        .await?;
    info!(
        application_id = %application.id,
        status = %application.status.as_str(),
        "Application status updated"
    );

    Ok(Json(json!({ "success": true, "application": application })))
}
