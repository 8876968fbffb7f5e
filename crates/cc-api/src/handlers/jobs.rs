//! Public job board and job management handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use validator::Validate;

use cc_models::{Application, Job, JobType, Salary};
use cc_store::JobQuery;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::auth::flatten_validation_errors;
use crate::metrics;
use crate::policy::{ensure_owner_or_admin, require_recruiter, require_seeker};
use crate::state::AppState;

/// Upper bound on documents pulled from the store for one listing query.
/// Substring filters run in this layer, so the fetch has to be capped.
const LISTING_FETCH_CAP: i32 = 500;

const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    #[validate(length(min = 1, message = "Please add a job title"))]
    pub title: String,
    #[validate(length(min = 1, message = "Please add a company name"))]
    pub company: String,
    #[validate(length(min = 1, message = "Please add a location"))]
    pub location: String,
    #[validate(length(min = 1, message = "Please add a description"))]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub salary: Option<Salary>,
    pub job_type: Option<JobType>,
    #[serde(default)]
    pub is_featured: bool,
}

/// POST /api/jobs
pub async fn create_job(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(request): Json<CreateJobRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    require_recruiter(&actor.user)?;
    request
        .validate()
        .map_err(|e| ApiError::validation(flatten_validation_errors(&e)))?;

    let mut job = Job::new(
        request.title.trim(),
        request.company.trim(),
        request.location.trim(),
        request.description.trim(),
        &actor.user.id,
    );
    job.requirements = request.requirements;
    job.salary = request.salary;
    job.job_type = request.job_type.unwrap_or_default();
    job.is_featured = request.is_featured;

    state.jobs.create(&job).await?;
    metrics::record_job_posted();

    Ok(Json(json!({ "success": true, "job": job })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListJobsParams {
    pub title: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub job_type: Option<JobType>,
    pub is_featured: Option<bool>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// GET /api/jobs
///
/// Equality filters (type, featured, active) are pushed to the store;
/// substring filters run here because the store only matches exactly.
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<ListJobsParams>,
) -> ApiResult<Json<serde_json::Value>> {
    let jobs = state
        .jobs
        .query(&JobQuery {
            job_type: params.job_type,
            is_featured: params.is_featured,
            include_inactive: false,
            limit: LISTING_FETCH_CAP,
        })
        .await?;

    let jobs: Vec<Job> = jobs
        .into_iter()
        .filter(|job| {
            matches_substring(&job.title, &params.title)
                && matches_substring(&job.location, &params.location)
                && matches_substring(&job.company, &params.company)
        })
        .collect();

    let (page_items, count, total_pages, current_page) =
        paginate(jobs, params.page, params.limit);

    Ok(Json(json!({
        "success": true,
        "count": count,
        "totalPages": total_pages,
        "currentPage": current_page,
        "jobs": page_items,
    })))
}

/// GET /api/jobs/:id
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut job = state
        .jobs
        .get(&job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    // Detail views count toward recruiter stats. Patched with a two-field
    // mask: a public GET must never write back the rest of the document,
    // or it would revert applicant appends landing between read and write.
    job.view_count += 1;
    state
        .jobs
        .increment_view_count(&job.id, job.view_count)
        .await?;

    Ok(Json(json!({ "success": true, "job": job })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub salary: Option<Salary>,
    pub job_type: Option<JobType>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

/// PUT /api/jobs/:id
pub async fn update_job(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(job_id): Path<String>,
    Json(request): Json<UpdateJobRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut job = state
        .jobs
        .get(&job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    ensure_owner_or_admin(&actor.user, &job.posted_by)?;

    if let Some(title) = request.title {
        set_non_empty(&mut job.title, title, "Please add a job title")?;
    }
    if let Some(company) = request.company {
        set_non_empty(&mut job.company, company, "Please add a company name")?;
    }
    if let Some(location) = request.location {
        set_non_empty(&mut job.location, location, "Please add a location")?;
    }
    if let Some(description) = request.description {
        set_non_empty(&mut job.description, description, "Please add a description")?;
    }
    if let Some(requirements) = request.requirements {
        job.requirements = requirements;
    }
    if let Some(salary) = request.salary {
        job.salary = Some(salary);
    }
    if let Some(job_type) = request.job_type {
        job.job_type = job_type;
    }
    if let Some(is_active) = request.is_active {
        job.is_active = is_active;
    }
    if let Some(is_featured) = request.is_featured {
        job.is_featured = is_featured;
    }
    job.updated_at = chrono::Utc::now();

    state.jobs.update(&job).await?;

    Ok(Json(json!({ "success": true, "job": job })))
}

/// DELETE /api/jobs/:id
pub async fn delete_job(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let job = state
        .jobs
        .get(&job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    ensure_owner_or_admin(&actor.user, &job.posted_by)?;

    state.lifecycle.delete_job(&job_id).await?;
    info!(job_id = %job_id, actor = %actor.user.id, "Job deleted");

    Ok(Json(json!({ "success": true, "message": "Job removed" })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub cover_letter: Option<String>,
    pub resume: Option<String>,
}

/// POST /api/jobs/:id/apply
pub async fn apply_to_job(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(job_id): Path<String>,
    request: Option<Json<ApplyRequest>>,
) -> ApiResult<Json<serde_json::Value>> {
    require_seeker(&actor.user)?;

    let job = state
        .jobs
        .get(&job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    if !job.is_active {
        return Err(ApiError::ListingInactive);
    }

    let Json(request) = request.unwrap_or_default();
    let resume = request.resume.or_else(|| actor.user.resume.clone());
    let application = Application::new(&job.id, &actor.user.id, resume, request.cover_letter);

    match state
        .lifecycle
        .apply_to_job(&job, &actor.user, &application)
        .await
    {
        Ok(()) => {}
        Err(e) if e.is_already_exists() => return Err(ApiError::AlreadyApplied),
        Err(e) => return Err(e.into()),
    }

    metrics::record_application_submitted();

    Ok(Json(json!({ "success": true, "application": application })))
}

// =============================================================================
// Helpers
// =============================================================================

fn matches_substring(haystack: &str, needle: &Option<String>) -> bool {
    match needle {
        Some(needle) if !needle.trim().is_empty() => haystack
            .to_lowercase()
            .contains(&needle.trim().to_lowercase()),
        _ => true,
    }
}

fn set_non_empty(target: &mut String, value: String, message: &str) -> ApiResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(message));
    }
    *target = trimmed.to_string();
    Ok(())
}

pub(crate) fn paginate<T>(
    items: Vec<T>,
    page: Option<usize>,
    limit: Option<usize>,
) -> (Vec<T>, usize, usize, usize) {
    let count = items.len();
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let total_pages = count.div_ceil(limit).max(1);
    let page = page.unwrap_or(1).clamp(1, total_pages);

    let page_items = items
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();

    (page_items, count, total_pages, page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_filter_is_case_insensitive() {
        assert!(matches_substring(
            "Remote (EU)",
            &Some("remote".to_string())
        ));
        assert!(matches_substring("Berlin", &None));
        assert!(!matches_substring("Berlin", &Some("remote".to_string())));
    }

    #[test]
    fn blank_filter_matches_everything() {
        assert!(matches_substring("anything", &Some("  ".to_string())));
    }

    #[test]
    fn pagination_math() {
        let items: Vec<u32> = (0..25).collect();
        let (page, count, total_pages, current) = paginate(items, Some(3), Some(10));
        assert_eq!(count, 25);
        assert_eq!(total_pages, 3);
        assert_eq!(current, 3);
        assert_eq!(page, vec![20, 21, 22, 23, 24]);
    }

    #[test]
    fn pagination_clamps_out_of_range_page() {
        let items: Vec<u32> = (0..5).collect();
        let (page, _, total_pages, current) = paginate(items, Some(99), Some(10));
        assert_eq!(total_pages, 1);
        assert_eq!(current, 1);
        assert_eq!(page.len(), 5);
    }

    #[test]
    fn empty_result_still_reports_one_page() {
        let items: Vec<u32> = Vec::new();
        let (_, count, total_pages, current) = paginate(items, None, None);
        assert_eq!(count, 0);
        assert_eq!(total_pages, 1);
        assert_eq!(current, 1);
    }
}
