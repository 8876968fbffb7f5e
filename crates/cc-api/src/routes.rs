//! API routes.

use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::admin;
use crate::handlers::auth::{login, me, register};
use crate::handlers::jobs::{
    apply_to_job, create_job, delete_job, get_job, list_jobs, update_job,
};
use crate::handlers::notifications::{
    delete_notification, list_notifications, mark_notification_read,
};
use crate::handlers::recruiters::{
    list_job_applications, list_recruiter_jobs, update_application,
};
use crate::handlers::users::{change_password, get_user, update_user, upload_resume};
use crate::handlers::{health, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me));

    let user_routes = Router::new()
        .route("/users/:id", get(get_user))
        .route("/users/:id", put(update_user))
        .route("/users/:id/password", put(change_password))
        .route("/users/:id/resume", post(upload_resume));

    let job_routes = Router::new()
        .route("/jobs", get(list_jobs))
        .route("/jobs", post(create_job))
        .route("/jobs/:id", get(get_job))
        .route("/jobs/:id", put(update_job))
        .route("/jobs/:id", delete(delete_job))
        .route("/jobs/:id/apply", post(apply_to_job));

    let recruiter_routes = Router::new()
        .route("/recruiters/jobs", get(list_recruiter_jobs))
        .route(
            "/recruiters/jobs/:job_id/applications",
            get(list_job_applications),
        )
        .route("/recruiters/applications/:id", put(update_application));

    let admin_routes = Router::new()
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:id", get(admin::get_user))
        .route("/admin/users/:id", put(admin::update_user))
        .route("/admin/users/:id", delete(admin::delete_user))
        .route("/admin/stats", get(admin::stats));

    let notification_routes = Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/:id/read", put(mark_notification_read))
        .route("/notifications/:id", delete(delete_notification));

    let rate_limiter = std::sync::Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    // Credential endpoints get a tighter budget against brute force
    let auth_rate_limiter = std::sync::Arc::new(RateLimiterCache::new(5));

    let api_routes = Router::new()
        .merge(auth_routes.layer(middleware::from_fn_with_state(
            auth_rate_limiter,
            rate_limit_middleware,
        )))
        .merge(user_routes)
        .merge(job_routes)
        .merge(recruiter_routes)
        .merge(admin_routes)
        .merge(notification_routes)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
