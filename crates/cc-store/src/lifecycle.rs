//! Multi-document lifecycle operations.
//!
//! Everything here goes through atomic commits so that related documents
//! never drift apart: an application is created together with the job's
//! applicant list update and the recruiter's notification, and deleting a
//! user or job removes its dependent documents in the same commit.
//!
//! Cascades larger than the per-commit write limit are split into chunks
//! and applied children-first, so an interrupted cascade never leaves an
//! orphaned child behind a deleted parent.

use std::collections::HashMap;

use tracing::info;

use cc_models::{Application, Job, Notification, NotificationKind, RelatedKind, Role, User};

use crate::application_repo::{application_to_fields, ApplicationRepository, APPLICATIONS};
use crate::client::{StoreClient, MAX_WRITES_PER_COMMIT};
use crate::error::{StoreError, StoreResult};
use crate::job_repo::{JobRepository, JOBS};
use crate::notification_repo::{notification_to_fields, NOTIFICATIONS};
use crate::types::{ToStoreValue, Write};
use crate::user_repo::{EMAIL_INDEX, USERS};

/// Coordinates writes that span multiple documents.
#[derive(Clone)]
pub struct LifecycleCoordinator {
    client: StoreClient,
    applications: ApplicationRepository,
    jobs: JobRepository,
}

impl LifecycleCoordinator {
    pub fn new(client: StoreClient) -> Self {
        Self {
            applications: ApplicationRepository::new(client.clone()),
            jobs: JobRepository::new(client.clone()),
            client,
        }
    }

    /// Submit an application. One commit creates the application document
    /// (rejected if the pair id already exists), appends the application to
    /// the job's applicant list, and notifies the job owner.
    pub async fn apply_to_job(
        &self,
        job: &Job,
        applicant: &User,
        application: &Application,
    ) -> StoreResult<()> {
        let mut applicants = job.applicants.clone();
        if !applicants.contains(&application.id) {
            applicants.push(application.id.clone());
        }

        let mut job_fields = HashMap::new();
        job_fields.insert("applicants".to_string(), applicants.to_store_value());
        job_fields.insert(
            "updated_at".to_string(),
            chrono::Utc::now().to_store_value(),
        );

        let notification = Notification::new(
            &job.posted_by,
            "New Job Application",
            format!(
                "{} has applied for the position: {}",
                applicant.name, job.title
            ),
            NotificationKind::Application,
        )
        .related_to(&application.id, RelatedKind::Application);

        let writes = vec![
            Write::create(
                self.client.full_document_name(APPLICATIONS, &application.id),
                application_to_fields(application),
            ),
            Write::update(self.client.full_document_name(JOBS, &job.id), job_fields),
            Write::create(
                self.client.full_document_name(NOTIFICATIONS, &notification.id),
                notification_to_fields(&notification),
            ),
        ];

        match self.client.commit(writes).await {
            Ok(_) => {
                info!(application_id = %application.id, job_id = %job.id, "Application submitted");
                Ok(())
            }
            Err(e) if e.is_already_exists() => Err(StoreError::AlreadyExists(format!(
                "{}/{}",
                APPLICATIONS, application.id
            ))),
            Err(e) => Err(e),
        }
    }

    /// Persist a status/notes change and notify the applicant in one commit.
    /// `application` must already carry the new status.
    pub async fn update_application_status(
        &self,
        application: &Application,
        job: &Job,
    ) -> StoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert(
            "status".to_string(),
            application.status.as_str().to_store_value(),
        );
        fields.insert("notes".to_string(), application.notes.to_store_value());
        fields.insert(
            "updated_at".to_string(),
            application.updated_at.to_store_value(),
        );

        let notification = Notification::new(
            &application.applicant_id,
            "Application Status Updated",
            format!(
                "Your application for {} has been {}",
                job.title,
                application.status.as_str()
            ),
            NotificationKind::Application,
        )
        .related_to(&application.id, RelatedKind::Application);

        let writes = vec![
            Write::update(
                self.client.full_document_name(APPLICATIONS, &application.id),
                fields,
            ),
            Write::create(
                self.client.full_document_name(NOTIFICATIONS, &notification.id),
                notification_to_fields(&notification),
            ),
        ];

        self.client.commit(writes).await?;
        Ok(())
    }

    /// Delete a job and every application submitted to it.
    pub async fn delete_job(&self, job_id: &str) -> StoreResult<()> {
        let applications = self.applications.list_by_job(job_id).await?;
        let deleted = applications.len();

        let writes = job_cascade_writes(job_id, &applications, |collection, id| {
            self.client.full_document_name(collection, id)
        });

        self.commit_chunked(writes).await?;
        info!(job_id = %job_id, applications = deleted, "Deleted job with cascade");
        Ok(())
    }

    /// Delete a user and everything they own. For recruiters this removes
    /// every posted job and the applications to those jobs; for seekers it
    /// removes their submitted applications. Notifications are kept so the
    /// other party's history survives.
    pub async fn delete_user(&self, user: &User) -> StoreResult<()> {
        let own_applications = self.applications.list_by_applicant(&user.id).await?;

        let mut owned_jobs = Vec::new();
        if matches!(user.role, Role::Recruiter | Role::Admin) {
            for job in self.jobs.list_by_owner(&user.id).await? {
                let applications = self.applications.list_by_job(&job.id).await?;
                owned_jobs.push((job, applications));
            }
        }

        let writes = user_cascade_writes(user, &own_applications, &owned_jobs, |collection, id| {
            self.client.full_document_name(collection, id)
        });

        self.commit_chunked(writes).await?;
        info!(
            user_id = %user.id,
            role = %user.role,
            jobs = owned_jobs.len(),
            applications = own_applications.len(),
            "Deleted user with cascade"
        );
        Ok(())
    }

    /// Commit writes in order, splitting into chunks when the batch exceeds
    /// the per-commit limit. Callers order writes children-first so partial
    /// progress never orphans a child document.
    async fn commit_chunked(&self, writes: Vec<Write>) -> StoreResult<()> {
        for chunk in chunk_writes(writes, MAX_WRITES_PER_COMMIT) {
            self.client.commit(chunk).await?;
        }
        Ok(())
    }
}

/// Deletes for one job: its applications first, the job last.
fn job_cascade_writes<F>(job_id: &str, applications: &[Application], name: F) -> Vec<Write>
where
    F: Fn(&str, &str) -> String,
{
    let mut writes: Vec<Write> = applications
        .iter()
        .map(|a| Write::delete(name(APPLICATIONS, &a.id)))
        .collect();
    writes.push(Write::delete(name(JOBS, job_id)));
    writes
}

/// Deletes for one user: applications they submitted, then the applications
/// to each job they own, then those jobs, then the email index entry, the
/// user document last. Chunked commits walk this list front to back, so an
/// interruption can only ever leave parents without children, never the
/// reverse.
fn user_cascade_writes<F>(
    user: &User,
    own_applications: &[Application],
    owned_jobs: &[(Job, Vec<Application>)],
    name: F,
) -> Vec<Write>
where
    F: Fn(&str, &str) -> String,
{
    let mut writes: Vec<Write> = own_applications
        .iter()
        .map(|a| Write::delete(name(APPLICATIONS, &a.id)))
        .collect();

    for (_, applications) in owned_jobs {
        for app in applications {
            writes.push(Write::delete(name(APPLICATIONS, &app.id)));
        }
    }
    for (job, _) in owned_jobs {
        writes.push(Write::delete(name(JOBS, &job.id)));
    }

    writes.push(Write::delete(name(
        EMAIL_INDEX,
        &User::email_key(&user.email),
    )));
    writes.push(Write::delete(name(USERS, &user.id)));
    writes
}

/// Split writes into batches of at most `max`, preserving order.
fn chunk_writes(writes: Vec<Write>, max: usize) -> Vec<Vec<Write>> {
    if writes.len() <= max {
        return vec![writes];
    }

    let mut chunks = Vec::new();
    let mut remaining = writes;
    while !remaining.is_empty() {
        let rest = remaining.split_off(remaining.len().min(max));
        chunks.push(remaining);
        remaining = rest;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_name(collection: &str, id: &str) -> String {
        format!("{}/{}", collection, id)
    }

    fn delete_target(write: &Write) -> &str {
        write.delete.as_deref().expect("cascade writes are deletes")
    }

    #[test]
    fn job_cascade_deletes_applications_before_the_job() {
        let job = Job::new("Backend Engineer", "Acme", "Remote", "Build APIs", "rec-1");
        let apps = vec![
            Application::new(&job.id, "seeker-1", None, None),
            Application::new(&job.id, "seeker-2", None, None),
        ];

        let writes = job_cascade_writes(&job.id, &apps, plain_name);
        let targets: Vec<&str> = writes.iter().map(delete_target).collect();

        assert_eq!(targets.len(), 3);
        assert!(targets[0].starts_with("applications/"));
        assert!(targets[1].starts_with("applications/"));
        assert_eq!(targets[2], format!("jobs/{}", job.id));
    }

    #[test]
    fn recruiter_cascade_orders_children_first() {
        let recruiter = User::new("R", "r@example.com", "$argon2id$hash", Role::Recruiter);
        let job = Job::new("Backend Engineer", "Acme", "Remote", "Build APIs", &recruiter.id);
        let apps = vec![
            Application::new(&job.id, "seeker-1", None, None),
            Application::new(&job.id, "seeker-2", None, None),
        ];
        let job_id = job.id.clone();

        let writes = user_cascade_writes(&recruiter, &[], &[(job, apps)], plain_name);
        let targets: Vec<&str> = writes.iter().map(delete_target).collect();

        let job_pos = targets
            .iter()
            .position(|t| *t == format!("jobs/{}", job_id))
            .expect("job delete present");
        assert!(targets[..job_pos]
            .iter()
            .all(|t| t.starts_with("applications/")));
        assert_eq!(job_pos, 2);
        assert_eq!(
            targets[targets.len() - 2],
            format!("email_index/{}", User::email_key(&recruiter.email))
        );
        assert_eq!(targets[targets.len() - 1], format!("users/{}", recruiter.id));
    }

    #[test]
    fn seeker_cascade_touches_no_jobs() {
        let seeker = User::new("S", "s@example.com", "$argon2id$hash", Role::Seeker);
        let app = Application::new("job-1", &seeker.id, None, None);

        let app_id = app.id.clone();
        let writes = user_cascade_writes(&seeker, &[app], &[], plain_name);
        let targets: Vec<String> = writes.iter().map(|w| delete_target(w).to_string()).collect();

        assert_eq!(
            targets,
            vec![
                format!("applications/{}", app_id),
                format!("email_index/{}", User::email_key(&seeker.email)),
                format!("users/{}", seeker.id),
            ]
        );
    }

    #[test]
    fn oversized_cascade_chunks_preserve_order() {
        let writes: Vec<Write> = (0..1203)
            .map(|i| Write::delete(format!("applications/a{}", i)))
            .collect();

        let chunks = chunk_writes(writes, MAX_WRITES_PER_COMMIT);

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() <= MAX_WRITES_PER_COMMIT));
        assert!(chunks.iter().all(|c| !c.is_empty()));

        let flat: Vec<&str> = chunks.iter().flatten().map(delete_target).collect();
        assert_eq!(flat.len(), 1203);
        assert_eq!(flat[0], "applications/a0");
        assert_eq!(flat[500], "applications/a500");
        assert_eq!(flat[1202], "applications/a1202");
    }

    #[test]
    fn small_cascade_is_a_single_commit() {
        let writes = vec![Write::delete("jobs/j1".to_string())];
        let chunks = chunk_writes(writes, MAX_WRITES_PER_COMMIT);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 1);
    }
}
