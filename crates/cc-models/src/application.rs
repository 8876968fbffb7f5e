//! Job application model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Application review status.
///
/// Transitions are deliberately unconstrained: a recruiter may move an
/// application from any status to any other (matching the product's
/// observed behavior).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewed,
    Interviewed,
    Rejected,
    Accepted,
}

impl ApplicationStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Interviewed => "interviewed",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Accepted => "accepted",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "reviewed" => Ok(ApplicationStatus::Reviewed),
            "interviewed" => Ok(ApplicationStatus::Interviewed),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "accepted" => Ok(ApplicationStatus::Accepted),
            other => Err(format!("unknown application status: {}", other)),
        }
    }
}

/// A seeker's application against a job posting.
///
/// The document id is the deterministic pair id `"{job_id}_{applicant_id}"`,
/// so the storage layer enforces at most one application per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub job_id: String,
    pub applicant_id: String,
    #[serde(default)]
    pub resume: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Deterministic document id for a (job, applicant) pair.
    pub fn pair_id(job_id: &str, applicant_id: &str) -> String {
        format!("{}_{}", job_id, applicant_id)
    }

    /// Create a new pending application.
    pub fn new(
        job_id: impl Into<String>,
        applicant_id: impl Into<String>,
        resume: Option<String>,
        cover_letter: Option<String>,
    ) -> Self {
        let job_id = job_id.into();
        let applicant_id = applicant_id.into();
        let now = Utc::now();
        Self {
            id: Self::pair_id(&job_id, &applicant_id),
            job_id,
            applicant_id,
            resume,
            cover_letter,
            status: ApplicationStatus::Pending,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_id_is_deterministic() {
        assert_eq!(
            Application::pair_id("job-1", "user-2"),
            Application::pair_id("job-1", "user-2"),
        );
        assert_ne!(
            Application::pair_id("job-1", "user-2"),
            Application::pair_id("job-2", "user-1"),
        );
    }

    #[test]
    fn new_application_is_pending() {
        let app = Application::new("job-1", "user-2", None, Some("Hi".into()));
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert_eq!(app.id, "job-1_user-2");
    }

    #[test]
    fn status_round_trip() {
        for status in [
            ApplicationStatus::Pending,
            ApplicationStatus::Reviewed,
            ApplicationStatus::Interviewed,
            ApplicationStatus::Rejected,
            ApplicationStatus::Accepted,
        ] {
            assert_eq!(status.as_str().parse::<ApplicationStatus>().unwrap(), status);
        }
    }
}
