//! Job posting model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Employment type for a job posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum JobType {
    #[default]
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    #[serde(rename = "Contract")]
    Contract,
    #[serde(rename = "Internship")]
    Internship,
    #[serde(rename = "Remote")]
    Remote,
}

impl JobType {
    /// Get string representation of the job type.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Internship => "Internship",
            JobType::Remote => "Remote",
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Full-time" => Ok(JobType::FullTime),
            "Part-time" => Ok(JobType::PartTime),
            "Contract" => Ok(JobType::Contract),
            "Internship" => Ok(JobType::Internship),
            "Remote" => Ok(JobType::Remote),
            other => Err(format!("unknown job type: {}", other)),
        }
    }
}

/// Salary range attached to a job posting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Salary {
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// A job posting owned by exactly one recruiter (or admin) account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub salary: Option<Salary>,
    #[serde(default)]
    pub job_type: JobType,
    /// Owning user id. Must reference a recruiter or admin at creation.
    pub posted_by: String,
    /// Application ids referencing this job. Weak references; the
    /// applications collection is authoritative.
    #[serde(default)]
    pub applicants: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub view_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl Job {
    /// Create a new active job posting.
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
        description: impl Into<String>,
        posted_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            company: company.into(),
            location: location.into(),
            description: description.into(),
            requirements: Vec::new(),
            salary: None,
            job_type: JobType::default(),
            posted_by: posted_by.into(),
            applicants: Vec::new(),
            is_active: true,
            is_featured: false,
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_type_wire_format() {
        let json = serde_json::to_string(&JobType::FullTime).unwrap();
        assert_eq!(json, "\"Full-time\"");
        let parsed: JobType = serde_json::from_str("\"Part-time\"").unwrap();
        assert_eq!(parsed, JobType::PartTime);
    }

    #[test]
    fn new_job_is_active_by_default() {
        let job = Job::new("Backend Engineer", "Acme", "Remote", "Build APIs", "user-1");
        assert!(job.is_active);
        assert!(!job.is_featured);
        assert!(job.applicants.is_empty());
    }

    #[test]
    fn salary_defaults_to_usd() {
        let salary: Salary = serde_json::from_str(r#"{"min": 50000, "max": 90000}"#).unwrap();
        assert_eq!(salary.currency, "USD");
    }
}
