//! User account model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

/// A registered account. The credential hash is never serialized into
/// API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Salted one-way hash of the password. Never the plaintext.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    /// Stored reference path of the uploaded resume, if any.
    #[serde(default)]
    pub resume: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Education history entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
}

/// Work experience entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
}

impl User {
    /// Create a new user with a fresh id and timestamps.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role,
            resume: None,
            skills: Vec::new(),
            education: Vec::new(),
            experience: Vec::new(),
            bio: None,
            location: None,
            phone: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Normalized email used as the email-index key.
    pub fn email_key(email: &str) -> String {
        email.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_never_serialized() {
        let user = User::new("Alice", "alice@x.com", "$argon2id$...", Role::Seeker);
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("passwordHash"));
    }

    #[test]
    fn email_key_normalizes() {
        assert_eq!(User::email_key("  Alice@X.COM "), "alice@x.com");
    }

    #[test]
    fn deserializes_without_hash() {
        let json = r#"{
            "id": "u1", "name": "Bob", "email": "bob@x.com", "role": "recruiter",
            "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        // created_at/updated_at are camelCase in API payloads
        let json = json.replace("created_at", "createdAt").replace("updated_at", "updatedAt");
        let user: User = serde_json::from_str(&json).unwrap();
        assert_eq!(user.role, Role::Recruiter);
        assert!(user.password_hash.is_empty());
    }
}
