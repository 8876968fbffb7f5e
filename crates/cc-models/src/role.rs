//! User roles.

use serde::{Deserialize, Serialize};

/// Account role. Every access-control decision matches exhaustively on
/// this enum; there is no string-based role dispatch anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Job seeker (default for new registrations)
    #[default]
    Seeker,
    /// Recruiter: may post and manage job listings
    Recruiter,
    /// Administrator: full access
    Admin,
}

impl Role {
    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Seeker => "seeker",
            Role::Recruiter => "recruiter",
            Role::Admin => "admin",
        }
    }

    /// True if this role may own job listings.
    pub fn can_post_jobs(&self) -> bool {
        matches!(self, Role::Recruiter | Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seeker" => Ok(Role::Seeker),
            "recruiter" => Ok(Role::Recruiter),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trip() {
        for role in [Role::Seeker, Role::Recruiter, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn default_role_is_seeker() {
        assert_eq!(Role::default(), Role::Seeker);
    }

    #[test]
    fn unknown_role_rejected() {
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn posting_rights() {
        assert!(!Role::Seeker.can_post_jobs());
        assert!(Role::Recruiter.can_post_jobs());
        assert!(Role::Admin.can_post_jobs());
    }
}
