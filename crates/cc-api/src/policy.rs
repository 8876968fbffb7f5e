//! Authorization gates.
//!
//! Every handler that touches protected data goes through one of these
//! checks after authentication. Admins pass ownership checks everywhere.

use cc_models::{Role, User};

use crate::error::{ApiError, ApiResult};

/// Require one of the listed roles.
pub fn require_role(user: &User, allowed: &[Role]) -> ApiResult<()> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "Role '{}' is not authorized to access this route",
            user.role
        )))
    }
}

/// Only recruiters and admins may manage job postings.
pub fn require_recruiter(user: &User) -> ApiResult<()> {
    if user.role.can_post_jobs() {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "Role '{}' is not authorized to access this route",
            user.role
        )))
    }
}

/// Only seekers may submit applications.
pub fn require_seeker(user: &User) -> ApiResult<()> {
    match user.role {
        Role::Seeker => Ok(()),
        Role::Recruiter | Role::Admin => {
            Err(ApiError::forbidden("Only job seekers can apply for jobs"))
        }
    }
}

/// Only admins.
pub fn require_admin(user: &User) -> ApiResult<()> {
    require_role(user, &[Role::Admin])
}

/// The resource owner, or an admin.
pub fn ensure_owner_or_admin(user: &User, owner_id: &str) -> ApiResult<()> {
    if user.id == owner_id || user.role == Role::Admin {
        Ok(())
    } else {
        Err(ApiError::forbidden("Not authorized to access this resource"))
    }
}

/// The resource owner only. Used for credential changes, which even an
/// admin may not perform on someone else's behalf.
pub fn ensure_self(user: &User, owner_id: &str) -> ApiResult<()> {
    if user.id == owner_id {
        Ok(())
    } else {
        Err(ApiError::forbidden("Not authorized to access this resource"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_role(role: Role) -> User {
        User::new("Test", "t@example.com", "$argon2id$hash", role)
    }

    #[test]
    fn recruiter_gate() {
        assert!(require_recruiter(&user_with_role(Role::Recruiter)).is_ok());
        assert!(require_recruiter(&user_with_role(Role::Admin)).is_ok());
        assert!(require_recruiter(&user_with_role(Role::Seeker)).is_err());
    }

    #[test]
    fn seeker_gate() {
        assert!(require_seeker(&user_with_role(Role::Seeker)).is_ok());
        assert!(require_seeker(&user_with_role(Role::Recruiter)).is_err());
        assert!(require_seeker(&user_with_role(Role::Admin)).is_err());
    }

    #[test]
    fn admin_passes_ownership_check() {
        let admin = user_with_role(Role::Admin);
        assert!(ensure_owner_or_admin(&admin, "someone-else").is_ok());
    }

    #[test]
    fn admin_cannot_change_another_password() {
        let admin = user_with_role(Role::Admin);
        assert!(ensure_self(&admin, "someone-else").is_err());
    }

    #[test]
    fn owner_passes_both_checks() {
        let user = user_with_role(Role::Seeker);
        let id = user.id.clone();
        assert!(ensure_owner_or_admin(&user, &id).is_ok());
        assert!(ensure_self(&user, &id).is_ok());
    }
}
