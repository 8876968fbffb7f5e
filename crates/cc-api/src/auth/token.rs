//! Signed session tokens (HS256 JWT).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use cc_models::Role;

use crate::error::{ApiError, ApiResult};

/// Token lifetime. Matches the 30-day session the frontend expects.
const TOKEN_TTL_DAYS: i64 = 30;

/// Claims carried by a session token. `sub` is the user id; the role is a
/// hint only, authorization always re-reads the stored user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: i64,
}

/// Signs and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenSigner {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Read the signing secret from `JWT_SECRET`.
    pub fn from_env() -> ApiResult<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| ApiError::internal("JWT_SECRET must be set"))?;
        if secret.len() < 16 {
            return Err(ApiError::internal("JWT_SECRET is too short"));
        }
        Ok(Self::new(secret.as_bytes()))
    }

    /// Issue a token for a user.
    pub fn sign(&self, user_id: &str, role: Role) -> ApiResult<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("token signing failed: {e}")))
    }

    /// Verify a token and return its claims. Expired or tampered tokens
    /// are rejected.
    pub fn verify(&self, token: &str) -> ApiResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| ApiError::unauthenticated("Not authorized, token failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_roundtrip() {
        let signer = TokenSigner::new(b"test-secret-test-secret");
        let token = signer.sign("user-1", Role::Recruiter).unwrap();

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, Role::Recruiter);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let signer = TokenSigner::new(b"test-secret-test-secret");
        let token = signer.sign("user-1", Role::Seeker).unwrap();

        let mut tampered = token.clone();
        tampered.push('x');
        assert!(signer.verify(&tampered).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let signer = TokenSigner::new(b"test-secret-test-secret");
        let other = TokenSigner::new(b"another-secret-entirely");
        let token = signer.sign("user-1", Role::Seeker).unwrap();
        assert!(other.verify(&token).is_err());
    }
}
