/// JWT token generation and validation
///
/// Tokens are signed with HS256 and carry the subject identity the API
/// resolves on every request: user id, email and role. Tokens expire after
/// one hour; there is no refresh flow.
///
/// # Example
///
/// ```
/// use taskhub_shared::auth::jwt::{create_token, validate_token, Claims};
/// use taskhub_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(Uuid::new_v4(), "bob@x.com".to_string(), UserRole::User);
/// let token = create_token(&claims, "a-secret-key-at-least-32-bytes!!")?;
///
/// let validated = validate_token(&token, "a-secret-key-at-least-32-bytes!!")?;
/// assert_eq!(validated.sub, claims.sub);
/// assert_eq!(validated.email, "bob@x.com");
/// # Ok(())
/// # }
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;

/// Token issuer embedded in and required from every token
pub const ISSUER: &str = "taskhub";

/// Token lifetime
const TOKEN_LIFETIME_HOURS: i64 = 1;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token failed validation (bad signature, wrong issuer, malformed)
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// JWT claims
///
/// Standard claims (`sub`, `iss`, `iat`, `exp`) plus the email and role that
/// complete the subject identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user ID
    pub sub: Uuid,

    /// Issuer, always "taskhub"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Subject email
    pub email: String,

    /// Subject role
    pub role: UserRole,
}

impl Claims {
    /// Creates claims for a user with the standard one-hour expiry
    pub fn new(user_id: Uuid, email: String, role: UserRole) -> Self {
        let now = Utc::now();
        let expiration = now + Duration::hours(TOKEN_LIFETIME_HOURS);

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            email,
            role,
        }
    }
}

/// Signs claims into a compact JWT
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::CreateError(e.to_string()))
}

/// Validates a token's signature, expiry and issuer, returning its claims
///
/// # Errors
///
/// - `JwtError::Expired` when the token is past its expiry
/// - `JwtError::ValidationError` for any other defect
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => Ok(data.claims),
        Err(e) => match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(JwtError::Expired),
            _ => Err(JwtError::ValidationError(e.to_string())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_create_and_validate_round_trip() {
        let claims = Claims::new(Uuid::new_v4(), "bob@x.com".to_string(), UserRole::User);
        let token = create_token(&claims, SECRET).unwrap();

        let validated = validate_token(&token, SECRET).unwrap();
        assert_eq!(validated.sub, claims.sub);
        assert_eq!(validated.email, "bob@x.com");
        assert_eq!(validated.role, UserRole::User);
        assert_eq!(validated.iss, ISSUER);
    }

    #[test]
    fn test_validate_rejects_wrong_secret() {
        let claims = Claims::new(Uuid::new_v4(), "bob@x.com".to_string(), UserRole::User);
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, "another-secret-key-32-bytes-long!");
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let result = validate_token("not.a.token", SECRET);
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_validate_rejects_expired() {
        let mut claims = Claims::new(Uuid::new_v4(), "bob@x.com".to_string(), UserRole::Admin);
        claims.iat -= 7200;
        claims.exp -= 7200;
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, SECRET);
        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_claims_expire_in_one_hour() {
        let claims = Claims::new(Uuid::new_v4(), "bob@x.com".to_string(), UserRole::User);
        assert_eq!(claims.exp - claims.iat, 3600);
    }
}
