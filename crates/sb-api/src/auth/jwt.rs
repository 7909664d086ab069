use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Audience set by the hosted auth backend on user sessions.
pub const AUDIENCE: &str = "authenticated";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id as string
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Verify and decode a bearer token (HS256, audience `authenticated`).
pub fn verify_jwt_token(token: &str, jwt_secret: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[AUDIENCE]);

    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| ApiError::Auth("Invalid or expired token".to_string()))?;

    Ok(token_data.claims)
}

/// Issue a token shaped like the ones from the auth backend. Used by local
/// tooling and tests.
pub fn generate_jwt_token(
    user_id: Uuid,
    email: Option<String>,
    full_name: Option<String>,
    jwt_secret: &str,
    ttl: Duration,
) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        aud: AUDIENCE.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + ttl).timestamp() as usize,
        email,
        user_metadata: UserMetadata {
            full_name,
            name: None,
        },
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("failed to sign token: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_jwt_secret_minimum_32_characters_long";

    #[test]
    fn test_generate_and_verify_jwt_token() {
        let user_id = Uuid::new_v4();
        let token = generate_jwt_token(
            user_id,
            Some("test@example.com".to_string()),
            Some("Test User".to_string()),
            SECRET,
            Duration::hours(1),
        )
        .expect("Failed to generate token");

        let claims = verify_jwt_token(&token, SECRET).expect("Failed to verify token");

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.aud, AUDIENCE);
        assert_eq!(claims.email.as_deref(), Some("test@example.com"));
        assert_eq!(claims.user_metadata.full_name.as_deref(), Some("Test User"));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_jwt_token_with_wrong_secret() {
        let token = generate_jwt_token(Uuid::new_v4(), None, None, SECRET, Duration::hours(1))
            .expect("Failed to generate token");

        let result = verify_jwt_token(&token, "wrong_jwt_secret_minimum_32_characters_long");
        match result {
            Err(ApiError::Auth(msg)) => assert!(msg.contains("Invalid or expired token")),
            other => panic!("Expected Auth error, got {other:?}"),
        }
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = generate_jwt_token(Uuid::new_v4(), None, None, SECRET, Duration::hours(-2))
            .expect("Failed to generate token");

        assert!(verify_jwt_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_wrong_audience_is_rejected() {
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            aud: "anon".to_string(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::hours(1)).timestamp() as usize,
            email: None,
            user_metadata: UserMetadata::default(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(verify_jwt_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_verify_invalid_jwt_token() {
        assert!(verify_jwt_token("invalid.jwt.token", SECRET).is_err());
    }
}
