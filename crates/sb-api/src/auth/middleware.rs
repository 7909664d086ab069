use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use uuid::Uuid;

use super::jwt::verify_jwt_token;
use crate::{error::ApiError, state::AuthConfig};

/// Authenticated user extractor
///
/// Reads the `Authorization: Bearer <jwt>` header and verifies the token
/// issued by the auth backend.
///
/// # Example
/// ```
/// use axum::extract::State;
/// use sb_api::{error::ApiError, auth::AuthUser, ApiState};
///
/// async fn protected_route(
///     auth_user: AuthUser,
///     State(state): State<ApiState>,
/// ) -> Result<(), ApiError> {
///     // auth_user.user_id is available
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl AuthUser {
    /// Name recorded on reports filed by this user.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| "Anonymous".to_string())
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AuthConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_config = AuthConfig::from_ref(state);

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Auth("Not authenticated".to_string()))?;

        let claims = verify_jwt_token(bearer.token(), &auth_config.jwt_secret)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Auth("Invalid user ID in token".to_string()))?;

        let name = claims
            .user_metadata
            .full_name
            .or(claims.user_metadata.name)
            .filter(|n| !n.trim().is_empty());

        Ok(Self {
            user_id,
            email: claims.email,
            name,
        })
    }
}

/// Authenticated user listed in `ADMIN_USER_IDS`.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    AuthConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let auth_config = AuthConfig::from_ref(state);

        if !auth_config.is_admin(user.user_id) {
            tracing::warn!(user_id = %user.user_id, "Non-admin tried to access moderation");
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }

        Ok(Self(user))
    }
}
