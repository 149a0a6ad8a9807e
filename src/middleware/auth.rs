use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::{
    auth::JwtService,
    database::queries::UserQueries,
    errors::AppError,
    handlers::AppState,
};

/// Extractor for routes behind `Authorization: Bearer <token>`. Verifies
/// the token and that the user it names still exists.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Auth("Authentication required".to_string()))?;

        let jwt_service = JwtService::new(&state.config.jwt_secret, state.config.token_ttl_hours);
        let claims = jwt_service.verify_token(token)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Auth("Invalid token".to_string()))?;

        let user = UserQueries::find_by_id(state.database.pool(), user_id)
            .await?
            .ok_or_else(|| AppError::Auth("User not found".to_string()))?;

        Ok(AuthenticatedUser {
            id: user.id,
            email: user.email,
        })
    }
}
