use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::json;
use tracing::{debug, info};

use crate::{
    auth::{JwtService, OtpService, PasswordService},
    database::queries::UserQueries,
    errors::{AppError, Result},
    handlers::AppState,
    models::{AuthResponse, LoginRequest, RegisterRequest, UserResponse, VerifyOtpRequest},
};

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }

    PasswordService::validate_password_strength(&request.password)?;

    let otp_service = OtpService::new(state.config.otp_ttl_minutes);
    let (otp_code, otp_expires_at) = otp_service.issue();

    if let Some(existing) = UserQueries::find_by_email(state.database.pool(), &email).await? {
        if existing.is_verified {
            return Err(AppError::Validation(
                "User with this email already exists".to_string(),
            ));
        }

        // Unverified re-registration gets a fresh code instead of an error.
        UserQueries::set_otp(state.database.pool(), existing.id, &otp_code, otp_expires_at).await?;
        debug!(%email, %otp_code, "re-issued verification code");

        return Ok((
            StatusCode::CREATED,
            Json(json!({
                "message": "Verification code re-sent. Please verify your email."
            })),
        ));
    }

    let password_hash = PasswordService::hash_password(&request.password)?;
    let user = UserQueries::create_user(
        state.database.pool(),
        &email,
        &password_hash,
        &otp_code,
        otp_expires_at,
    )
    .await?;

    info!(%email, user_id = %user.id, "user registered, verification pending");
    debug!(%email, %otp_code, "issued verification code");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered. Please verify the code sent to your email."
        })),
    ))
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<serde_json::Value>> {
    let email = request.email.trim().to_lowercase();

    let user = UserQueries::find_by_email(state.database.pool(), &email)
        .await?
        .ok_or_else(|| AppError::Auth("Invalid email or verification code".to_string()))?;

    if user.is_verified {
        return Err(AppError::Validation("Account is already verified".to_string()));
    }

    let otp_service = OtpService::new(state.config.otp_ttl_minutes);
    otp_service.verify(&user, &request.otp)?;

    UserQueries::mark_verified(state.database.pool(), user.id).await?;
    info!(%email, user_id = %user.id, "account verified");

    let jwt_service = JwtService::new(&state.config.jwt_secret, state.config.token_ttl_hours);
    let token = jwt_service.generate_token(user.id, &user.email)?;

    let mut user = user;
    user.is_verified = true;

    Ok(Json(json!({
        "message": "Account verified",
        "token": token,
        "user": UserResponse::from(user)
    })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let email = request.email.trim().to_lowercase();

    let user = UserQueries::find_by_email(state.database.pool(), &email)
        .await?
        .ok_or_else(|| AppError::Auth("Invalid email or password".to_string()))?;

    if !PasswordService::verify_password(&request.password, &user.password_hash)? {
        return Err(AppError::Auth("Invalid email or password".to_string()));
    }

    if !user.is_verified {
        return Err(AppError::Auth(
            "Account not verified. Please verify the code sent to your email".to_string(),
        ));
    }

    let jwt_service = JwtService::new(&state.config.jwt_secret, state.config.token_ttl_hours);
    let token = jwt_service.generate_token(user.id, &user.email)?;

    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(user),
    }))
}
