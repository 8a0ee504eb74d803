use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::dto::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, PublicProfile, RefreshRequest,
    RegisterRequest, ResetPasswordRequest, VerifyEmailRequest,
};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::services::{
    is_strong_password, is_valid_email, is_valid_phone, JwtKeys, TokenKind,
};
use crate::error::ApiError;
use crate::mailer::send_best_effort;
use crate::profiles::repo::Profile;
use crate::profiles::Role;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/verify-email", post(verify_email))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
}

fn public_profile(p: &Profile) -> PublicProfile {
    PublicProfile {
        id: p.id,
        email: p.email.clone(),
        full_name: p.full_name.clone(),
        role: Role::parse(&p.role),
        email_verified: p.email_verified,
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicProfile>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.full_name.trim().is_empty() {
        return Err(ApiError::Validation("Full name is required".into()));
    }
    if !is_valid_phone(&payload.phone_number) {
        return Err(ApiError::Validation(
            "Enter a valid phone number (6-13 digits, without country code)".into(),
        ));
    }
    if !is_valid_email(&payload.email) {
        return Err(ApiError::Validation("Invalid email address".into()));
    }
    if !is_strong_password(&payload.password) {
        return Err(ApiError::Validation(
            "Password must contain uppercase, lowercase, number, symbol, and at least 8 characters"
                .into(),
        ));
    }

    if Profile::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let full_phone = format!("{}{}", payload.country_code, payload.phone_number);
    let profile = Profile::create(
        &state.db,
        &payload.email,
        payload.full_name.trim(),
        &full_phone,
        &hash,
    )
    .await?;

    let keys = JwtKeys::from_ref(&state);
    match keys.sign_verify(profile.id, &profile.email) {
        Ok(token) => {
            send_best_effort(
                state.mailer.as_ref(),
                &profile.email,
                "Verify your MINT Events account",
                &format!("Use this token to verify your email: {token}"),
            )
            .await;
        }
        Err(e) => warn!(error = %e, "could not sign verification token"),
    }

    info!(user_id = %profile.id, email = %profile.email, "user registered");
    Ok((StatusCode::CREATED, Json(public_profile(&profile))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        return Err(ApiError::Validation("Invalid email address".into()));
    }

    let profile = Profile::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::Auth("Invalid credentials".into())
        })?;

    if !verify_password(&payload.password, &profile.password_hash)? {
        warn!(email = %payload.email, user_id = %profile.id, "login invalid password");
        return Err(ApiError::Auth("Invalid credentials".into()));
    }

    // Sessions only start once the address is verified.
    if !profile.email_verified {
        return Err(ApiError::Auth(
            "Please verify your email before logging in".into(),
        ));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(profile.id, &profile.email, true)?;
    let refresh_token = keys.sign_refresh(profile.id, &profile.email, true)?;

    info!(user_id = %profile.id, email = %profile.email, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: public_profile(&profile),
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_kind(&payload.refresh_token, TokenKind::Refresh)
        .map_err(|e| ApiError::Auth(e.to_string()))?;

    let profile = Profile::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Auth("User not found".into()))?;

    let access_token = keys.sign_access(profile.id, &profile.email, profile.email_verified)?;
    let refresh_token = keys.sign_refresh(profile.id, &profile.email, profile.email_verified)?;

    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: public_profile(&profile),
    }))
}

#[instrument(skip(state, payload))]
pub async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<StatusCode, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_kind(&payload.token, TokenKind::Verify)
        .map_err(|e| ApiError::Auth(e.to_string()))?;

    let updated = Profile::set_email_verified(&state.db, claims.sub).await?;
    if !updated {
        return Err(ApiError::NotFound("User not found".into()));
    }
    info!(user_id = %claims.sub, "email verified");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(mut payload): Json<ForgotPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    // Same response whether or not the account exists.
    if let Some(profile) = Profile::find_by_email(&state.db, &payload.email).await? {
        let keys = JwtKeys::from_ref(&state);
        match keys.sign_reset(profile.id, &profile.email) {
            Ok(token) => {
                send_best_effort(
                    state.mailer.as_ref(),
                    &profile.email,
                    "MINT Events password reset",
                    &format!("Use this token to reset your password: {token}"),
                )
                .await;
            }
            Err(e) => warn!(error = %e, "could not sign reset token"),
        }
    }
    Ok(StatusCode::OK)
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_kind(&payload.token, TokenKind::Reset)
        .map_err(|e| ApiError::Auth(e.to_string()))?;

    if !is_strong_password(&payload.new_password) {
        return Err(ApiError::Validation(
            "Password must contain uppercase, lowercase, number, symbol, and at least 8 characters"
                .into(),
        ));
    }

    let hash = hash_password(&payload.new_password)?;
    let updated = Profile::set_password_hash(&state.db, claims.sub, &hash).await?;
    if !updated {
        return Err(ApiError::NotFound("User not found".into()));
    }
    info!(user_id = %claims.sub, "password reset");
    Ok(StatusCode::NO_CONTENT)
}
