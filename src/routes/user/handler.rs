use axum::{
    Json,
    extract::{Extension, State},
};
use serde::Serialize;

use crate::{
    AppState,
    error::AppError,
    middleware::AuthContext,
    session::Session,
    utils::{generate_token, is_valid_password, verify_password},
};

use super::model::{
    RegisterRequest, SignInRequest, SignInResponse, StatusResponse, UpdatePasswordRequest,
    UpdateProfileRequest, User, UserProfile, validate_register, validate_sign_in,
};

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub profile: UserProfile,
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    validate_register(&req)?;

    let user = User::create(&state.pool, &req).await?;
    tracing::info!("Registered user {}", user.login);

    Ok(Json(RegisterResponse {
        profile: user.into(),
    }))
}

#[axum::debug_handler]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, AppError> {
    validate_sign_in(&req)?;

    let user = User::authenticate(&state.pool, &req.login, &req.password).await?;

    let session = Session::issue(&state.pool, &user.login, state.config.session_ttl()).await?;
    let token = generate_token(
        session.id,
        &session.user_login,
        session.exp.timestamp(),
        &state.config.jwt_secret,
    )?;

    Ok(Json(SignInResponse { token }))
}

#[axum::debug_handler]
pub async fn get_profile(
    Extension(ctx): Extension<AuthContext>,
) -> Json<UserProfile> {
    Json(ctx.user.into())
}

#[axum::debug_handler]
pub async fn update_profile(
    Extension(ctx): Extension<AuthContext>,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let user = User::update_profile(&state.pool, &ctx.user, &req).await?;
    Ok(Json(user.into()))
}

#[axum::debug_handler]
pub async fn update_password(
    Extension(ctx): Extension<AuthContext>,
    State(state): State<AppState>,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    if !is_valid_password(&req.old_password) || !is_valid_password(&req.new_password) {
        return Err(AppError::Validation(
            "Password does not meet the requirements".to_string(),
        ));
    }
    if !verify_password(&req.old_password, &ctx.user.hashed_password)? {
        return Err(AppError::Forbidden("Invalid password".to_string()));
    }

    // Every previously issued token dies with its session row, including
    // the one used for this request. One transaction, so the new password
    // and the revocation land together or not at all.
    let mut tx = state.pool.begin().await?;
    User::update_password(&mut *tx, &ctx.user.login, &req.new_password).await?;
    Session::revoke_all(&mut *tx, &ctx.user.login).await?;
    tx.commit().await?;
    tracing::info!("Password changed for {}, sessions revoked", ctx.user.login);

    Ok(Json(StatusResponse::ok()))
}
