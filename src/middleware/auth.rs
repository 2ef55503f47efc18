use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    routes::user::model::User,
    session::Session,
    utils::verify_token,
};

/// Authenticated request context. Inserted by [`auth_middleware`] before any
/// protected handler runs; handlers take it as `Extension<AuthContext>`.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    pub session_id: Uuid,
}

/// Resolves the bearer token to a live session and its owning user. Any
/// failure along the way rejects the request with 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("No \"Authorization\" header".to_string()))?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized("The authentication scheme is not supported".to_string())
    })?;

    let claims = verify_token(token, &state.config.jwt_secret)
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

    // The session row is the source of truth for revocation. The JWT may
    // still be within its embedded expiry, but a deleted row means the
    // token was revoked.
    let session = Session::find_active(&state.pool, claims.jti)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))?;

    let user = User::find_by_login(&state.pool, &session.user_login)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))?;

    request.extensions_mut().insert(AuthContext {
        user,
        session_id: session.id,
    });

    Ok(next.run(request).await)
}
