use axum::{
    Json,
    extract::{Extension, Path, State},
};

use crate::{
    AppState,
    error::AppError,
    middleware::AuthContext,
    routes::user::model::{User, UserProfile},
    utils::is_valid_login,
    visibility,
};

#[axum::debug_handler]
pub async fn get_profile(
    Extension(ctx): Extension<AuthContext>,
    State(state): State<AppState>,
    Path(login): Path<String>,
) -> Result<Json<UserProfile>, AppError> {
    if !is_valid_login(&login) {
        return Err(AppError::Validation("Invalid login".to_string()));
    }

    let target = User::find_by_login(&state.pool, &login)
        .await?
        .ok_or_else(|| AppError::Forbidden("User does not exist".to_string()))?;

    if !visibility::check_access(&state.pool, &ctx.user.login, &target).await? {
        return Err(AppError::Forbidden("No access to user profile".to_string()));
    }

    Ok(Json(target.into()))
}
