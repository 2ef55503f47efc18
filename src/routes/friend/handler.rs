use axum::{
    Json,
    extract::{Extension, State},
};
use axum_extra::extract::Query;

use crate::{
    AppState,
    error::AppError,
    middleware::AuthContext,
    routes::Pagination,
    routes::user::model::{StatusResponse, User},
};

use super::model::{Friend, FriendEntry, FriendRequest};

#[axum::debug_handler]
pub async fn add_friend(
    Extension(ctx): Extension<AuthContext>,
    State(state): State<AppState>,
    Json(req): Json<FriendRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    req.validate()?;

    let target = User::find_by_login(&state.pool, &req.login)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    // Adding yourself is accepted but never creates an edge.
    if !Friend::is_self_edge(&ctx.user.login, &target.login) {
        Friend::add(&state.pool, &ctx.user.login, &target.login).await?;
    }

    Ok(Json(StatusResponse::ok()))
}

#[axum::debug_handler]
pub async fn remove_friend(
    Extension(ctx): Extension<AuthContext>,
    State(state): State<AppState>,
    Json(req): Json<FriendRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    req.validate()?;

    // Removal is idempotent; a missing edge is still a success.
    Friend::remove(&state.pool, &ctx.user.login, &req.login).await?;
    Ok(Json(StatusResponse::ok()))
}

#[axum::debug_handler]
pub async fn list_friends(
    Extension(ctx): Extension<AuthContext>,
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<FriendEntry>>, AppError> {
    let (limit, offset) = pagination.bounds()?;
    let friends = Friend::list(&state.pool, &ctx.user.login, limit, offset).await?;
    Ok(Json(friends))
}
