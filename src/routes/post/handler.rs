use axum::{
    Json,
    extract::{Extension, Path, State},
};
use axum_extra::extract::Query;
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    middleware::AuthContext,
    routes::Pagination,
    routes::user::model::User,
    utils::is_valid_login,
    visibility,
};

use super::model::{CreatePostRequest, Post, validate_create};

#[axum::debug_handler]
pub async fn create_post(
    Extension(ctx): Extension<AuthContext>,
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> Result<Json<Post>, AppError> {
    validate_create(&req)?;
    let post = Post::create(&state.pool, &ctx.user.login, &req).await?;
    Ok(Json(post))
}

#[axum::debug_handler]
pub async fn get_post(
    Extension(ctx): Extension<AuthContext>,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Post>, AppError> {
    let post = Post::find_by_id(&state.pool, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let author = User::find_by_login(&state.pool, &post.author)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    // Denial masquerades as absence so post ids don't leak.
    if !visibility::check_access(&state.pool, &ctx.user.login, &author).await? {
        return Err(AppError::NotFound("No access to post".to_string()));
    }

    Ok(Json(post))
}

#[axum::debug_handler]
pub async fn feed_my(
    Extension(ctx): Extension<AuthContext>,
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Post>>, AppError> {
    let (limit, offset) = pagination.bounds()?;
    let posts = Post::feed(&state.pool, &ctx.user.login, limit, offset).await?;
    Ok(Json(posts))
}

#[axum::debug_handler]
pub async fn feed_user(
    Extension(ctx): Extension<AuthContext>,
    State(state): State<AppState>,
    Path(login): Path<String>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Post>>, AppError> {
    if !is_valid_login(&login) {
        return Err(AppError::Validation("Invalid login".to_string()));
    }
    let (limit, offset) = pagination.bounds()?;

    let author = User::find_by_login(&state.pool, &login)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !visibility::check_access(&state.pool, &ctx.user.login, &author).await? {
        return Err(AppError::NotFound("No access to user's posts".to_string()));
    }

    let posts = Post::feed(&state.pool, &author.login, limit, offset).await?;
    Ok(Json(posts))
}
