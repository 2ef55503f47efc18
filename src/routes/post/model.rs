use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppError;

/// Immutable once created; there is no edit or delete path.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub content: String,
    pub author: String,
    pub tags: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "likesCount")]
    pub likes_count: i64,
    #[serde(rename = "dislikesCount")]
    pub dislikes_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
    pub tags: Vec<String>,
}

pub fn validate_create(req: &CreatePostRequest) -> Result<(), AppError> {
    if req.content.chars().count() > 1000 {
        return Err(AppError::Validation(
            "Content must not exceed 1000 characters".to_string(),
        ));
    }
    if req.tags.iter().any(|t| t.chars().count() > 20) {
        return Err(AppError::Validation(
            "Tags must not exceed 20 characters".to_string(),
        ));
    }
    Ok(())
}

impl Post {
    pub async fn create(
        pool: &PgPool,
        author: &str,
        req: &CreatePostRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, content, author, tags, created_at, likes_count, dislikes_count)
            VALUES ($1, $2, $3, $4, NOW(), 0, 0)
            RETURNING id, content, author, tags, created_at, likes_count, dislikes_count
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.content)
        .bind(author)
        .bind(&req.tags)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, content, author, tags, created_at, likes_count, dislikes_count
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn feed(
        pool: &PgPool,
        author: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, content, author, tags, created_at, likes_count, dislikes_count
            FROM posts
            WHERE author = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(author)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_validation_bounds() {
        let ok = CreatePostRequest {
            content: "hello".to_string(),
            tags: vec!["a".to_string(), "b".to_string()],
        };
        assert!(validate_create(&ok).is_ok());

        let long_content = CreatePostRequest {
            content: "x".repeat(1001),
            tags: vec![],
        };
        assert!(validate_create(&long_content).is_err());

        let long_tag = CreatePostRequest {
            content: "hello".to_string(),
            tags: vec!["x".repeat(21)],
        };
        assert!(validate_create(&long_tag).is_err());
    }

    #[test]
    fn create_validation_counts_characters_not_bytes() {
        let multibyte = CreatePostRequest {
            content: "ё".repeat(1000),
            tags: vec!["ё".repeat(20)],
        };
        assert!(validate_create(&multibyte).is_ok());

        let over = CreatePostRequest {
            content: "ё".repeat(1001),
            tags: vec![],
        };
        assert!(validate_create(&over).is_err());
    }

    #[test]
    fn post_serializes_camel_case() {
        let post = Post {
            id: Uuid::new_v4(),
            content: "hello".to_string(),
            author: "alice".to_string(),
            tags: vec!["news".to_string()],
            created_at: Utc::now(),
            likes_count: 0,
            dislikes_count: 0,
        };
        let json = serde_json::to_value(&post).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("likesCount").is_some());
        assert!(json.get("dislikesCount").is_some());
        assert!(json.get("created_at").is_none());
    }
}
