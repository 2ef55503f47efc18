use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::error::AppError;
use crate::utils::is_valid_login;

/// Directed edge: `login` is a friend of `of_login`. No reciprocal edge is
/// created; friendship here is one-way by design.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Friend {
    pub of_login: String,
    pub login: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct FriendRequest {
    pub login: String,
}

impl FriendRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if !is_valid_login(&self.login) {
            return Err(AppError::Validation("Invalid login".to_string()));
        }
        Ok(())
    }
}

/// One entry of the friends listing.
#[derive(Debug, Serialize, FromRow)]
pub struct FriendEntry {
    pub login: String,
    #[serde(rename = "addedAt")]
    pub added_at: DateTime<Utc>,
}

impl Friend {
    /// Self-edges are never stored; adding yourself is a silent no-op.
    pub fn is_self_edge(of_login: &str, login: &str) -> bool {
        of_login == login
    }

    pub async fn exists(pool: &PgPool, of_login: &str, login: &str) -> Result<bool, sqlx::Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT login FROM friends WHERE of_login = $1 AND login = $2")
                .bind(of_login)
                .bind(login)
                .fetch_optional(pool)
                .await?;
        Ok(row.is_some())
    }

    /// Inserts the edge, or refreshes `added_at` when it already exists.
    /// The primary key keeps concurrent adds from duplicating the edge.
    pub async fn add(pool: &PgPool, of_login: &str, login: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO friends (of_login, login, added_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (of_login, login) DO UPDATE SET added_at = NOW()
            "#,
        )
        .bind(of_login)
        .bind(login)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn remove(pool: &PgPool, of_login: &str, login: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM friends WHERE of_login = $1 AND login = $2")
            .bind(of_login)
            .bind(login)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn list(
        pool: &PgPool,
        of_login: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FriendEntry>, sqlx::Error> {
        sqlx::query_as::<_, FriendEntry>(
            r#"
            SELECT login, added_at
            FROM friends
            WHERE of_login = $1
            ORDER BY added_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(of_login)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }
}
