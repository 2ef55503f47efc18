use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};
use uuid::Uuid;

/// A signed-in session. The token handed to the client is a JWT carrying
/// this row's id; deleting the row revokes the token regardless of its
/// embedded expiry.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_login: String,
    pub exp: DateTime<Utc>,
}

impl Session {
    pub async fn issue(
        pool: &PgPool,
        user_login: &str,
        ttl: std::time::Duration,
    ) -> Result<Self, sqlx::Error> {
        let session = Session {
            id: Uuid::new_v4(),
            user_login: user_login.to_string(),
            exp: Utc::now() + Duration::seconds(ttl.as_secs() as i64),
        };

        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_login, exp)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(session.id)
        .bind(&session.user_login)
        .bind(session.exp)
        .execute(pool)
        .await?;

        Ok(session)
    }

    /// Not yet past its expiry. Revocation is row deletion, so a fetched
    /// row only needs the time check.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.exp > now
    }

    /// Fetches a session that is still live. Revoked sessions are deleted
    /// rows, so absence covers both revocation and unknown ids.
    pub async fn find_active(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_login, exp
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(session.filter(|s| s.is_active(Utc::now())))
    }

    /// Drops every session owned by the login. Called on password change so
    /// previously issued tokens stop working.
    pub async fn revoke_all(
        executor: impl PgExecutor<'_>,
        user_login: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM sessions WHERE user_login = $1")
            .bind(user_login)
            .execute(executor)
            .await?;
        Ok(())
    }
}
