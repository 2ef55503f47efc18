use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Reference data seeded outside the application; never written here.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Country {
    #[serde(skip_serializing)]
    pub id: i32,
    pub name: String,
    pub alpha2: String,
    pub alpha3: String,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Europe,
    Africa,
    Americas,
    Oceania,
    Asia,
}

impl FromStr for Region {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Europe" => Ok(Region::Europe),
            "Africa" => Ok(Region::Africa),
            "Americas" => Ok(Region::Americas),
            "Oceania" => Ok(Region::Oceania),
            "Asia" => Ok(Region::Asia),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Region::Europe => "Europe",
            Region::Africa => "Africa",
            Region::Americas => "Americas",
            Region::Oceania => "Oceania",
            Region::Asia => "Asia",
        };
        f.write_str(s)
    }
}

impl Country {
    pub async fn list(pool: &PgPool, regions: &[Region]) -> Result<Vec<Self>, sqlx::Error> {
        if regions.is_empty() {
            sqlx::query_as::<_, Country>(
                r#"
                SELECT id, name, alpha2, alpha3, region
                FROM countries
                ORDER BY alpha2 ASC
                "#,
            )
            .fetch_all(pool)
            .await
        } else {
            let names: Vec<String> = regions.iter().map(Region::to_string).collect();
            sqlx::query_as::<_, Country>(
                r#"
                SELECT id, name, alpha2, alpha3, region
                FROM countries
                WHERE region = ANY($1)
                ORDER BY alpha2 ASC
                "#,
            )
            .bind(names)
            .fetch_all(pool)
            .await
        }
    }

    pub async fn find_by_alpha2(pool: &PgPool, alpha2: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Country>(
            r#"
            SELECT id, name, alpha2, alpha3, region
            FROM countries
            WHERE alpha2 = $1
            "#,
        )
        .bind(alpha2)
        .fetch_optional(pool)
        .await
    }

    pub async fn exists(pool: &PgPool, alpha2: &str) -> Result<bool, sqlx::Error> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT id FROM countries WHERE alpha2 = $1")
            .bind(alpha2)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }
}
