use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::Query;
use serde::Deserialize;

use crate::{AppState, error::AppError};

use super::model::{Country, Region};

#[derive(Debug, Deserialize)]
pub struct CountryQuery {
    #[serde(default)]
    pub region: Vec<String>,
}

#[axum::debug_handler]
pub async fn list_countries(
    State(state): State<AppState>,
    Query(query): Query<CountryQuery>,
) -> Result<Json<Vec<Country>>, AppError> {
    let mut regions = Vec::with_capacity(query.region.len());
    for raw in &query.region {
        let region = raw
            .parse::<Region>()
            .map_err(|_| AppError::Validation(format!("Unknown region \"{}\"", raw)))?;
        regions.push(region);
    }

    let countries = Country::list(&state.pool, &regions).await?;
    Ok(Json(countries))
}

#[axum::debug_handler]
pub async fn get_country(
    State(state): State<AppState>,
    Path(alpha2): Path<String>,
) -> Result<Json<Country>, AppError> {
    if alpha2.len() != 2 || !alpha2.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::Validation(
            "Country code must be two letters".to_string(),
        ));
    }

    match Country::find_by_alpha2(&state.pool, &alpha2).await? {
        Some(country) => Ok(Json(country)),
        None => Err(AppError::NotFound("Country not found".to_string())),
    }
}
